use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-captured timestamp, not yet bound to any segment boundary.
///
/// Marks live only inside an authoring session; they are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Unique identifier.
    pub id: Uuid,
    /// Captured clock position in seconds.
    pub time: f64,
    /// When the mark was captured.
    pub created_at: DateTime<Utc>,
}

impl Mark {
    /// Capture a mark at the given clock time (clamped to zero).
    pub fn at(time_seconds: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            time: time_seconds.max(0.0),
            created_at: Utc::now(),
        }
    }
}

/// An ordered collection of marks, used purely for authoring organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkRow {
    /// Unique identifier.
    pub id: Uuid,
    /// Optional user label ("Run 3", "Cleanup pass").
    pub label: Option<String>,
    /// Marks in capture order.
    pub marks: Vec<Mark>,
}

impl MarkRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            label: None,
            marks: Vec::new(),
        }
    }

    /// Create an empty row with a label.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: Some(label.into()),
            marks: Vec::new(),
        }
    }
}

impl Default for MarkRow {
    fn default() -> Self {
        Self::new()
    }
}

/// All mark rows of one authoring session. Captures append to the newest
/// row; rows have no effect on playback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkSheet {
    /// Rows in creation order.
    pub rows: Vec<MarkRow>,
}

impl MarkSheet {
    /// Create an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a mark at the given time, appending it to the newest row
    /// (creating the first row if the sheet is empty). Returns the mark id.
    pub fn capture(&mut self, time_seconds: f64) -> Uuid {
        if self.rows.is_empty() {
            self.rows.push(MarkRow::new());
        }
        let mark = Mark::at(time_seconds);
        let id = mark.id;
        if let Some(row) = self.rows.last_mut() {
            row.marks.push(mark);
        }
        id
    }

    /// Start a fresh row for subsequent captures. Returns the row id.
    pub fn new_row(&mut self) -> Uuid {
        let row = MarkRow::new();
        let id = row.id;
        self.rows.push(row);
        id
    }

    /// Find a mark by id.
    pub fn find_mark(&self, id: Uuid) -> Option<&Mark> {
        self.rows
            .iter()
            .flat_map(|row| row.marks.iter())
            .find(|mark| mark.id == id)
    }

    /// Remove a mark by id.
    pub fn remove_mark(&mut self, id: Uuid) -> bool {
        for row in self.rows.iter_mut() {
            let len = row.marks.len();
            row.marks.retain(|mark| mark.id != id);
            if row.marks.len() < len {
                return true;
            }
        }
        false
    }

    /// Remove a row and all of its marks.
    pub fn remove_row(&mut self, id: Uuid) -> bool {
        let len = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() < len
    }

    /// Total number of marks across all rows.
    pub fn mark_count(&self) -> usize {
        self.rows.iter().map(|row| row.marks.len()).sum()
    }
}
