use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::ShowModel;
use crate::store::{PartRecord, StoreError, SubpartRecord};

/// The embedded JSON document a standalone export carries.
///
/// Only the timeline fields are modeled; everything else in the document
/// (positioning grids, branding, whatever future exporters add) is carried
/// through untouched so a decode-encode cycle does not lose data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    /// Top-level parts, in performance order.
    #[serde(default)]
    pub parts: Vec<PartRecord>,
    /// Subparts grouped by owning part id.
    #[serde(default)]
    pub subparts_by_part: BTreeMap<String, Vec<SubpartRecord>>,
    /// Stage positioning payload, opaque to the engine.
    #[serde(default)]
    pub positions_by_part: Map<String, Value>,
    /// Remote audio URL, when the export references hosted media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,
    /// Inlined audio data URL, when the export is fully self-contained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_audio_data_url: Option<String>,
    /// Everything else in the document, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportSnapshot {
    /// Decode a snapshot from its embedded JSON form.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the snapshot back to JSON.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build the timeline model the export player runs against.
    pub fn model(&self) -> ShowModel {
        let subparts: Vec<SubpartRecord> = self
            .subparts_by_part
            .values()
            .flat_map(|subs| subs.iter().cloned())
            .collect();
        ShowModel::from_records(self.parts.clone(), subparts)
    }

    /// The audio source to play, preferring inlined data over a remote URL.
    pub fn audio_source(&self) -> Option<&str> {
        self.embedded_audio_data_url
            .as_deref()
            .or(self.music_url.as_deref())
    }
}
