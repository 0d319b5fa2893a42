use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Knobs for one export. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Archive receiving sprites, cameos and buildups.
    pub cache_archive: String,
    /// Archive receiving voxel bodies, animations, turrets and barrels.
    pub expansion_archive: String,
    pub rules_file_name: String,
    pub art_file_name: String,
    pub tool_name: String,
    /// Subdirectory tried when an asset is missing at its primary path.
    pub fallback_namespace: Option<String>,
    pub include_report: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            cache_archive: "ecache01.mix".to_string(),
            expansion_archive: "expand01.mix".to_string(),
            rules_file_name: "rules.ini".to_string(),
            art_file_name: "art.ini".to_string(),
            tool_name: "tsm".to_string(),
            fallback_namespace: None,
            include_report: true,
        }
    }
}

impl ExportOptions {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
