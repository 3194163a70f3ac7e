//! Configuration for the locator and the picker.
//!
//! Both halves carry plain serde structs with defaults so a host can load
//! them from JSON, override a field or two, and hand them in by reference.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LocatorError;

// ═══════════════════════════════════════════════════════════════════════════════
// MATCH TUNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Column slack accepted for an exact match. Callers disagree on whether
/// columns are 0- or 1-indexed.
pub const COLUMN_TOLERANCE: u32 = 1;
/// Distance charged per line for an element whose opening tag starts above the target line.
pub const LINE_PENALTY: u32 = 100;
/// Acceptance threshold when the best candidate starts on the target line.
pub const SAME_LINE_THRESHOLD: u32 = 50;
/// Acceptance threshold when the best candidate is a multi-line element.
pub const MULTI_LINE_THRESHOLD: u32 = 500;

/// Heuristic constants of the nearest-match search.
///
/// A candidate whose distance is below `line_penalty` can only have come from
/// the target line, so that boundary also decides which threshold applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchTuning {
    pub column_tolerance: u32,
    pub line_penalty: u32,
    pub same_line_threshold: u32,
    pub multi_line_threshold: u32,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            column_tolerance: COLUMN_TOLERANCE,
            line_penalty: LINE_PENALTY,
            same_line_threshold: SAME_LINE_THRESHOLD,
            multi_line_threshold: MULTI_LINE_THRESHOLD,
        }
    }
}

impl MatchTuning {
    /// Threshold that applies to the closest candidate found.
    pub fn threshold_for(&self, closest_distance: u32) -> u32 {
        if closest_distance < self.line_penalty {
            self.same_line_threshold
        } else {
            self.multi_line_threshold
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOCATOR OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocatorOptions {
    /// Every readable file must resolve under this directory.
    pub project_root: PathBuf,
    /// Directory names that are never readable, wherever they appear below the root.
    pub excluded_dirs: Vec<String>,
    pub tuning: MatchTuning,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            excluded_dirs: vec!["node_modules".to_string()],
            tuning: MatchTuning::default(),
        }
    }
}

impl LocatorOptions {
    pub fn with_root(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// Load options from a JSON file. Missing fields fall back to defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, LocatorError> {
        let data = fs::read_to_string(path).map_err(LocatorError::Read)?;
        serde_json::from_str(&data).map_err(|e| LocatorError::Config(e.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PICKER CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

pub const DEFAULT_ALLOWED_PARENT_ORIGINS: &[&str] = &[
    "https://horizons.hostinger.com",
    "https://horizons.hostinger.dev",
    "https://horizons-frontend-local.hostinger.dev",
    "http://localhost:4000",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PickerConfig {
    pub allowed_parent_origins: Vec<String>,
    /// Id of the container that carries the enabled marker.
    pub root_element_id: String,
    pub enabled_attribute: String,
    /// Everything up to and including this marker is stripped from file hints.
    pub deployment_marker: String,
    pub text_content_max_len: usize,
    pub max_selector_depth: usize,
    pub highlight_color: String,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            allowed_parent_origins: DEFAULT_ALLOWED_PARENT_ORIGINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            root_element_id: "root".to_string(),
            enabled_attribute: "data-selection-mode-enabled".to_string(),
            deployment_marker: "public_html/".to_string(),
            text_content_max_len: 500,
            max_selector_depth: 20,
            highlight_color: "#7B68EE".to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUTE RESTORE CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

pub const ROUTE_RESTORE_ALLOWED_PARENT_ORIGINS: &[&str] = &[
    "https://horizons.hostinger.com",
    "https://horizons.hostinger.dev",
    "https://horizons-frontend-local.hostinger.dev",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteRestoreConfig {
    pub allowed_parent_origins: Vec<String>,
    pub storage_key: String,
    /// Restored pages with less visible text than this are treated as broken.
    pub min_body_text_len: usize,
}

impl Default for RouteRestoreConfig {
    fn default() -> Self {
        Self {
            allowed_parent_origins: ROUTE_RESTORE_ALLOWED_PARENT_ORIGINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            storage_key: "horizons-iframe-saved-route".to_string(),
            min_body_text_len: 50,
        }
    }
}
