//! Core types for Playship

use playship_stores::BinaryArtifact;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a committed publish run changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub package_name: String,
    pub edit_id: String,
    pub track: String,
    /// Version codes assigned to the track
    pub version_codes: BTreeSet<i64>,
    /// Uploaded binaries in configured order
    pub artifacts: Vec<BinaryArtifact>,
    /// Version codes that received the single changelog file
    pub changelogs: Vec<i64>,
    /// Metadata attached per language, in processing order
    pub languages: Vec<LanguageReport>,
}

/// Metadata attached for one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageReport {
    pub language_code: String,
    /// Whether any listing text field was sent
    pub listing: bool,
    /// Version codes that received release notes
    pub changelogs: Vec<i64>,
    /// Number of images uploaded
    pub images: usize,
}

impl LanguageReport {
    pub fn new(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            ..Default::default()
        }
    }
}
