//! Configuration types

use playship_stores::{CredentialSource, TrackName};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::{DEFAULT_LANGUAGE_CODE, DEFAULT_MAX_CONCURRENT_UPLOADS};

/// Options for one publish run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Primary binary path or glob pattern
    pub binary: String,

    /// Further binaries uploaded into the same edit
    pub additional_binaries: Vec<String>,

    /// Package name to use instead of reading it from the primary binary
    pub package_name: Option<String>,

    /// Release track the uploaded version codes are assigned to
    pub track: TrackName,

    /// Fraction of users for the rollout track, in (0, 1]
    pub user_fraction: Option<f64>,

    /// Changelog attached to every uploaded version code
    pub changelog_file: Option<PathBuf>,

    /// Fastlane-style metadata tree to attach
    pub metadata_root: Option<PathBuf>,

    /// Language the single changelog file is attached under
    pub language_code: String,

    /// Service account credentials
    pub credentials: CredentialSource,

    /// Timeout for each remote call, in seconds
    pub timeout_secs: Option<u64>,

    /// Binary uploads allowed in flight at once
    pub max_concurrent_uploads: usize,

    /// Override for the Google Play API host
    pub api_base_url: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            binary: String::new(),
            additional_binaries: Vec::new(),
            package_name: None,
            track: TrackName::default(),
            user_fraction: None,
            changelog_file: None,
            metadata_root: None,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            credentials: CredentialSource::default(),
            timeout_secs: None,
            max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
            api_base_url: None,
        }
    }
}

impl PublishConfig {
    /// Primary binary followed by the additional ones, as configured
    pub fn binary_patterns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.binary.as_str())
            .chain(self.additional_binaries.iter().map(String::as_str))
    }

    /// Whether a run attaches anything beyond binaries and track
    pub fn attaches_metadata(&self) -> bool {
        self.metadata_root.is_some()
    }
}
