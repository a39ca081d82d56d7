//! Edit transaction state threaded through a publish run

use playship_stores::{BinaryArtifact, Edit, EditTarget};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::types::LanguageReport;

/// Lifecycle of one edit transaction.
///
/// `Committed` and `Aborted` are terminal. A run that fails at any step is
/// `Aborted`; its edit is never committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    EditOpen,
    BinariesUploaded,
    TrackUpdated,
    MetadataAttached,
    Committed,
    Aborted,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Committed | RunState::Aborted)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RunState::Idle => "idle",
            RunState::EditOpen => "edit_open",
            RunState::BinariesUploaded => "binaries_uploaded",
            RunState::TrackUpdated => "track_updated",
            RunState::MetadataAttached => "metadata_attached",
            RunState::Committed => "committed",
            RunState::Aborted => "aborted",
        })
    }
}

/// Everything a run has established so far.
///
/// Each transition consumes the context and returns the next one, so a step
/// only ever sees the complete result of the steps before it.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    state: RunState,
    target: EditTarget,
    edit: Edit,
    artifacts: Vec<BinaryArtifact>,
    version_codes: BTreeSet<i64>,
    changelogs: Vec<i64>,
    languages: Vec<LanguageReport>,
}

impl TransactionContext {
    /// Context for a freshly opened edit
    pub fn open(package_name: impl Into<String>, edit: Edit) -> Self {
        Self {
            state: RunState::EditOpen,
            target: EditTarget::new(package_name, edit.id.clone()),
            edit,
            artifacts: Vec::new(),
            version_codes: BTreeSet::new(),
            changelogs: Vec::new(),
            languages: Vec::new(),
        }
    }

    /// Record the full set of uploaded binaries
    pub fn with_binaries(self, artifacts: Vec<BinaryArtifact>) -> Self {
        let version_codes = artifacts.iter().map(|a| a.version_code).collect();
        Self {
            state: RunState::BinariesUploaded,
            artifacts,
            version_codes,
            ..self
        }
    }

    pub fn with_track_updated(self) -> Self {
        Self {
            state: RunState::TrackUpdated,
            ..self
        }
    }

    /// Record the version codes that received the single changelog file
    pub fn with_changelogs(self, changelogs: Vec<i64>) -> Self {
        Self { changelogs, ..self }
    }

    pub fn with_metadata(self, languages: Vec<LanguageReport>) -> Self {
        Self {
            state: RunState::MetadataAttached,
            languages,
            ..self
        }
    }

    pub fn committed(self) -> Self {
        Self {
            state: RunState::Committed,
            ..self
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    pub fn edit(&self) -> &Edit {
        &self.edit
    }

    pub fn artifacts(&self) -> &[BinaryArtifact] {
        &self.artifacts
    }

    pub fn version_codes(&self) -> &BTreeSet<i64> {
        &self.version_codes
    }

    pub fn changelogs(&self) -> &[i64] {
        &self.changelogs
    }

    pub fn languages(&self) -> &[LanguageReport] {
        &self.languages
    }
}
