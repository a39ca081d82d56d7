//! Error types for Playship

use playship_metadata::MetadataError;
use playship_stores::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using PublishError
pub type Result<T> = std::result::Result<T, PublishError>;

/// Boxed cause of a metadata upload failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error that ends a publish run.
///
/// Every variant aborts the run; the edit is left uncommitted.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Configuration rejected before any step ran
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// A binary could not be resolved or its package name extracted
    #[error("Invalid binary {}: {source}", path.display())]
    InvalidBinary {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// No authorized client could be obtained
    #[error("Authentication failed: {source}")]
    AuthFailed {
        #[source]
        source: StoreError,
    },

    /// The store refused to open an edit
    #[error("Failed to open an edit for {package_name}: {source}")]
    EditOpenFailed {
        package_name: String,
        #[source]
        source: StoreError,
    },

    /// A binary upload failed
    #[error("Failed to upload {}: {source}", path.display())]
    BinaryUploadFailed {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// The track update failed
    #[error("Failed to update track {track}: {source}")]
    TrackUpdateFailed {
        track: String,
        #[source]
        source: StoreError,
    },

    /// A changelog could not be read or attached
    #[error("Failed to attach changelog for {target}: {source}")]
    ChangelogUploadFailed {
        target: ChangelogTarget,
        #[source]
        source: StoreError,
    },

    /// One stage of a language's metadata failed
    #[error("Failed to upload {stage} metadata for {language}: {source}")]
    MetadataUploadFailed {
        language: String,
        stage: MetadataStage,
        #[source]
        source: BoxError,
    },

    /// The metadata root is missing or unreadable
    #[error("Invalid metadata layout at {}: {source}", path.display())]
    InvalidMetadataLayout {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },

    /// The final commit failed
    #[error("Failed to commit edit {edit_id}: {source}")]
    CommitFailed {
        edit_id: String,
        #[source]
        source: StoreError,
    },
}

impl PublishError {
    /// The step at which the run stopped
    pub fn step(&self) -> PublishStep {
        match self {
            Self::InvalidConfig(_) => PublishStep::Configuration,
            Self::InvalidBinary { .. } => PublishStep::ResolveBinaries,
            Self::AuthFailed { .. } => PublishStep::Authenticate,
            Self::EditOpenFailed { .. } => PublishStep::OpenEdit,
            Self::BinaryUploadFailed { .. } => PublishStep::UploadBinaries,
            Self::TrackUpdateFailed { .. } => PublishStep::UpdateTrack,
            Self::ChangelogUploadFailed { .. } => PublishStep::AttachChangelogs,
            Self::MetadataUploadFailed { .. } | Self::InvalidMetadataLayout { .. } => {
                PublishStep::AttachMetadata
            }
            Self::CommitFailed { .. } => PublishStep::Commit,
        }
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "invalid_config",
            Self::InvalidBinary { .. } => "invalid_binary",
            Self::AuthFailed { .. } => "auth_failed",
            Self::EditOpenFailed { .. } => "edit_open_failed",
            Self::BinaryUploadFailed { .. } => "binary_upload_failed",
            Self::TrackUpdateFailed { .. } => "track_update_failed",
            Self::ChangelogUploadFailed { .. } => "changelog_upload_failed",
            Self::MetadataUploadFailed { .. } => "metadata_upload_failed",
            Self::InvalidMetadataLayout { .. } => "invalid_metadata_layout",
            Self::CommitFailed { .. } => "commit_failed",
        }
    }
}

/// Steps of a publish run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PublishStep {
    /// Loading and validating options, before step 1
    Configuration,
    ResolveBinaries,
    Authenticate,
    OpenEdit,
    UploadBinaries,
    UpdateTrack,
    AttachChangelogs,
    AttachMetadata,
    Commit,
}

impl PublishStep {
    /// 1-based step number; `None` for configuration
    pub fn number(&self) -> Option<u8> {
        match self {
            Self::Configuration => None,
            Self::ResolveBinaries => Some(1),
            Self::Authenticate => Some(2),
            Self::OpenEdit => Some(3),
            Self::UploadBinaries => Some(4),
            Self::UpdateTrack => Some(5),
            Self::AttachChangelogs => Some(6),
            Self::AttachMetadata => Some(7),
            Self::Commit => Some(8),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::ResolveBinaries => "resolve binaries",
            Self::Authenticate => "authenticate",
            Self::OpenEdit => "open edit",
            Self::UploadBinaries => "upload binaries",
            Self::UpdateTrack => "update track",
            Self::AttachChangelogs => "attach changelogs",
            Self::AttachMetadata => "attach metadata",
            Self::Commit => "commit",
        }
    }
}

impl std::fmt::Display for PublishStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.number() {
            Some(n) => write!(f, "step {} ({})", n, self.as_str()),
            None => f.write_str(self.as_str()),
        }
    }
}

/// What a failed changelog attachment was for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogTarget {
    VersionCode(i64),
    Language(String),
}

impl std::fmt::Display for ChangelogTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VersionCode(code) => write!(f, "version code {}", code),
            Self::Language(language) => write!(f, "language {}", language),
        }
    }
}

/// Stage of per-language metadata attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataStage {
    Resolve,
    Listing,
    Changelog,
    Images,
}

impl std::fmt::Display for MetadataStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Resolve => "resolve",
            Self::Listing => "listing",
            Self::Changelog => "changelog",
            Self::Images => "images",
        })
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}
