//! Exit codes for the CLI

use playship_core::{ConfigError, PublishError};

/// Success
pub const SUCCESS: u8 = 0;

/// General error
pub const ERROR: u8 = 1;

/// Configuration error
pub const CONFIG_ERROR: u8 = 2;

/// A binary was missing or unreadable
pub const INVALID_BINARY: u8 = 3;

/// No authorized client could be obtained
pub const AUTH_FAILED: u8 = 4;

pub const EDIT_OPEN_FAILED: u8 = 5;
pub const BINARY_UPLOAD_FAILED: u8 = 6;
pub const TRACK_UPDATE_FAILED: u8 = 7;
pub const CHANGELOG_UPLOAD_FAILED: u8 = 8;
pub const METADATA_UPLOAD_FAILED: u8 = 9;
pub const INVALID_METADATA_LAYOUT: u8 = 10;
pub const COMMIT_FAILED: u8 = 11;

/// Map a command failure to the process exit code
pub fn for_error(err: &anyhow::Error) -> u8 {
    if let Some(err) = err.downcast_ref::<PublishError>() {
        return match err {
            PublishError::InvalidConfig(_) => CONFIG_ERROR,
            PublishError::InvalidBinary { .. } => INVALID_BINARY,
            PublishError::AuthFailed { .. } => AUTH_FAILED,
            PublishError::EditOpenFailed { .. } => EDIT_OPEN_FAILED,
            PublishError::BinaryUploadFailed { .. } => BINARY_UPLOAD_FAILED,
            PublishError::TrackUpdateFailed { .. } => TRACK_UPDATE_FAILED,
            PublishError::ChangelogUploadFailed { .. } => CHANGELOG_UPLOAD_FAILED,
            PublishError::MetadataUploadFailed { .. } => METADATA_UPLOAD_FAILED,
            PublishError::InvalidMetadataLayout { .. } => INVALID_METADATA_LAYOUT,
            PublishError::CommitFailed { .. } => COMMIT_FAILED,
        };
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }
    ERROR
}
