//! Errors from the Google Play client and the Android build tools

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The token endpoint rejected the signed assertion
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Failed to read service account key {}: {source}", path.display())]
    KeyFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Non-2xx response from a JSON endpoint
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Non-2xx response from a media upload endpoint
    #[error("Upload failed: {status} - {message}")]
    UploadFailed { status: u16, message: String },

    /// Release notes were sent for a version code no release on the track lists
    #[error("No release on track {track} holds version code {version_code}")]
    ReleaseNotFound { track: String, version_code: i64 },

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// `aapt2` or `bundletool` is not installed
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
