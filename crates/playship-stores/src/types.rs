//! Request and response types for edit operations

use playship_metadata::{ImageType, MimeType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::CredentialSource;

/// MIME type sent with APK uploads.
pub const APK_MIME_TYPE: &str = "application/vnd.android.package-archive";

/// MIME type sent with app bundle uploads.
pub const BUNDLE_MIME_TYPE: &str = "application/octet-stream";

/// An open edit transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub id: String,
    /// Seconds since the epoch at which the store discards the edit.
    pub expiry_seconds: i64,
}

/// Identifies the edit every sub-resource call applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub package_name: String,
    pub edit_id: String,
}

impl EditTarget {
    pub fn new(package_name: impl Into<String>, edit_id: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            edit_id: edit_id.into(),
        }
    }
}

/// Kind of binary being uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryKind {
    /// Android package (.apk)
    Apk,
    /// Android App Bundle (.aab)
    Bundle,
}

impl BinaryKind {
    /// Infers the kind from the file extension; anything but `.aab` is an APK.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "aab" => BinaryKind::Bundle,
            _ => BinaryKind::Apk,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            BinaryKind::Apk => APK_MIME_TYPE,
            BinaryKind::Bundle => BUNDLE_MIME_TYPE,
        }
    }
}

/// A binary upload request.
#[derive(Clone)]
pub struct BinaryUpload {
    pub path: PathBuf,
    pub kind: BinaryKind,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for BinaryUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryUpload")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// What the store reports back for an uploaded binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBinary {
    /// Version code assigned to the binary.
    pub version_code: i64,
    /// SHA-256 of the binary as seen by the store, when reported.
    pub sha256: Option<String>,
}

/// A binary uploaded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryArtifact {
    pub path: PathBuf,
    pub version_code: i64,
    /// Hex SHA-256 of the uploaded bytes.
    pub content_hash: String,
}

/// Release track name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TrackName {
    Internal,
    Alpha,
    Beta,
    Production,
    /// Staged rollout to a fraction of production users.
    Rollout,
    /// Any other (custom or closed testing) track.
    Custom(String),
}

impl TrackName {
    pub fn as_str(&self) -> &str {
        match self {
            TrackName::Internal => "internal",
            TrackName::Alpha => "alpha",
            TrackName::Beta => "beta",
            TrackName::Production => "production",
            TrackName::Rollout => "rollout",
            TrackName::Custom(name) => name,
        }
    }

    pub fn is_rollout(&self) -> bool {
        matches!(self, TrackName::Rollout)
    }

    /// Track the store keeps the release on; staged rollouts live on production
    pub fn remote_name(&self) -> &str {
        match self {
            TrackName::Rollout => "production",
            other => other.as_str(),
        }
    }
}

impl Default for TrackName {
    fn default() -> Self {
        TrackName::Internal
    }
}

impl std::str::FromStr for TrackName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err("track name cannot be empty".to_string());
        }

        Ok(match name.to_lowercase().as_str() {
            "internal" => TrackName::Internal,
            "alpha" => TrackName::Alpha,
            "beta" => TrackName::Beta,
            "production" => TrackName::Production,
            "rollout" => TrackName::Rollout,
            _ => TrackName::Custom(name.to_string()),
        })
    }
}

impl TryFrom<String> for TrackName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TrackName> for String {
    fn from(track: TrackName) -> Self {
        track.as_str().to_string()
    }
}

impl std::fmt::Display for TrackName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Track assignment request.
///
/// The user fraction is only ever carried for the rollout track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackUpdate {
    track: TrackName,
    version_codes: BTreeSet<i64>,
    user_fraction: Option<f64>,
}

impl TrackUpdate {
    pub fn new(track: TrackName, version_codes: BTreeSet<i64>, user_fraction: Option<f64>) -> Self {
        let user_fraction = if track.is_rollout() { user_fraction } else { None };
        Self {
            track,
            version_codes,
            user_fraction,
        }
    }

    pub fn track(&self) -> &TrackName {
        &self.track
    }

    pub fn version_codes(&self) -> &BTreeSet<i64> {
        &self.version_codes
    }

    pub fn user_fraction(&self) -> Option<f64> {
        self.user_fraction
    }
}

/// An image upload request.
#[derive(Clone)]
pub struct ImageUpload {
    pub language_code: String,
    pub image_type: ImageType,
    pub mime_type: MimeType,
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("language_code", &self.language_code)
            .field("image_type", &self.image_type)
            .field("mime_type", &self.mime_type)
            .field("path", &self.path)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Release notes for one version code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogUpdate {
    /// Track whose release holds `version_code`
    pub track: TrackName,
    pub language_code: String,
    pub version_code: i64,
    pub text: String,
}

/// Google Play configuration
#[derive(Debug, Clone, Default)]
pub struct GooglePlayConfig {
    /// Where the service account key comes from
    pub credentials: CredentialSource,

    /// Override for the API base URL (without the upload prefix)
    pub api_base_url: Option<String>,

    /// Per-request timeout; no timeout when unset
    pub timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_kind_from_path() {
        assert_eq!(BinaryKind::from_path(Path::new("app.aab")), BinaryKind::Bundle);
        assert_eq!(BinaryKind::from_path(Path::new("app.AAB")), BinaryKind::Bundle);
        assert_eq!(BinaryKind::from_path(Path::new("app.apk")), BinaryKind::Apk);
        assert_eq!(BinaryKind::from_path(Path::new("app")), BinaryKind::Apk);
        assert_eq!(BinaryKind::Apk.mime_type(), APK_MIME_TYPE);
    }

    #[test]
    fn test_track_name_parsing() {
        assert_eq!("Production".parse::<TrackName>().unwrap(), TrackName::Production);
        assert_eq!("rollout".parse::<TrackName>().unwrap(), TrackName::Rollout);
        assert_eq!(
            "qa-team".parse::<TrackName>().unwrap(),
            TrackName::Custom("qa-team".to_string())
        );
        assert!("  ".parse::<TrackName>().is_err());
        assert_eq!(TrackName::Beta.to_string(), "beta");
    }

    #[test]
    fn test_remote_track_name() {
        assert_eq!(TrackName::Rollout.remote_name(), "production");
        assert_eq!(TrackName::Alpha.remote_name(), "alpha");
        assert_eq!(TrackName::Custom("qa".to_string()).remote_name(), "qa");
    }

    #[test]
    fn test_user_fraction_only_for_rollout() {
        let codes = BTreeSet::from([1, 2]);

        let rollout = TrackUpdate::new(TrackName::Rollout, codes.clone(), Some(0.25));
        assert_eq!(rollout.user_fraction(), Some(0.25));

        let beta = TrackUpdate::new(TrackName::Beta, codes, Some(0.25));
        assert_eq!(beta.user_fraction(), None);
        assert_eq!(beta.version_codes().len(), 2);
    }

    #[test]
    fn test_upload_debug_hides_bytes() {
        let upload = BinaryUpload {
            path: PathBuf::from("app.apk"),
            kind: BinaryKind::Apk,
            data: vec![0; 16],
        };
        let debug = format!("{:?}", upload);
        assert!(debug.contains("bytes: 16"));
    }
}
