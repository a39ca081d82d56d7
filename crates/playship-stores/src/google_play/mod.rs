//! Google Play Developer API edit client
//!
//! Implements [`EditClient`] on top of the `androidpublisher/v3` edits
//! resource.
//!
//! ## Authentication
//!
//! Uses a Google Cloud service account with Google Play Developer API access.
//! A short-lived RS256 JWT is exchanged for an OAuth2 bearer token, which is
//! cached until shortly before it expires.
//!
//! ## Usage
//!
//! ```ignore
//! use playship_stores::{google_play::GooglePlayConnector, ClientProvider};
//!
//! let client = GooglePlayConnector::new(config).connect().await?;
//! let edit = client.open_edit("com.example.app").await?;
//! ```

use crate::credentials::ServiceAccountKey;
use crate::error::{Result, StoreError};
use crate::traits::{ClientProvider, EditClient};
use crate::types::*;
use chrono::{Duration, Utc};
use playship_metadata::LocalizedListing;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default API host
pub const DEFAULT_API_BASE_URL: &str = "https://androidpublisher.googleapis.com";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

/// OAuth token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Token cache for thread-safe access
#[derive(Debug, Default)]
struct TokenCache {
    access_token: Option<String>,
    expires_at: Option<chrono::DateTime<Utc>>,
}

/// Builds authorized [`GooglePlayEditClient`]s from a [`GooglePlayConfig`]
#[derive(Debug, Clone)]
pub struct GooglePlayConnector {
    config: GooglePlayConfig,
}

impl GooglePlayConnector {
    pub fn new(config: GooglePlayConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl ClientProvider for GooglePlayConnector {
    async fn connect(&self) -> Result<Arc<dyn EditClient>> {
        let key = self.config.credentials.load()?;
        let client = GooglePlayEditClient::new(&self.config, key)?;

        // Fail authentication here rather than on the first edit call
        client.access_token().await?;
        info!("Authenticated with Google Play as {}", client.service_account.client_email);

        Ok(Arc::new(client))
    }
}

/// Google Play Developer API client
pub struct GooglePlayEditClient {
    /// HTTP client
    client: Client,

    /// `.../androidpublisher/v3`
    api_url: String,

    /// `.../upload/androidpublisher/v3`
    upload_url: String,

    /// Token cache with interior mutability
    token_cache: Arc<RwLock<TokenCache>>,

    /// Service account credentials
    service_account: ServiceAccountKey,
}

impl GooglePlayEditClient {
    /// Create a client; no network traffic happens until the first call
    pub fn new(config: &GooglePlayConfig, service_account: ServiceAccountKey) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base = config
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/');

        Ok(Self {
            client,
            api_url: format!("{}/androidpublisher/v3", base),
            upload_url: format!("{}/upload/androidpublisher/v3", base),
            token_cache: Arc::new(RwLock::new(TokenCache::default())),
            service_account,
        })
    }

    fn token_url(&self) -> &str {
        self.service_account.token_uri.as_deref().unwrap_or(TOKEN_URL)
    }

    /// Get or refresh OAuth2 access token
    async fn access_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let (Some(token), Some(expires)) = (&cache.access_token, cache.expires_at) {
                if Utc::now() < expires - Duration::minutes(5) {
                    return Ok(token.clone());
                }
            }
        }

        let now = Utc::now();
        let exp = now + Duration::hours(1);

        #[derive(Serialize)]
        struct Claims<'a> {
            iss: &'a str,
            scope: &'a str,
            aud: &'a str,
            iat: i64,
            exp: i64,
        }

        let claims = Claims {
            iss: &self.service_account.client_email,
            scope: SCOPE,
            aud: self.token_url(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(
            self.service_account.private_key.as_bytes(),
        )
        .map_err(|e| StoreError::InvalidCredentials(format!("Invalid private key: {}", e)))?;

        let jwt = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &encoding_key,
        )?;

        let response = self
            .client
            .post(self.token_url())
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::AuthenticationFailed(error_text));
        }

        let token_response: TokenResponse = response.json().await?;

        {
            let mut cache = self.token_cache.write().await;
            cache.access_token = Some(token_response.access_token.clone());
            cache.expires_at = Some(Utc::now() + Duration::seconds(token_response.expires_in));
        }

        Ok(token_response.access_token)
    }

    /// Make an authenticated JSON API request
    async fn api_request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.api_url, endpoint);

        let mut request = self.client.request(method.clone(), &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        debug!("Making {} request to {}", method, url);

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.json().await?)
    }

    /// Upload raw bytes to a media endpoint
    async fn media_upload<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<T> {
        let token = self.access_token().await?;
        let url = format!("{}{}?uploadType=media", self.upload_url, endpoint);

        debug!(bytes = data.len(), content_type, "Uploading to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::UploadFailed {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.json().await?)
    }
}

fn edit_path(target: &EditTarget) -> String {
    format!("/applications/{}/edits/{}", target.package_name, target.edit_id)
}

/// Edits resource as returned by `edits.insert`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditResponse {
    id: String,
    #[serde(default)]
    expiry_time_seconds: Option<String>,
}

/// Response of `edits.apks.upload` / `edits.bundles.upload`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    version_code: i64,
    #[serde(default)]
    sha256: Option<String>,
    #[serde(default)]
    binary: Option<BinaryHashes>,
}

#[derive(Debug, Deserialize)]
struct BinaryHashes {
    #[serde(default)]
    sha256: Option<String>,
}

/// Track name and request body for a track update.
///
/// Staged rollouts live on the production track as an `inProgress` release.
fn track_request(update: &TrackUpdate) -> (String, serde_json::Value) {
    let track = update.track().remote_name().to_string();

    let version_codes: Vec<String> = update
        .version_codes()
        .iter()
        .map(|code| code.to_string())
        .collect();

    let mut release = serde_json::json!({
        "versionCodes": version_codes,
        "status": if update.user_fraction().is_some() { "inProgress" } else { "completed" },
    });

    if let Some(fraction) = update.user_fraction() {
        release["userFraction"] = serde_json::json!(fraction);
    }

    let body = serde_json::json!({
        "track": track,
        "releases": [release],
    });

    (track, body)
}

/// Set `update`'s text as the release notes for its language on the release
/// of `track` (a `tracks.get` body) that lists its version code.
///
/// Notes already present for other languages are kept; an existing note for
/// the same language is replaced.
fn merge_release_notes(track: &mut serde_json::Value, update: &ChangelogUpdate) -> Result<()> {
    let code = update.version_code.to_string();
    let release = track
        .get_mut("releases")
        .and_then(serde_json::Value::as_array_mut)
        .and_then(|releases| {
            releases.iter_mut().find(|release| {
                release["versionCodes"].as_array().is_some_and(|codes| {
                    codes.iter().any(|c| {
                        c.as_str() == Some(code.as_str()) || c.as_i64() == Some(update.version_code)
                    })
                })
            })
        })
        .ok_or_else(|| StoreError::ReleaseNotFound {
            track: update.track.remote_name().to_string(),
            version_code: update.version_code,
        })?;

    let note = serde_json::json!({
        "language": update.language_code,
        "text": update.text,
    });

    if !release["releaseNotes"].is_array() {
        release["releaseNotes"] = serde_json::json!([]);
    }
    if let Some(notes) = release["releaseNotes"].as_array_mut() {
        notes.retain(|n| n["language"].as_str() != Some(update.language_code.as_str()));
        notes.push(note);
    }
    Ok(())
}

fn listing_body(listing: &LocalizedListing) -> serde_json::Value {
    let mut body = serde_json::json!({ "language": listing.language_code });
    let fields = [
        ("title", &listing.title),
        ("shortDescription", &listing.short_description),
        ("fullDescription", &listing.full_description),
        ("video", &listing.video),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            body[name] = serde_json::json!(value);
        }
    }
    body
}

#[async_trait::async_trait]
impl EditClient for GooglePlayEditClient {
    async fn open_edit(&self, package_name: &str) -> Result<Edit> {
        let endpoint = format!("/applications/{}/edits", package_name);
        let response: EditResponse = self
            .api_request(reqwest::Method::POST, &endpoint, Some(serde_json::json!({})))
            .await?;

        let expiry_seconds = response
            .expiry_time_seconds
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Ok(Edit {
            id: response.id,
            expiry_seconds,
        })
    }

    async fn upload_binary(
        &self,
        target: &EditTarget,
        upload: BinaryUpload,
    ) -> Result<UploadedBinary> {
        let resource = match upload.kind {
            BinaryKind::Apk => "apks",
            BinaryKind::Bundle => "bundles",
        };
        let endpoint = format!("{}/{}", edit_path(target), resource);

        let response: UploadResponse = self
            .media_upload(&endpoint, upload.kind.mime_type(), upload.data)
            .await?;

        let sha256 = response
            .sha256
            .or_else(|| response.binary.and_then(|b| b.sha256));

        Ok(UploadedBinary {
            version_code: response.version_code,
            sha256,
        })
    }

    async fn update_track(&self, target: &EditTarget, update: &TrackUpdate) -> Result<()> {
        let (track, body) = track_request(update);
        let endpoint = format!("{}/tracks/{}", edit_path(target), track);

        let _: serde_json::Value = self
            .api_request(reqwest::Method::PUT, &endpoint, Some(body))
            .await?;
        Ok(())
    }

    async fn patch_listing(&self, target: &EditTarget, listing: &LocalizedListing) -> Result<()> {
        let endpoint = format!("{}/listings/{}", edit_path(target), listing.language_code);

        let _: serde_json::Value = self
            .api_request(reqwest::Method::PATCH, &endpoint, Some(listing_body(listing)))
            .await?;
        Ok(())
    }

    async fn upload_image(&self, target: &EditTarget, upload: ImageUpload) -> Result<()> {
        let endpoint = format!(
            "{}/listings/{}/{}",
            edit_path(target),
            upload.language_code,
            upload.image_type.as_str()
        );

        let _: serde_json::Value = self
            .media_upload(&endpoint, upload.mime_type.as_str(), upload.data)
            .await?;
        Ok(())
    }

    /// Release notes live on the track release, so the track is read back,
    /// amended and written again.
    async fn update_changelog(&self, target: &EditTarget, update: &ChangelogUpdate) -> Result<()> {
        let endpoint = format!(
            "{}/tracks/{}",
            edit_path(target),
            update.track.remote_name()
        );

        let mut track: serde_json::Value = self
            .api_request(reqwest::Method::GET, &endpoint, None)
            .await?;
        merge_release_notes(&mut track, update)?;

        let _: serde_json::Value = self
            .api_request(reqwest::Method::PUT, &endpoint, Some(track))
            .await?;
        Ok(())
    }

    async fn commit(&self, target: &EditTarget) -> Result<()> {
        let endpoint = format!("{}:commit", edit_path(target));

        let _: serde_json::Value = self
            .api_request(reqwest::Method::POST, &endpoint, None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialSource;
    use std::collections::BTreeSet;

    fn key() -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "ci@example.com".to_string(),
            private_key: "not-a-pem".to_string(),
            token_uri: None,
        }
    }

    #[test]
    fn test_rollout_maps_to_production_in_progress() {
        let update = TrackUpdate::new(TrackName::Rollout, BTreeSet::from([7, 8]), Some(0.1));
        let (track, body) = track_request(&update);

        assert_eq!(track, "production");
        assert_eq!(body["track"], "production");
        let release = &body["releases"][0];
        assert_eq!(release["status"], "inProgress");
        assert_eq!(release["userFraction"], 0.1);
        assert_eq!(release["versionCodes"], serde_json::json!(["7", "8"]));
    }

    fn changelog(
        track: TrackName,
        language: &str,
        version_code: i64,
        text: &str,
    ) -> ChangelogUpdate {
        ChangelogUpdate {
            track,
            language_code: language.to_string(),
            version_code,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_release_notes_join_the_release_holding_the_version_code() {
        let mut track = serde_json::json!({
            "track": "production",
            "releases": [
                { "versionCodes": ["5"], "status": "completed" },
                {
                    "versionCodes": ["7", "8"],
                    "status": "inProgress",
                    "userFraction": 0.1,
                    "releaseNotes": [
                        { "language": "de-DE", "text": "Fehlerbehebungen" },
                        { "language": "en-US", "text": "old" }
                    ]
                }
            ]
        });

        merge_release_notes(&mut track, &changelog(TrackName::Rollout, "en-US", 8, "Bug fixes"))
            .unwrap();

        let release = &track["releases"][1];
        assert_eq!(release["userFraction"], 0.1);
        assert_eq!(
            release["releaseNotes"],
            serde_json::json!([
                { "language": "de-DE", "text": "Fehlerbehebungen" },
                { "language": "en-US", "text": "Bug fixes" }
            ])
        );
        assert!(track["releases"][0].get("releaseNotes").is_none());
    }

    #[test]
    fn test_release_notes_created_when_absent() {
        let mut track = serde_json::json!({
            "track": "beta",
            "releases": [{ "versionCodes": ["3"], "status": "completed" }]
        });

        merge_release_notes(&mut track, &changelog(TrackName::Beta, "fr-FR", 3, "Corrections"))
            .unwrap();

        assert_eq!(
            track["releases"][0]["releaseNotes"],
            serde_json::json!([{ "language": "fr-FR", "text": "Corrections" }])
        );
    }

    #[test]
    fn test_release_notes_for_unknown_version_code() {
        let mut track = serde_json::json!({
            "track": "production",
            "releases": [{ "versionCodes": ["3"], "status": "completed" }]
        });

        let update = changelog(TrackName::Rollout, "en-US", 9, "x");
        let result = merge_release_notes(&mut track, &update);
        assert!(matches!(
            result,
            Err(StoreError::ReleaseNotFound { ref track, version_code: 9 })
                if track == "production"
        ));
    }

    #[test]
    fn test_other_tracks_are_completed_without_fraction() {
        let update = TrackUpdate::new(TrackName::Beta, BTreeSet::from([3]), Some(0.5));
        let (track, body) = track_request(&update);

        assert_eq!(track, "beta");
        let release = &body["releases"][0];
        assert_eq!(release["status"], "completed");
        assert!(release.get("userFraction").is_none());
    }

    #[test]
    fn test_listing_body_skips_absent_fields() {
        let mut listing = LocalizedListing::new("de-DE");
        listing.title = Some("Titel".to_string());

        let body = listing_body(&listing);
        assert_eq!(body["language"], "de-DE");
        assert_eq!(body["title"], "Titel");
        assert!(body.get("fullDescription").is_none());
    }

    #[test]
    fn test_base_url_override() {
        let config = GooglePlayConfig {
            credentials: CredentialSource::Environment,
            api_base_url: Some("http://localhost:8080/".to_string()),
            timeout: Some(std::time::Duration::from_secs(5)),
        };
        let client = GooglePlayEditClient::new(&config, key()).unwrap();
        assert_eq!(client.api_url, "http://localhost:8080/androidpublisher/v3");
        assert_eq!(client.upload_url, "http://localhost:8080/upload/androidpublisher/v3");
        assert_eq!(client.token_url(), TOKEN_URL);
    }

    #[test]
    fn test_edit_path() {
        let target = EditTarget::new("com.example.app", "edit-1");
        assert_eq!(edit_path(&target), "/applications/com.example.app/edits/edit-1");
    }

    #[tokio::test]
    async fn test_invalid_private_key() {
        let client = GooglePlayEditClient::new(&GooglePlayConfig::default(), key()).unwrap();
        assert!(matches!(
            client.access_token().await,
            Err(StoreError::InvalidCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_without_credentials() {
        let connector = GooglePlayConnector::new(GooglePlayConfig {
            credentials: CredentialSource::KeyFile {
                path: "/nonexistent/key.json".into(),
            },
            ..Default::default()
        });
        assert!(connector.connect().await.is_err());
    }
}
