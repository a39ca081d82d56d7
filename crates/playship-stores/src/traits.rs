//! Remote edit client traits

use crate::error::Result;
use crate::types::*;
use playship_metadata::LocalizedListing;
use std::sync::Arc;

/// Remote surface of an edit transaction.
///
/// Every call is independent and reports its own success or failure. Nothing
/// staged through these calls becomes visible until [`EditClient::commit`]
/// succeeds; an edit that is never committed expires on the store side.
#[async_trait::async_trait]
pub trait EditClient: Send + Sync {
    /// Open a new edit for a package
    async fn open_edit(&self, package_name: &str) -> Result<Edit>;

    /// Upload an APK or app bundle and return the assigned version code
    async fn upload_binary(&self, target: &EditTarget, upload: BinaryUpload)
        -> Result<UploadedBinary>;

    /// Assign version codes to a release track
    async fn update_track(&self, target: &EditTarget, update: &TrackUpdate) -> Result<()>;

    /// Patch the text fields of one localized listing
    async fn patch_listing(&self, target: &EditTarget, listing: &LocalizedListing) -> Result<()>;

    /// Upload a single listing image
    async fn upload_image(&self, target: &EditTarget, upload: ImageUpload) -> Result<()>;

    /// Set the release notes of one version code for one language
    async fn update_changelog(&self, target: &EditTarget, update: &ChangelogUpdate) -> Result<()>;

    /// Commit the edit, making every staged change live
    async fn commit(&self, target: &EditTarget) -> Result<()>;
}

/// Produces an authorized [`EditClient`].
#[async_trait::async_trait]
pub trait ClientProvider: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn EditClient>>;
}
