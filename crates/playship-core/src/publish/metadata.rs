//! Changelog and store listing attachment (steps 6 and 7)

use futures::future::join_all;
use playship_metadata::{ImageAsset, ImageAssetSet, MetadataResolver};
use playship_stores::{
    ChangelogUpdate, EditClient, EditTarget, ImageUpload, StoreError, TrackName,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::{BoxError, ChangelogTarget, MetadataStage, PublishError, Result};
use crate::types::LanguageReport;

/// Failure inside one language, naming the offending item
#[derive(Debug, Error)]
enum AttachError {
    #[error("version code {version_code}: {source}")]
    Changelog {
        version_code: i64,
        #[source]
        source: StoreError,
    },

    #[error("{}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

/// Attach one changelog file to every version code under `language`.
///
/// Returns the version codes that received it.
pub async fn attach_changelog_file(
    client: &dyn EditClient,
    target: &EditTarget,
    track: &TrackName,
    changelog_file: &Path,
    language: &str,
    version_codes: &BTreeSet<i64>,
) -> Result<Vec<i64>> {
    let text = tokio::fs::read_to_string(changelog_file).await.map_err(|e| {
        PublishError::ChangelogUploadFailed {
            target: ChangelogTarget::Language(language.to_string()),
            source: StoreError::Io(e),
        }
    })?;

    for &version_code in version_codes {
        info!(
            path = %changelog_file.display(),
            version_code,
            language,
            "Attaching changelog"
        );

        let update = ChangelogUpdate {
            track: track.clone(),
            language_code: language.to_string(),
            version_code,
            text: text.clone(),
        };
        client
            .update_changelog(target, &update)
            .await
            .map_err(|source| PublishError::ChangelogUploadFailed {
                target: ChangelogTarget::VersionCode(version_code),
                source,
            })?;
    }

    Ok(version_codes.iter().copied().collect())
}

/// Attach every language found under `root`, one language at a time.
///
/// Changelogs for a `(language, version code)` pair listed in `attached` are
/// skipped, so a pair never receives release notes twice.
pub async fn attach_metadata(
    client: &dyn EditClient,
    target: &EditTarget,
    track: &TrackName,
    root: &Path,
    version_codes: &BTreeSet<i64>,
    attached: &BTreeSet<(String, i64)>,
) -> Result<Vec<LanguageReport>> {
    let resolver = MetadataResolver::new(root);
    let languages = resolver
        .languages()
        .map_err(|source| PublishError::InvalidMetadataLayout {
            path: root.to_path_buf(),
            source,
        })?;

    info!(root = %root.display(), count = languages.len(), "Attaching metadata");

    let scope = AttachScope {
        client,
        target,
        track,
        version_codes,
        attached,
    };
    let mut reports = Vec::with_capacity(languages.len());
    for language in &languages {
        reports.push(attach_language(&scope, &resolver, language).await?);
    }
    Ok(reports)
}

/// What every language of one metadata run shares
struct AttachScope<'a> {
    client: &'a dyn EditClient,
    target: &'a EditTarget,
    track: &'a TrackName,
    version_codes: &'a BTreeSet<i64>,
    attached: &'a BTreeSet<(String, i64)>,
}

fn metadata_failed(
    language: &str,
    stage: MetadataStage,
    source: impl Into<BoxError>,
) -> PublishError {
    PublishError::MetadataUploadFailed {
        language: language.to_string(),
        stage,
        source: source.into(),
    }
}

async fn attach_language(
    scope: &AttachScope<'_>,
    resolver: &MetadataResolver,
    language: &str,
) -> Result<LanguageReport> {
    let AttachScope { client, target, .. } = *scope;
    info!(language, "Uploading metadata");
    let resolved = resolver
        .resolve(language)
        .map_err(|e| metadata_failed(language, MetadataStage::Resolve, e))?;

    let mut report = LanguageReport::new(language);

    // (a) listing text
    client
        .patch_listing(target, &resolved.listing)
        .await
        .map_err(|e| metadata_failed(language, MetadataStage::Listing, e))?;
    report.listing = !resolved.listing.is_empty();

    // (b) changelogs matched by file name
    let entries = resolved
        .changelog_entries(scope.version_codes)
        .map_err(|e| metadata_failed(language, MetadataStage::Changelog, e))?;
    for entry in entries {
        let pair = (entry.language_code.clone(), entry.version_code);
        if scope.attached.contains(&pair) {
            debug!(
                language,
                version_code = entry.version_code,
                source = %entry.source.display(),
                "Release notes already attached from the changelog file, skipping"
            );
            continue;
        }
        debug!(
            language,
            version_code = entry.version_code,
            source = %entry.source.display(),
            "Attaching changelog"
        );
        let update = ChangelogUpdate {
            track: scope.track.clone(),
            language_code: entry.language_code,
            version_code: entry.version_code,
            text: entry.text,
        };
        client.update_changelog(target, &update).await.map_err(|source| {
            metadata_failed(
                language,
                MetadataStage::Changelog,
                AttachError::Changelog {
                    version_code: entry.version_code,
                    source,
                },
            )
        })?;
        report.changelogs.push(entry.version_code);
    }

    // (c) images
    if let Some(images) = &resolved.images {
        report.images = upload_images(client, target, images)
            .await
            .map_err(|e| metadata_failed(language, MetadataStage::Images, e))?;
    }

    Ok(report)
}

/// Upload all images of a language and return how many were sent.
///
/// Image types go concurrently; the files of one type go in resolved order so
/// galleries keep their order. Every type is awaited before returning.
async fn upload_images(
    client: &dyn EditClient,
    target: &EditTarget,
    images: &ImageAssetSet,
) -> std::result::Result<usize, AttachError> {
    let per_type = images.iter().map(|(_, assets)| async move {
        for asset in assets {
            upload_image(client, target, asset).await?;
        }
        Ok::<usize, AttachError>(assets.len())
    });

    let counts = join_all(per_type)
        .await
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(counts.into_iter().sum())
}

async fn upload_image(
    client: &dyn EditClient,
    target: &EditTarget,
    asset: &ImageAsset,
) -> std::result::Result<(), AttachError> {
    let failed = |source: StoreError| AttachError::Image {
        path: asset.path.clone(),
        source,
    };

    let data = tokio::fs::read(&asset.path)
        .await
        .map_err(|e| failed(StoreError::Io(e)))?;

    debug!(
        language = %asset.language_code,
        image_type = %asset.image_type,
        path = %asset.path.display(),
        "Uploading image"
    );

    client
        .upload_image(
            target,
            ImageUpload {
                language_code: asset.language_code.clone(),
                image_type: asset.image_type,
                mime_type: asset.mime_type,
                path: asset.path.clone(),
                data,
            },
        )
        .await
        .map_err(failed)
}
