//! Binary resolution and upload (steps 1 and 4)

use futures::stream::{self, StreamExt};
use playship_stores::{BinaryArtifact, BinaryKind, BinaryUpload, EditClient, EditTarget, StoreError};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::PublishConfig;
use crate::error::{PublishError, Result};

/// Resolve a configured binary path that may be a glob pattern.
///
/// Surrounding double quotes are stripped and the first match wins. When
/// nothing matches, the literal path is returned so the caller reports the
/// missing file.
pub fn resolve_binary_path(pattern: &str) -> PathBuf {
    let pattern = pattern.trim().trim_matches('"');

    match glob::glob(pattern) {
        Ok(paths) => {
            if let Some(path) = paths.filter_map(|p| p.ok()).next() {
                debug!(pattern, path = %path.display(), "resolved binary pattern");
                return path;
            }
            debug!(pattern, "no match for binary pattern, using it as a path");
        }
        Err(e) => {
            debug!(pattern, error = %e, "not a valid glob, using it as a path");
        }
    }

    PathBuf::from(pattern)
}

/// Resolve every configured binary, primary first.
///
/// The result is never empty: the primary binary is always at index 0.
///
/// Fails with [`PublishError::InvalidBinary`] for the first path that is not a
/// regular file.
pub fn resolve_binaries(config: &PublishConfig) -> Result<Vec<PathBuf>> {
    config
        .binary_patterns()
        .map(|pattern| {
            let path = resolve_binary_path(pattern);
            if path.is_file() {
                Ok(path)
            } else {
                Err(PublishError::InvalidBinary {
                    source: StoreError::InvalidArtifact(format!(
                        "{} is not a file",
                        path.display()
                    )),
                    path,
                })
            }
        })
        .collect()
}

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

async fn upload_binary(
    client: &dyn EditClient,
    target: &EditTarget,
    path: &Path,
) -> Result<BinaryArtifact> {
    let failed = |source: StoreError| PublishError::BinaryUploadFailed {
        path: path.to_path_buf(),
        source,
    };

    let data = tokio::fs::read(path)
        .await
        .map_err(|e| failed(StoreError::Io(e)))?;
    let content_hash = sha256_hex(&data);
    let kind = BinaryKind::from_path(path);

    info!(path = %path.display(), ?kind, bytes = data.len(), "Uploading binary");

    let uploaded = client
        .upload_binary(
            target,
            BinaryUpload {
                path: path.to_path_buf(),
                kind,
                data,
            },
        )
        .await
        .map_err(failed)?;

    if let Some(remote) = &uploaded.sha256 {
        if !remote.eq_ignore_ascii_case(&content_hash) {
            warn!(
                path = %path.display(),
                local = %content_hash,
                remote = %remote,
                "Store reported a different SHA-256 for the uploaded binary"
            );
        }
    }

    debug!(path = %path.display(), version_code = uploaded.version_code, "Binary uploaded");

    Ok(BinaryArtifact {
        path: path.to_path_buf(),
        version_code: uploaded.version_code,
        content_hash,
    })
}

/// Upload every binary, at most `max_concurrent` at a time.
///
/// All uploads are awaited before returning, even after one has failed.
/// Artifacts come back in input order; the first failure in input order is
/// reported.
pub async fn upload_binaries(
    client: &dyn EditClient,
    target: &EditTarget,
    paths: &[PathBuf],
    max_concurrent: usize,
) -> Result<Vec<BinaryArtifact>> {
    let results: Vec<Result<BinaryArtifact>> = stream::iter(paths)
        .map(|path| upload_binary(client, target, path))
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_glob_first_match() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("app-b.aab"), b"b").unwrap();
        std::fs::write(temp.path().join("app-a.aab"), b"a").unwrap();

        let pattern = format!("{}/app-*.aab", temp.path().display());
        assert_eq!(resolve_binary_path(&pattern), temp.path().join("app-a.aab"));
    }

    #[test]
    fn test_resolve_strips_quotes() {
        let temp = TempDir::new().unwrap();
        let apk = temp.path().join("app.apk");
        std::fs::write(&apk, b"apk").unwrap();

        let pattern = format!("\"{}\"", apk.display());
        assert_eq!(resolve_binary_path(&pattern), apk);
    }

    #[test]
    fn test_resolve_no_match_keeps_literal() {
        assert_eq!(
            resolve_binary_path("/nonexistent/*.apk"),
            PathBuf::from("/nonexistent/*.apk")
        );
    }

    #[test]
    fn test_resolve_binaries_reports_missing_file() {
        let temp = TempDir::new().unwrap();
        let apk = temp.path().join("app.apk");
        std::fs::write(&apk, b"apk").unwrap();

        let config = PublishConfig {
            binary: apk.display().to_string(),
            additional_binaries: vec![temp.path().join("wear.apk").display().to_string()],
            ..Default::default()
        };

        match resolve_binaries(&config) {
            Err(PublishError::InvalidBinary { path, .. }) => {
                assert_eq!(path, temp.path().join("wear.apk"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_binaries_primary_first() {
        let temp = TempDir::new().unwrap();
        for name in ["wear.apk", "phone.apk", "tv.apk"] {
            std::fs::write(temp.path().join(name), name).unwrap();
        }
        let config = PublishConfig {
            binary: temp.path().join("phone.apk").display().to_string(),
            additional_binaries: vec![
                temp.path().join("wear.apk").display().to_string(),
                temp.path().join("tv.apk").display().to_string(),
            ],
            ..Default::default()
        };

        let binaries = resolve_binaries(&config).unwrap();
        let names: Vec<_> = binaries
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["phone.apk", "wear.apk", "tv.apk"]);
    }

    #[test]
    fn test_resolve_binaries_rejects_directory() {
        let temp = TempDir::new().unwrap();
        let config = PublishConfig {
            binary: temp.path().display().to_string(),
            ..Default::default()
        };
        assert!(matches!(
            resolve_binaries(&config),
            Err(PublishError::InvalidBinary { .. })
        ));
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
