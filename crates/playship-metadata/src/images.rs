//! Image set resolution for one language directory.
//!
//! Singleton types are probed as `images/<type>.<ext>` with extension
//! priority `png`, `jpg`, `jpeg`; the first regular file wins. Gallery types
//! take every regular file directly inside `images/<type>/`, in directory
//! enumeration order.

use crate::{ImageAsset, ImageAssetSet, ImageType, MimeType};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extensions probed for singleton image types, highest priority first.
pub const SINGLETON_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Resolves every image under `<language_dir>/images`.
///
/// Missing files and directories yield no assets for that type; nothing
/// here is an error.
pub fn resolve_images(language_dir: &Path, language_code: &str) -> ImageAssetSet {
    let image_dir = language_dir.join("images");
    let mut set = ImageAssetSet::new();

    for image_type in ImageType::ALL {
        debug!(image_type = %image_type, "looking for images");

        let paths = if image_type.is_singleton() {
            find_singleton(&image_dir, image_type).into_iter().collect()
        } else {
            find_gallery(&image_dir, image_type)
        };

        if paths.is_empty() {
            debug!(image_type = %image_type, "no images found");
            continue;
        }

        for path in paths {
            info!(image_type = %image_type, path = %path.display(), "found image");
            set.push(ImageAsset {
                language_code: language_code.to_string(),
                image_type,
                mime_type: resolve_mime_type(&path),
                path,
            });
        }
    }

    set
}

/// Maps a file extension to the mime type sent with the upload.
///
/// `png` is PNG; `jpg`, `jpeg` and anything unrecognized are JPEG.
pub fn resolve_mime_type(path: &Path) -> MimeType {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "png" => MimeType::Png,
        "jpg" | "jpeg" => MimeType::Jpeg,
        _ => {
            debug!(path = %path.display(), "unknown image extension, defaulting to jpeg");
            MimeType::Jpeg
        }
    }
}

fn find_singleton(image_dir: &Path, image_type: ImageType) -> Option<PathBuf> {
    SINGLETON_EXTENSIONS
        .iter()
        .map(|ext| image_dir.join(format!("{}.{}", image_type.as_str(), ext)))
        .find(|candidate| is_file(candidate))
}

fn find_gallery(image_dir: &Path, image_type: ImageType) -> Vec<PathBuf> {
    let dir = image_dir.join(image_type.as_str());

    match std::fs::metadata(&dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            warn!(path = %dir.display(), "image path is not a directory, skipping");
            return Vec::new();
        }
        Err(_) => return Vec::new(),
    }

    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to list image directory, skipping");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_file(path))
        .collect()
}

fn is_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
