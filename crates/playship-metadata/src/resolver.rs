//! Metadata directory resolution.

use crate::changelog::ChangelogSet;
use crate::images::resolve_images;
use crate::listing::read_listing;
use crate::{ChangelogEntry, ImageAssetSet, LocalizedListing, MetadataError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything resolved from one language directory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLanguage {
    pub language_code: String,
    pub directory: PathBuf,
    pub listing: LocalizedListing,
    /// `None` when the language has no images at all.
    pub images: Option<ImageAssetSet>,
    /// `None` when the language has no `changelogs/` directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelogs: Option<ChangelogSet>,
}

impl ResolvedLanguage {
    /// Matches this language's changelogs against the uploaded version codes.
    pub fn changelog_entries(
        &self,
        known_version_codes: &BTreeSet<i64>,
    ) -> Result<Vec<ChangelogEntry>> {
        match &self.changelogs {
            Some(set) => set.match_versions(known_version_codes),
            None => Ok(Vec::new()),
        }
    }
}

/// Resolves a Fastlane-style metadata root into typed upload requests.
///
/// Reads only; never writes to disk and never touches the network.
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    root: PathBuf,
}

impl MetadataResolver {
    /// Creates a resolver for the metadata root (the directory holding the
    /// language directories).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the language directories under the root, sorted.
    ///
    /// Hidden directories are skipped; plain files are ignored.
    pub fn languages(&self) -> Result<Vec<String>> {
        let meta = std::fs::metadata(&self.root)
            .map_err(|_| MetadataError::RootNotFound(self.root.clone()))?;
        if !meta.is_dir() {
            return Err(MetadataError::NotADirectory(self.root.clone()));
        }

        let entries = std::fs::read_dir(&self.root).map_err(|source| MetadataError::ReadDir {
            path: self.root.clone(),
            source,
        })?;

        let mut languages: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                std::fs::metadata(entry.path())
                    .map(|m| m.is_dir())
                    .unwrap_or(false)
            })
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();
        languages.sort();

        debug!(root = %self.root.display(), ?languages, "found language directories");
        Ok(languages)
    }

    /// Resolves one language directory.
    pub fn resolve(&self, language_code: &str) -> Result<ResolvedLanguage> {
        resolve_language_dir(&self.root.join(language_code), language_code)
    }
}

/// Resolves a language directory that may live anywhere.
pub fn resolve_language_dir(directory: &Path, language_code: &str) -> Result<ResolvedLanguage> {
    debug!(language = language_code, path = %directory.display(), "resolving metadata");

    let listing = read_listing(directory, language_code);
    let images = Some(resolve_images(directory, language_code)).filter(|set| !set.is_empty());
    let changelogs = ChangelogSet::discover(&directory.join("changelogs"), language_code)?;

    Ok(ResolvedLanguage {
        language_code: language_code.to_string(),
        directory: directory.to_path_buf(),
        listing,
        images,
        changelogs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageType;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_languages_are_sorted_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("fr-FR")).unwrap();
        std::fs::create_dir_all(temp.path().join("en-US")).unwrap();
        std::fs::create_dir_all(temp.path().join(".git")).unwrap();
        write(temp.path(), "README.md", "ignored");

        let resolver = MetadataResolver::new(temp.path());
        assert_eq!(resolver.languages().unwrap(), vec!["en-US", "fr-FR"]);
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let resolver = MetadataResolver::new(temp.path().join("metadata"));
        assert!(matches!(
            resolver.languages(),
            Err(MetadataError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_root_is_a_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "metadata", "");
        let resolver = MetadataResolver::new(temp.path().join("metadata"));
        assert!(matches!(
            resolver.languages(),
            Err(MetadataError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_resolve_full_language() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "en-US/title.txt", "App");
        write(temp.path(), "en-US/images/icon.png", "png");
        write(temp.path(), "en-US/images/phoneScreenshots/1.png", "png");
        write(temp.path(), "en-US/changelogs/42.txt", "Fixes");
        write(temp.path(), "en-US/unrelated.json", "{}");

        let resolver = MetadataResolver::new(temp.path());
        let resolved = resolver.resolve("en-US").unwrap();

        assert_eq!(resolved.listing.title.as_deref(), Some("App"));
        let images = resolved.images.as_ref().unwrap();
        assert_eq!(images.get(ImageType::Icon).len(), 1);
        assert_eq!(images.get(ImageType::PhoneScreenshots).len(), 1);

        let entries = resolved.changelog_entries(&BTreeSet::from([42])).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "Fixes");
    }

    #[test]
    fn test_resolve_empty_language() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("es-ES")).unwrap();

        let resolved = MetadataResolver::new(temp.path()).resolve("es-ES").unwrap();

        assert!(resolved.listing.is_empty());
        assert!(resolved.images.is_none());
        assert!(resolved.changelogs.is_none());
        assert!(resolved
            .changelog_entries(&BTreeSet::from([1, 2]))
            .unwrap()
            .is_empty());
    }
}
