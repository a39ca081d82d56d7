//! Changelog discovery and version-code matching.
//!
//! Files in `changelogs/` are matched to version codes by base name
//! (`100.txt` belongs to version code 100). When no file matches by name
//! and the directory holds exactly one file, that file applies to every
//! known version code. With several files and no match nothing is attached.

use crate::{ChangelogEntry, MetadataError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A changelog file found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogFile {
    pub path: PathBuf,
    /// Version code parsed from the file's base name, if it is an integer.
    pub version_code: Option<i64>,
}

impl ChangelogFile {
    fn new(path: PathBuf) -> Self {
        let version_code = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i64>().ok());
        Self { path, version_code }
    }
}

/// Every regular file in one language's `changelogs/` directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogSet {
    pub language_code: String,
    pub files: Vec<ChangelogFile>,
}

impl ChangelogSet {
    /// Scans a changelog directory.
    ///
    /// Returns `Ok(None)` when the directory does not exist.
    pub fn discover(changelog_dir: &Path, language_code: &str) -> Result<Option<Self>> {
        match std::fs::metadata(changelog_dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                warn!(path = %changelog_dir.display(), "changelogs is not a directory, skipping");
                return Ok(None);
            }
            Err(_) => return Ok(None),
        }

        let entries = std::fs::read_dir(changelog_dir).map_err(|source| MetadataError::ReadDir {
            path: changelog_dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    debug!(error = %e, "failed to read directory entry, ignoring");
                    continue;
                }
            };
            debug!(path = %path.display(), "checking changelog file");
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => files.push(ChangelogFile::new(path)),
                Ok(_) => {}
                Err(e) => debug!(path = %path.display(), error = %e, "failed to stat, ignoring"),
            }
        }

        Ok(Some(Self {
            language_code: language_code.to_string(),
            files,
        }))
    }

    /// Maps the discovered files onto known version codes.
    ///
    /// Produces at most one entry per version code, sorted by version code.
    pub fn match_versions(
        &self,
        known_version_codes: &BTreeSet<i64>,
    ) -> Result<Vec<ChangelogEntry>> {
        if self.files.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_version: BTreeMap<i64, &ChangelogFile> = BTreeMap::new();
        for file in &self.files {
            let Some(code) = file.version_code.filter(|c| known_version_codes.contains(c)) else {
                debug!(path = %file.path.display(), "file is not a known version code");
                continue;
            };
            if let Some(existing) = by_version.get(&code) {
                warn!(
                    version_code = code,
                    kept = %existing.path.display(),
                    ignored = %file.path.display(),
                    "several changelogs for one version code"
                );
                continue;
            }
            by_version.insert(code, file);
        }

        if !by_version.is_empty() {
            return by_version
                .into_iter()
                .map(|(code, file)| {
                    info!(path = %file.path.display(), version_code = code, "attaching changelog");
                    Ok(self.entry(code, &file.path, read_changelog(&file.path)?))
                })
                .collect();
        }

        if let [only] = self.files.as_slice() {
            debug!(path = %only.path.display(), "applying single changelog to all version codes");
            let text = read_changelog(&only.path)?;
            return Ok(known_version_codes
                .iter()
                .map(|code| self.entry(*code, &only.path, text.clone()))
                .collect());
        }

        info!(
            language = %self.language_code,
            files = self.files.len(),
            "no changelog matches a version code, skipping"
        );
        Ok(Vec::new())
    }

    fn entry(&self, version_code: i64, path: &Path, text: String) -> ChangelogEntry {
        ChangelogEntry {
            language_code: self.language_code.clone(),
            version_code,
            text,
            source: path.to_path_buf(),
        }
    }
}

/// Matches the changelogs in `changelog_dir` against known version codes.
pub fn match_changelogs(
    changelog_dir: &Path,
    language_code: &str,
    known_version_codes: &BTreeSet<i64>,
) -> Result<Vec<ChangelogEntry>> {
    match ChangelogSet::discover(changelog_dir, language_code)? {
        Some(set) => set.match_versions(known_version_codes),
        None => Ok(Vec::new()),
    }
}

fn read_changelog(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| MetadataError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn codes(values: &[i64]) -> BTreeSet<i64> {
        values.iter().copied().collect()
    }

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_matches_by_file_name_without_fallback() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "100.txt", "first");
        write(temp.path(), "101.txt", "second");

        let entries = match_changelogs(temp.path(), "en-US", &codes(&[100, 101, 102])).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].version_code, 100);
        assert_eq!(entries[0].text, "first");
        assert_eq!(entries[1].version_code, 101);
        assert_eq!(entries[1].text, "second");
        assert!(entries.iter().all(|e| e.language_code == "en-US"));
    }

    #[test]
    fn test_single_unmatched_file_applies_to_all() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "notes.txt", "Bug fixes");

        let entries = match_changelogs(temp.path(), "de-DE", &codes(&[100, 101])).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].version_code, 100);
        assert_eq!(entries[1].version_code, 101);
        assert!(entries.iter().all(|e| e.text == "Bug fixes"));
        assert!(entries.iter().all(|e| e.source.ends_with("notes.txt")));
    }

    #[test]
    fn test_single_file_for_unknown_version_applies_to_all() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "99.txt", "Old notes");

        let entries = match_changelogs(temp.path(), "en-US", &codes(&[100])).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version_code, 100);
        assert_eq!(entries[0].text, "Old notes");
    }

    #[test]
    fn test_several_unmatched_files_attach_nothing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", "a");
        write(temp.path(), "b.txt", "b");

        let entries = match_changelogs(temp.path(), "en-US", &codes(&[100, 101])).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_partial_match_does_not_fall_back() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "100.txt", "only hundred");

        let entries = match_changelogs(temp.path(), "en-US", &codes(&[100, 101])).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version_code, 100);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let entries =
            match_changelogs(&temp.path().join("changelogs"), "en-US", &codes(&[1])).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_subdirectories_are_not_changelogs() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("100")).unwrap();
        write(temp.path(), "notes.txt", "All");

        let set = ChangelogSet::discover(temp.path(), "en-US").unwrap().unwrap();
        assert_eq!(set.files.len(), 1);

        let entries = set.match_versions(&codes(&[100])).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "All");
    }

    #[test]
    fn test_one_entry_per_version_code() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "100.txt", "txt");
        write(temp.path(), "100.md", "md");

        let entries = match_changelogs(temp.path(), "en-US", &codes(&[100])).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version_code, 100);
    }

    #[test]
    fn test_version_code_parsing_is_strict() {
        assert_eq!(ChangelogFile::new(PathBuf::from("12.txt")).version_code, Some(12));
        assert_eq!(ChangelogFile::new(PathBuf::from("12")).version_code, Some(12));
        assert_eq!(ChangelogFile::new(PathBuf::from("12-beta.txt")).version_code, None);
        assert_eq!(ChangelogFile::new(PathBuf::from("notes.txt")).version_code, None);
    }
}
