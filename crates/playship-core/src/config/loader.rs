//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ConfigError;

use super::defaults::config_file_names;
use super::types::PublishConfig;

/// Load configuration from a file.
///
/// The result is not validated; command-line overrides are usually applied
/// first and [`validate_config`](super::validate_config) runs afterwards.
pub fn load_config(path: &Path) -> Result<PublishConfig, ConfigError> {
    let is_toml = path.extension().is_some_and(|e| e == "toml");
    let format = if is_toml { "TOML" } else { "YAML" };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path)?;

    let config: PublishConfig = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks:
///   1. `<dir>/<name>`          (e.g. `playship.toml`)
///   2. `<dir>/.github/<name>`  (e.g. `.github/playship.toml`)
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.is_file() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.is_file() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(PublishConfig, PathBuf), ConfigError> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration or fall back to defaults when no file exists.
///
/// A file that exists but fails to parse is still an error.
pub fn load_config_or_default(dir: &Path) -> Result<(PublishConfig, Option<PathBuf>), ConfigError> {
    match find_config(dir) {
        Some(path) => Ok((load_config(&path)?, Some(path))),
        None => {
            debug!(dir = %dir.display(), "no config found, using defaults");
            Ok((PublishConfig::default(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playship_stores::TrackName;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("playship.toml");
        std::fs::write(&config_path, "binary = \"app.aab\"").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("playship.toml");
        let yaml_path = temp.path().join("playship.yaml");
        std::fs::write(&toml_path, "binary = \"app.aab\"").unwrap();
        std::fs::write(&yaml_path, "binary: app.apk").unwrap();

        let found = find_config(temp.path()).unwrap();
        assert_eq!(found, toml_path);
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("playship.yaml");
        std::fs::write(&config_path, "binary: app.apk").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_walks_parents() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(".playship.toml");
        std::fs::write(&config_path, "binary = \"app.aab\"").unwrap();
        let nested = temp.path().join("android").join("app");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("playship.yaml");
        std::fs::write(
            &config_path,
            "binary: app.apk\nadditional_binaries:\n  - wear.apk\ntrack: beta\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.track, TrackName::Beta);
        assert_eq!(config.additional_binaries, vec!["wear.apk".to_string()]);
    }

    #[test]
    fn test_load_config_rejects_malformed_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("playship.toml");
        std::fs::write(&config_path, "binary = ").unwrap();

        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config, PublishConfig::default());
    }
}
