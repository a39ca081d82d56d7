//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "playship.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "playship.yaml";

/// Language the single changelog file is attached under
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Binary uploads allowed in flight at once
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 4;

/// Get list of config file names to search for, in priority order
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".playship.toml",
        ".playship.yaml",
    ]
}

/// Starter configuration written by `playship init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Playship configuration

# Binary to publish; globs are allowed and the first match is used
binary = "app/build/outputs/bundle/release/*.aab"
# additional_binaries = []

# internal, alpha, beta, production, rollout or a custom track name
track = "internal"
# user_fraction = 0.1

# changelog_file = "CHANGELOG.txt"
# metadata_root = "fastlane/metadata/android"
language_code = "en-US"

max_concurrent_uploads = 4
# timeout_secs = 120

[credentials]
type = "environment"
"#;
