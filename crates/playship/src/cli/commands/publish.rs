//! Publish command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::info;

use playship_core::config::{load_config, load_config_or_default};
use playship_core::{PublishConfig, PublishReport, Publisher};
use playship_stores::{CredentialSource, TrackName};

use crate::cli::output::{self, header, key_value, path_style, track_style, version_style};
use crate::cli::{Cli, OutputFormat};

/// Upload binaries, update a track and attach metadata in a single edit
#[derive(Debug, Args)]
pub struct PublishCommand {
    /// Primary binary path or glob (overrides the configured `binary`)
    pub binary: Option<String>,

    /// Further binary path or glob; repeatable
    #[arg(long = "additional-binary", value_name = "PATTERN")]
    pub additional_binaries: Vec<String>,

    /// Package name; read from the primary binary when omitted
    #[arg(long)]
    pub package_name: Option<String>,

    /// Release track (internal, alpha, beta, production, rollout or custom)
    #[arg(long)]
    pub track: Option<TrackName>,

    /// Fraction of users for the rollout track, in (0, 1]
    #[arg(long)]
    pub user_fraction: Option<f64>,

    /// Changelog attached to every uploaded version code
    #[arg(long)]
    pub changelog_file: Option<PathBuf>,

    /// Fastlane-style metadata directory
    #[arg(long)]
    pub metadata_root: Option<PathBuf>,

    /// Language the changelog file is attached under
    #[arg(long)]
    pub language_code: Option<String>,

    /// Path to the service account JSON key
    #[arg(long, value_name = "PATH")]
    pub service_account_key: Option<PathBuf>,

    /// Timeout for each remote call, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Binary uploads allowed in flight at once
    #[arg(long)]
    pub max_concurrent_uploads: Option<usize>,

    /// Configuration file; discovered from the working directory when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, hide = true)]
    pub api_base_url: Option<String>,
}

impl PublishCommand {
    /// Execute the publish command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = self.resolve_config()?;
        info!(
            binary = %config.binary,
            track = %config.track,
            additional = config.additional_binaries.len(),
            "executing publish command"
        );

        let publisher = Publisher::google_play(config)?;

        if !cli.quiet && cli.format == OutputFormat::Text {
            output::info(&format!(
                "Publishing {} to {}",
                style(&publisher.config().binary).bold(),
                track_style().apply_to(&publisher.config().track)
            ));
        }

        let rt = tokio::runtime::Runtime::new()?;
        let report = rt.block_on(publisher.publish())?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    print_report(&report);
                }
            }
        }

        Ok(())
    }

    /// Configuration file (explicit or discovered) with flags applied on top
    fn resolve_config(&self) -> anyhow::Result<PublishConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => {
                let cwd = std::env::current_dir().context("reading working directory")?;
                let (config, path) = load_config_or_default(&cwd)?;
                if let Some(path) = path {
                    info!(path = %path.display(), "using configuration file");
                }
                config
            }
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut PublishConfig) {
        if let Some(binary) = &self.binary {
            config.binary = binary.clone();
        }
        if !self.additional_binaries.is_empty() {
            config.additional_binaries = self.additional_binaries.clone();
        }
        if let Some(package_name) = &self.package_name {
            config.package_name = Some(package_name.clone());
        }
        if let Some(track) = &self.track {
            config.track = track.clone();
        }
        if let Some(fraction) = self.user_fraction {
            config.user_fraction = Some(fraction);
        }
        if let Some(path) = &self.changelog_file {
            config.changelog_file = Some(path.clone());
        }
        if let Some(root) = &self.metadata_root {
            config.metadata_root = Some(root.clone());
        }
        if let Some(language) = &self.language_code {
            config.language_code = language.clone();
        }
        if let Some(path) = &self.service_account_key {
            config.credentials = CredentialSource::KeyFile { path: path.clone() };
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = Some(timeout);
        }
        if let Some(limit) = self.max_concurrent_uploads {
            config.max_concurrent_uploads = limit;
        }
        if let Some(url) = &self.api_base_url {
            config.api_base_url = Some(url.clone());
        }
    }
}

fn print_report(report: &PublishReport) {
    output::success(&format!("Committed edit {}", report.edit_id));
    println!("{}", key_value("Package", &report.package_name));
    println!(
        "{}",
        key_value("Track", &track_style().apply_to(&report.track).to_string())
    );
    println!(
        "{}",
        key_value(
            "Version codes",
            &version_style()
                .apply_to(output::version_codes(&report.version_codes))
                .to_string()
        )
    );

    println!();
    println!("{}", header("Binaries"));
    for artifact in &report.artifacts {
        println!(
            "  {} {} ({})",
            version_style().apply_to(artifact.version_code),
            path_style().apply_to(artifact.path.display()),
            style(&artifact.content_hash[..artifact.content_hash.len().min(12)]).dim()
        );
    }

    if !report.changelogs.is_empty() {
        println!(
            "{}",
            key_value("Changelog", &output::version_codes(&report.changelogs))
        );
    }

    if !report.languages.is_empty() {
        println!();
        println!("{}", header("Metadata"));
        for language in &report.languages {
            let mut parts = Vec::new();
            if language.listing {
                parts.push("listing".to_string());
            }
            if !language.changelogs.is_empty() {
                parts.push(format!(
                    "changelogs {}",
                    output::version_codes(&language.changelogs)
                ));
            }
            if language.images > 0 {
                parts.push(format!("{} images", language.images));
            }
            let summary = if parts.is_empty() {
                "nothing attached".to_string()
            } else {
                parts.join(", ")
            };
            println!("{}", key_value(&language.language_code, &summary));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> PublishCommand {
        let mut argv = vec!["playship", "publish"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            crate::cli::Commands::Publish(cmd) => *cmd,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let cmd = parse(&[
            "app/*.aab",
            "--additional-binary",
            "wear.aab",
            "--additional-binary",
            "tv.aab",
            "--track",
            "Rollout",
            "--user-fraction",
            "0.25",
            "--service-account-key",
            "key.json",
            "--timeout",
            "30",
        ]);

        let mut config = PublishConfig {
            binary: "old.apk".to_string(),
            additional_binaries: vec!["stale.apk".to_string()],
            language_code: "de-DE".to_string(),
            ..Default::default()
        };
        cmd.apply_overrides(&mut config);

        assert_eq!(config.binary, "app/*.aab");
        assert_eq!(config.additional_binaries, vec!["wear.aab", "tv.aab"]);
        assert_eq!(config.track, TrackName::Rollout);
        assert_eq!(config.user_fraction, Some(0.25));
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(
            config.credentials,
            CredentialSource::KeyFile {
                path: PathBuf::from("key.json")
            }
        );
        // Untouched fields keep their configured values
        assert_eq!(config.language_code, "de-DE");
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cmd = parse(&[]);
        let original = PublishConfig {
            binary: "app.apk".to_string(),
            track: TrackName::Beta,
            max_concurrent_uploads: 2,
            ..Default::default()
        };
        let mut config = original.clone();
        cmd.apply_overrides(&mut config);
        assert_eq!(config, original);
    }

    #[test]
    fn test_custom_track_flag() {
        let cmd = parse(&["app.aab", "--track", "qa-team"]);
        assert_eq!(cmd.track, Some(TrackName::Custom("qa-team".to_string())));
    }

    #[test]
    fn test_explicit_config_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("release.toml");
        std::fs::write(
            &path,
            "binary = \"app.aab\"\ntrack = \"beta\"\nmetadata_root = \"meta\"\n",
        )
        .unwrap();

        let config_arg = path.to_string_lossy().to_string();
        let cmd = parse(&["--config", &config_arg, "--track", "alpha"]);
        let config = cmd.resolve_config().unwrap();
        assert_eq!(config.binary, "app.aab");
        assert_eq!(config.track, TrackName::Alpha);
        assert_eq!(config.metadata_root, Some(PathBuf::from("meta")));
    }
}
