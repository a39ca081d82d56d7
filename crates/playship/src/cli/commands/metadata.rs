//! Metadata inspection command

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;
use tracing::info;

use playship_metadata::{ChangelogEntry, MetadataResolver, ResolvedLanguage};

use crate::cli::output::{self, header, key_value, path_style};
use crate::cli::{Cli, OutputFormat};

/// Local metadata tree commands
#[derive(Debug, Args)]
pub struct MetadataCommand {
    #[command(subcommand)]
    pub command: MetadataSubcommand,
}

/// Metadata subcommands
#[derive(Debug, Subcommand)]
pub enum MetadataSubcommand {
    /// Show what a publish run would attach for each language
    Inspect(InspectCommand),
}

/// Resolve a metadata root without contacting the store
#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Metadata root (one directory per language)
    #[arg(default_value = "fastlane/metadata/android")]
    pub root: PathBuf,

    /// Version codes to match changelogs against, comma separated
    #[arg(long, value_delimiter = ',')]
    pub version_codes: Vec<i64>,

    /// Only inspect this language
    #[arg(long)]
    pub language: Option<String>,
}

/// One language as printed in JSON output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageView {
    #[serde(flatten)]
    resolved: ResolvedLanguage,
    /// Changelogs that would be attached to the given version codes
    matched_changelogs: Vec<ChangelogEntry>,
}

impl MetadataCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            MetadataSubcommand::Inspect(cmd) => cmd.execute(cli),
        }
    }
}

impl InspectCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(root = %self.root.display(), "executing metadata inspect command");
        let views = self.inspect()?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&views)?);
            }
            OutputFormat::Text => {
                if views.is_empty() {
                    output::warning(&format!(
                        "No languages found in {}",
                        self.root.display()
                    ));
                }
                for view in &views {
                    print_language(view, !self.version_codes.is_empty());
                }
            }
        }

        Ok(())
    }

    fn inspect(&self) -> anyhow::Result<Vec<LanguageView>> {
        let resolver = MetadataResolver::new(&self.root);
        let known: BTreeSet<i64> = self.version_codes.iter().copied().collect();

        let languages = match &self.language {
            Some(language) => vec![language.clone()],
            None => resolver.languages()?,
        };

        languages
            .iter()
            .map(|language| {
                let resolved = resolver.resolve(language)?;
                let matched_changelogs = resolved.changelog_entries(&known)?;
                Ok(LanguageView {
                    resolved,
                    matched_changelogs,
                })
            })
            .collect()
    }
}

fn print_language(view: &LanguageView, show_matches: bool) {
    let resolved = &view.resolved;
    println!(
        "{} {}",
        header(&resolved.language_code),
        path_style().apply_to(resolved.directory.display())
    );

    let listing = &resolved.listing;
    let fields = [
        ("Title", &listing.title),
        ("Short description", &listing.short_description),
        ("Full description", &listing.full_description),
        ("Video", &listing.video),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            println!("{}", key_value(name, &summarize(value)));
        }
    }
    if listing.is_empty() {
        println!("{}", key_value("Listing", "empty"));
    }

    match &resolved.images {
        Some(images) => {
            for (image_type, assets) in images.iter() {
                let files: Vec<String> = assets
                    .iter()
                    .map(|a| {
                        a.path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default()
                    })
                    .collect();
                println!("{}", key_value(image_type.as_str(), &files.join(", ")));
            }
        }
        None => println!("{}", key_value("Images", "none")),
    }

    if let Some(changelogs) = &resolved.changelogs {
        println!(
            "{}",
            key_value("Changelog files", &changelogs.files.len().to_string())
        );
    }
    if show_matches {
        let codes: Vec<i64> = view
            .matched_changelogs
            .iter()
            .map(|entry| entry.version_code)
            .collect();
        println!(
            "{}",
            key_value("Changelogs for", &output::version_codes(&codes))
        );
    }
    println!();
}

/// First line of a text field, shortened for display
fn summarize(value: &str) -> String {
    let line = value.lines().next().unwrap_or_default();
    let short: String = line.chars().take(60).collect();
    if short.len() < value.trim_end().len() {
        format!("{}{}", short, style("…").dim())
    } else {
        short
    }
}
