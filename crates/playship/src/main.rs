//! Playship - publish Android releases to Google Play

mod cli;
mod exit_codes;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::{output, Cli, OutputFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let guard = init_tracing(cli.verbose);

    let code = match cli.execute() {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            report_failure(&cli, &err);
            exit_codes::for_error(&err)
        }
    };

    // Flush the file appender before exiting
    drop(guard);
    ExitCode::from(code)
}

fn report_failure(cli: &Cli, err: &anyhow::Error) {
    match cli.format {
        OutputFormat::Json => {
            let (kind, step) = match err.downcast_ref::<playship_core::PublishError>() {
                Some(publish) => (publish.kind(), Some(publish.step().as_str())),
                None => ("error", None),
            };
            let body = serde_json::json!({
                "error": {
                    "kind": kind,
                    "step": step,
                    "message": format!("{:#}", err),
                }
            });
            println!("{}", body);
        }
        OutputFormat::Text => output::error(&format!("{:#}", err)),
    }
}

/// Set up tracing with two layers:
/// - Console: controlled by RUST_LOG (default: warn, debug with --verbose)
/// - File: always debug-level JSON to ~/.playship/logs/
fn init_tracing(verbose: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_level = if verbose { "debug" } else { "warn" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Some(log_dir) = log_directory() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "playship.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(console_filter),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_filter(EnvFilter::new("debug")),
            )
            .init();

        return Some(guard);
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    None
}

/// Returns the log directory path, creating it if needed.
fn log_directory() -> Option<std::path::PathBuf> {
    let log_dir = dirs::home_dir()?.join(".playship").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}
