//! Edit transaction orchestration
//!
//! A run walks the edit through a fixed sequence of steps:
//!
//! 1. resolve binaries and read the package name from the primary one
//! 2. obtain an authorized [`EditClient`]
//! 3. open an edit
//! 4. upload every binary and collect the version codes
//! 5. assign the version codes to the track
//! 6. attach a single changelog file to every version code (optional)
//! 7. attach the metadata tree, one language at a time (optional)
//! 8. commit
//!
//! Each step starts only after the previous one fully succeeded. Any failure
//! ends the run and leaves the edit uncommitted; the store discards it when it
//! expires.

mod binaries;
mod metadata;

pub use binaries::{resolve_binaries, resolve_binary_path, sha256_hex, upload_binaries};
pub use metadata::{attach_changelog_file, attach_metadata};

use playship_stores::google_play::GooglePlayConnector;
use playship_stores::{
    ClientProvider, EditClient, GooglePlayConfig, PackageInspector, StaticPackageName,
    ToolInspector, TrackUpdate,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::config::{validate_config, PublishConfig};
use crate::context::{RunState, TransactionContext};
use crate::error::{PublishError, Result};
use crate::types::PublishReport;

/// Runs publish transactions for one validated configuration
pub struct Publisher {
    config: PublishConfig,
    provider: Arc<dyn ClientProvider>,
    inspector: Arc<dyn PackageInspector>,
}

impl Publisher {
    /// Validate `config` and wire the given collaborators
    pub fn new(
        config: PublishConfig,
        provider: Arc<dyn ClientProvider>,
        inspector: Arc<dyn PackageInspector>,
    ) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            provider,
            inspector,
        })
    }

    /// Publisher talking to Google Play.
    ///
    /// The package name comes from `package_name` when set, otherwise from the
    /// Android build tools.
    pub fn google_play(config: PublishConfig) -> Result<Self> {
        let inspector: Arc<dyn PackageInspector> = match &config.package_name {
            Some(name) => Arc::new(StaticPackageName(name.clone())),
            None => Arc::new(ToolInspector::from_path()),
        };

        let provider = Arc::new(GooglePlayConnector::new(GooglePlayConfig {
            credentials: config.credentials.clone(),
            api_base_url: config.api_base_url.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }));

        Self::new(config, provider, inspector)
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Run the whole transaction
    #[instrument(skip_all, fields(track = %self.config.track))]
    pub async fn publish(&self) -> Result<PublishReport> {
        // 1. binaries and package name
        let binaries = resolve_binaries(&self.config)?;
        let primary = &binaries[0];
        let package_name = self
            .inspector
            .package_name(primary)
            .await
            .map_err(|source| PublishError::InvalidBinary {
                path: primary.clone(),
                source,
            })?;
        info!(package = %package_name, binaries = binaries.len(), "Resolved binaries");

        // 2. client
        let client = self
            .provider
            .connect()
            .await
            .map_err(|source| PublishError::AuthFailed { source })?;

        // 3. edit
        let edit = client.open_edit(&package_name).await.map_err(|source| {
            PublishError::EditOpenFailed {
                package_name: package_name.clone(),
                source,
            }
        })?;
        info!(edit_id = %edit.id, expiry_seconds = edit.expiry_seconds, "Opened edit");

        let edit_id = edit.id.clone();
        let ctx = TransactionContext::open(package_name, edit);

        match self.run_edit(client.as_ref(), ctx, &binaries).await {
            Ok(ctx) => {
                info!(edit_id = %edit_id, state = %ctx.state(), "Edit committed");
                Ok(self.report(&ctx))
            }
            Err(e) => {
                warn!(
                    edit_id = %edit_id,
                    state = %RunState::Aborted,
                    step = %e.step(),
                    "Edit left uncommitted"
                );
                Err(e)
            }
        }
    }

    /// Steps 4 through 8 against an open edit
    async fn run_edit(
        &self,
        client: &dyn EditClient,
        ctx: TransactionContext,
        binaries: &[PathBuf],
    ) -> Result<TransactionContext> {
        // 4. binaries, joined before the track sees any version code
        let artifacts = upload_binaries(
            client,
            ctx.target(),
            binaries,
            self.config.max_concurrent_uploads,
        )
        .await?;
        let ctx = ctx.with_binaries(artifacts);
        info!(version_codes = ?ctx.version_codes(), "Uploaded binaries");

        // 5. track
        let update = TrackUpdate::new(
            self.config.track.clone(),
            ctx.version_codes().clone(),
            self.config.user_fraction,
        );
        client
            .update_track(ctx.target(), &update)
            .await
            .map_err(|source| PublishError::TrackUpdateFailed {
                track: self.config.track.to_string(),
                source,
            })?;
        let ctx = ctx.with_track_updated();
        info!(
            track = %self.config.track,
            user_fraction = ?update.user_fraction(),
            "Updated track"
        );

        // 6. single changelog file
        let ctx = match &self.config.changelog_file {
            Some(path) => {
                let codes = attach_changelog_file(
                    client,
                    ctx.target(),
                    &self.config.track,
                    path,
                    &self.config.language_code,
                    ctx.version_codes(),
                )
                .await?;
                ctx.with_changelogs(codes)
            }
            None => ctx,
        };

        // 7. metadata tree; pairs already given the changelog file keep it
        let ctx = match &self.config.metadata_root {
            Some(root) => {
                let attached: BTreeSet<(String, i64)> = ctx
                    .changelogs()
                    .iter()
                    .map(|&code| (self.config.language_code.clone(), code))
                    .collect();
                let languages = attach_metadata(
                    client,
                    ctx.target(),
                    &self.config.track,
                    root,
                    ctx.version_codes(),
                    &attached,
                )
                .await?;
                ctx.with_metadata(languages)
            }
            None => ctx,
        };

        // 8. commit
        client
            .commit(ctx.target())
            .await
            .map_err(|source| PublishError::CommitFailed {
                edit_id: ctx.edit().id.clone(),
                source,
            })?;

        Ok(ctx.committed())
    }

    fn report(&self, ctx: &TransactionContext) -> PublishReport {
        PublishReport {
            package_name: ctx.target().package_name.clone(),
            edit_id: ctx.edit().id.clone(),
            track: self.config.track.to_string(),
            version_codes: ctx.version_codes().clone(),
            artifacts: ctx.artifacts().to_vec(),
            changelogs: ctx.changelogs().to_vec(),
            languages: ctx.languages().to_vec(),
        }
    }
}
