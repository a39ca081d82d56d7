//! Playship Core - publish orchestration for Google Play
//!
//! This crate provides the publish configuration, the error taxonomy and the
//! edit transaction orchestrator that drives an [`EditClient`] from opening an
//! edit to committing it.
//!
//! [`EditClient`]: playship_stores::EditClient

pub mod config;
pub mod context;
pub mod error;
pub mod publish;
pub mod types;

pub use config::{find_config, load_config, validate_config, PublishConfig};
pub use context::{RunState, TransactionContext};
pub use error::{ChangelogTarget, ConfigError, MetadataStage, PublishError, PublishStep, Result};
pub use publish::Publisher;
pub use types::{LanguageReport, PublishReport};
