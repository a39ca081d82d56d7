//! Google Play edit client adapters for Playship
//!
//! This crate defines the remote surface the publish orchestrator drives and
//! provides the production implementation on top of the Google Play
//! Developer API.
//!
//! - [`EditClient`]: one call per remote operation of an edit transaction
//! - [`ClientProvider`]: turns credentials into an authorized [`EditClient`]
//! - [`PackageInspector`]: reads the package name out of an APK or AAB
//!
//! ## Usage
//!
//! ```ignore
//! use playship_stores::{google_play::GooglePlayConnector, ClientProvider, GooglePlayConfig};
//!
//! let connector = GooglePlayConnector::new(config)?;
//! let client = connector.connect().await?;
//! let edit = client.open_edit("com.example.app").await?;
//! ```

pub mod credentials;
pub mod error;
pub mod google_play;
pub mod inspect;
pub mod traits;
pub mod types;

pub use credentials::{CredentialSource, ServiceAccountKey};
pub use error::StoreError;
pub use inspect::{PackageInspector, StaticPackageName, ToolInspector};
pub use traits::{ClientProvider, EditClient};
pub use types::*;
