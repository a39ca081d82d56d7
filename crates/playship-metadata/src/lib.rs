//! Store listing metadata resolution for Playship.
//!
//! This crate turns a Fastlane `supply`-style metadata tree into typed upload
//! requests without touching the network:
//!
//! ```text
//! metadata/
//! └── {language}/
//!     ├── title.txt
//!     ├── short_description.txt
//!     ├── full_description.txt
//!     ├── video.txt
//!     ├── images/
//!     │   ├── featureGraphic.{png,jpg,jpeg}
//!     │   ├── icon.{png,jpg,jpeg}
//!     │   ├── promoGraphic.{png,jpg,jpeg}
//!     │   ├── tvBanner.{png,jpg,jpeg}
//!     │   ├── phoneScreenshots/*
//!     │   ├── sevenInchScreenshots/*
//!     │   ├── tenInchScreenshots/*
//!     │   ├── tvScreenshots/*
//!     │   └── wearScreenshots/*
//!     └── changelogs/
//!         └── {version_code}.txt
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use playship_metadata::MetadataResolver;
//!
//! let resolver = MetadataResolver::new("./fastlane/metadata/android");
//! for language in resolver.languages()? {
//!     let resolved = resolver.resolve(&language)?;
//!     let entries = resolved.changelog_entries(&version_codes)?;
//! }
//! ```

pub mod changelog;
pub mod error;
pub mod images;
pub mod listing;
pub mod resolver;
pub mod types;

pub use changelog::{match_changelogs, ChangelogFile, ChangelogSet};
pub use error::MetadataError;
pub use images::{resolve_images, resolve_mime_type};
pub use listing::read_listing;
pub use resolver::{resolve_language_dir, MetadataResolver, ResolvedLanguage};
pub use types::{ChangelogEntry, ImageAsset, ImageAssetSet, ImageType, LocalizedListing, MimeType};

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, MetadataError>;
