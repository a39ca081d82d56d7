//! CLI commands

mod init;
mod metadata;
mod publish;

pub use init::InitCommand;
pub use metadata::MetadataCommand;
pub use publish::PublishCommand;
