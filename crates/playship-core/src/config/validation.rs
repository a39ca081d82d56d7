//! Configuration validation

use tracing::{debug, warn};

use crate::error::ConfigError;

use super::types::PublishConfig;

/// Validate configuration
pub fn validate_config(config: &PublishConfig) -> Result<(), ConfigError> {
    debug!("validating configuration");
    validate_binaries(config)?;
    validate_track(config)?;
    validate_attachments(config)?;
    validate_limits(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_binaries(config: &PublishConfig) -> Result<(), ConfigError> {
    if config.binary.trim().is_empty() {
        return Err(ConfigError::MissingField("binary".to_string()));
    }

    for (i, binary) in config.additional_binaries.iter().enumerate() {
        if binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("additional_binaries[{}]", i),
                message: "path cannot be empty".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_track(config: &PublishConfig) -> Result<(), ConfigError> {
    if config.track.is_rollout() {
        match config.user_fraction {
            Some(fraction) if fraction > 0.0 && fraction <= 1.0 => {}
            Some(fraction) => {
                return Err(ConfigError::InvalidValue {
                    field: "user_fraction".to_string(),
                    message: format!("must be in (0, 1], got {}", fraction),
                });
            }
            None => {
                return Err(ConfigError::InvalidValue {
                    field: "user_fraction".to_string(),
                    message: "required for the rollout track".to_string(),
                });
            }
        }
    } else if let Some(fraction) = config.user_fraction {
        warn!(
            track = %config.track,
            fraction,
            "user_fraction only applies to the rollout track and will be ignored"
        );
    }

    Ok(())
}

fn validate_attachments(config: &PublishConfig) -> Result<(), ConfigError> {
    if config.language_code.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "language_code".to_string(),
            message: "language code cannot be empty".to_string(),
        });
    }

    if let Some(root) = &config.metadata_root {
        if root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "metadata_root".to_string(),
                message: "path cannot be empty".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_limits(config: &PublishConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_uploads == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_concurrent_uploads".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::InvalidValue {
            field: "timeout_secs".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    Ok(())
}
