//! Error types for the simulation host boundary.
//!
//! The field and integrator math is total; only configuration and the
//! renderer hand-off can fail.

/// Errors surfaced to the host loop.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A configuration value is out of range.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ConfigRead(#[source] std::io::Error),

    /// Failed to parse JSON config content.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),

    /// The renderer rejected an instance batch.
    #[error("renderer rejected batch {batch}: {reason}")]
    Submit { batch: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, SimError>;
