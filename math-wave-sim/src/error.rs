//! Error type for configuration, persistence and output

use math_audio_wave::WaveError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring, running or saving a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid wavepacket or membrane parameters
    #[error(transparent)]
    Wave(#[from] WaveError),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unserializable JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value that parses but makes no sense
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Refused to replace an existing file
    #[error("file already exists: {} (pass overwrite to replace it)", .0.display())]
    FileExists(PathBuf),

    /// A snapshot was requested before the membrane was evaluated
    #[error("membrane has not been evaluated")]
    NotEvaluated,
}

impl SimError {
    /// Check if the error comes from user supplied settings
    pub fn is_configuration_error(&self) -> bool {
        match self {
            SimError::Wave(e) => e.is_configuration_error(),
            SimError::Config(_) => true,
            _ => false,
        }
    }
}

/// Result alias for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
