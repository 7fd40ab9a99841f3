//! Error types for hapticctl CLI

use std::path::PathBuf;

use haptic_errors::ServoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device startup failed")]
    Startup(#[source] ServoError),

    #[error("Servo loop failed")]
    Servo(#[source] ServoError),

    #[error("Invalid configuration: {}", path.display())]
    InvalidConfiguration {
        path: PathBuf,
        #[source]
        source: ServoError,
    },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Startup(_) => 2,
            CliError::Servo(_) | CliError::InvalidConfiguration { .. } => 1,
        }
    }
}

impl From<ServoError> for CliError {
    fn from(err: ServoError) -> Self {
        if err.is_startup_failure() {
            CliError::Startup(err)
        } else {
            CliError::Servo(err)
        }
    }
}
