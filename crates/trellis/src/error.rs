//! CLI failures and their process exit codes.

use std::path::PathBuf;

use trellis_schema::ConfigError;
use trellis_server::ServerError;

/// Failures the CLI reports with a dedicated exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error(transparent)]
    InvalidConfig(ConfigError),

    #[error("Configuration has {0} error(s)")]
    ValidationFailed(usize),

    #[error("{} already exists. Use --force to overwrite.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Output directory not found: {}. Run 'trellis build' first.", .0.display())]
    OutputNotFound(PathBuf),

    #[error("Failed to install {0} component(s)")]
    InstallFailed(usize),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidConfig(_) | Self::ValidationFailed(_) | Self::AlreadyExists(_) => 1,
            Self::ConfigNotFound(_) | Self::OutputNotFound(_) => 2,
            Self::BuildFailed(_) | Self::InstallFailed(_) => 3,
        }
    }
}

/// Exit code for an error returned from a command.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    if let Some(e) = error.downcast_ref::<CliError>() {
        return e.exit_code();
    }
    match error.downcast_ref::<ServerError>() {
        Some(ServerError::NoAvailablePort { .. }) => 4,
        _ => 1,
    }
}
