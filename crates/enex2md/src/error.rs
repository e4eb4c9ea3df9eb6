//! CLI error types.

use enex_config::ConfigError;
use enex_core::{ParseError, RenderError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Validation(String),
}
