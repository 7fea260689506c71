//! CLI error types.

use kn_config::ConfigError;
use kn_export::ExportError;
use kn_server::ServerError;
use kn_site::CacheError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Export(#[from] ExportError),
}
