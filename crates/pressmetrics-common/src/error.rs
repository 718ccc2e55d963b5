use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("wordpress config not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("wordpress bootstrap failed: {0}")]
    BootstrapFailed(String),
    #[error("sample store unavailable: {0}")]
    StorageUnavailable(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Value of the `type` label on `wordpress_exporter_error`.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ConfigNotFound(_) => "config_not_found",
            Self::BootstrapFailed(_) => "bootstrap_failed",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::UnknownMetric(_) => "unknown_metric",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InternalError(_) => "collection_error",
            Self::Io(_) => "io_error",
        }
    }

    pub fn is_fatal_for_scrape(&self) -> bool {
        matches!(self, Self::ConfigNotFound(_) | Self::BootstrapFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
