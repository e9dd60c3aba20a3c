use crate::stations::error::StationLoadError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error(transparent)]
    StationLoad(#[from] StationLoadError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    #[error("Coverage analysis did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    // Covers errors joining the blocking analysis task
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
