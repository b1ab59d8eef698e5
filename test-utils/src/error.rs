use thiserror::Error;

/// Errors that can occur while preparing a test environment.
#[derive(Error, Debug)]
pub enum TestError {
    /// Filesystem operation failed while creating the temporary server layout.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failed to serialize fixture data written into the layout.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
