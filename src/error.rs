use thiserror::Error;

#[derive(Debug, Error)]
pub enum AzrmError {
    #[error(transparent)]
    Provider(#[from] crate::providers::ProviderError),

    #[error(transparent)]
    Id(#[from] crate::ids::IdError),

    #[error(transparent)]
    StateFile(#[from] crate::terraform::state::StateFileError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0:?} does not match any supported resource ID layout")]
    NoMatchingLayout(String),

    #[error("{invalid} of {total} resource IDs are invalid")]
    InvalidIds { invalid: usize, total: usize },
}
