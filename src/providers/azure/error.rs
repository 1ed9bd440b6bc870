use thiserror::Error;

/// Errors from talking to Azure Resource Manager.
///
/// SECURITY: Error messages must NEVER contain the bearer token.
#[derive(Debug, Error)]
pub enum ArmError {
    /// The token was rejected (401) or lacks permission (403)
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// ARM returned an error response
    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Network-level error (connection failed, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Throttled by ARM. Not retried here; the caller decides.
    #[error("throttled, retry after {retry_after}s")]
    Throttled { retry_after: u64 },

    #[error("invalid response body: {message}")]
    InvalidResponse { message: String },
}

impl From<ArmError> for crate::providers::ProviderError {
    fn from(err: ArmError) -> Self {
        match err {
            ArmError::Auth { .. } => crate::providers::ProviderError::Auth(err.to_string()),
            other => crate::providers::ProviderError::Azure(other.to_string()),
        }
    }
}
