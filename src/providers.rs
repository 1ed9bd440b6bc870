pub mod azure;

use async_trait::async_trait;
use thiserror::Error;

use crate::ids::IdError;
use crate::poller::WaitError;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error(
        "a resource with the ID {id:?} already exists - to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for {resource_type} for more information"
    )]
    AlreadyExists { resource_type: String, id: String },

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("azure error: {0}")]
    Azure(String),

    #[error(transparent)]
    Id(#[from] IdError),

    #[error("waiting for {id} to {operation}: {source}")]
    Wait {
        id: String,
        operation: String,
        #[source]
        source: WaitError,
    },

    #[error("{id} was not found")]
    NotFound { id: String },

    #[error("retrieving {id}: `{field}` was missing from the response")]
    MissingField { id: String, field: String },
}

/// The minimal ARM surface the lifecycle helpers need.
///
/// `id` is a canonical resource ID; implementations join it onto their
/// management endpoint.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    fn name(&self) -> &str;

    /// Returns `None` when the resource does not exist.
    async fn get(
        &self,
        id: &str,
        api_version: &str,
    ) -> Result<Option<serde_json::Value>, ProviderError>;

    async fn put(
        &self,
        id: &str,
        api_version: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Succeeds when the resource is already gone.
    async fn delete(&self, id: &str, api_version: &str) -> Result<(), ProviderError>;
}
