mod client;
mod error;
mod types;

pub use client::{ARM_ENDPOINT, ArmClient};
pub use error::ArmError;
pub use types::{CloudError, CloudErrorBody};

use async_trait::async_trait;

use super::{ProviderError, ResourceManager};

/// [`ResourceManager`] backed by the ARM REST API.
#[derive(Debug, Clone)]
pub struct AzureProvider {
    client: ArmClient,
}

impl AzureProvider {
    pub fn new(token: Option<String>, endpoint: Option<String>) -> Result<Self, ProviderError> {
        let token = token.ok_or_else(|| {
            ProviderError::Auth(
                "No access token provided. Set ARM_ACCESS_TOKEN or use --token flag".to_string(),
            )
        })?;

        let client = match endpoint {
            Some(endpoint) => ArmClient::with_base_url(token, endpoint)?,
            None => ArmClient::new(token)?,
        };

        Ok(Self { client })
    }

    pub fn from_client(client: ArmClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ArmClient {
        &self.client
    }
}

#[async_trait]
impl ResourceManager for AzureProvider {
    fn name(&self) -> &str {
        "azure"
    }

    async fn get(
        &self,
        id: &str,
        api_version: &str,
    ) -> Result<Option<serde_json::Value>, ProviderError> {
        Ok(self.client.get_resource(id, api_version).await?)
    }

    async fn put(
        &self,
        id: &str,
        api_version: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        Ok(self.client.put_resource(id, api_version, body).await?)
    }

    async fn delete(&self, id: &str, api_version: &str) -> Result<(), ProviderError> {
        Ok(self.client.delete_resource(id, api_version).await?)
    }
}
