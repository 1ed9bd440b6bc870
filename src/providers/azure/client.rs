use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};

use super::ArmError;
use super::types::CloudError;

pub const ARM_ENDPOINT: &str = "https://management.azure.com";

#[derive(Clone)]
pub struct ArmClient {
    client: reqwest::Client,
    base_url: String,
}

impl ArmClient {
    pub fn new(token: String) -> Result<Self, ArmError> {
        Self::with_base_url(token, ARM_ENDPOINT.to_string())
    }

    /// NOTE: Used for sovereign clouds and for testing with mock servers.
    pub fn with_base_url(token: String, base_url: String) -> Result<Self, ArmError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", token);
        let mut header_value = HeaderValue::from_str(&auth_value).map_err(|_| ArmError::Auth {
            status: 0,
            message: "Invalid token format".to_string(),
        })?;
        header_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ArmError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    fn url(&self, id: &str, api_version: &str) -> String {
        format!("{}{}?api-version={}", self.base_url, id, api_version)
    }

    /// Returns `None` on 404.
    pub async fn get_resource(
        &self,
        id: &str,
        api_version: &str,
    ) -> Result<Option<serde_json::Value>, ArmError> {
        let response = self.client.get(self.url(id, api_version)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(id, "resource not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body = response
            .json()
            .await
            .map_err(|e| ArmError::InvalidResponse {
                message: format!("Failed to parse resource: {}", e),
            })?;
        Ok(Some(body))
    }

    /// Issues a PUT. 201/202 responses may carry an empty body, which is
    /// returned as `Value::Null`.
    pub async fn put_resource(
        &self,
        id: &str,
        api_version: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ArmError> {
        let response = self
            .client
            .put(self.url(id, api_version))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }
        tracing::debug!(id, status = status.as_u16(), "PUT accepted");

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ArmError::InvalidResponse {
            message: format!("Failed to parse resource: {}", e),
        })
    }

    /// Issues a DELETE. A 404 counts as success.
    pub async fn delete_resource(&self, id: &str, api_version: &str) -> Result<(), ArmError> {
        let response = self.client.delete(self.url(id, api_version)).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(id, "resource already gone");
            return Ok(());
        }
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }
        tracing::debug!(id, status = status.as_u16(), "DELETE accepted");
        Ok(())
    }

    async fn error_from(response: reqwest::Response) -> ArmError {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            return ArmError::Throttled { retry_after };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ArmError::Network(e),
        };
        let error = CloudError::from_body(&body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ArmError::Auth {
                status: status.as_u16(),
                message: error.message,
            },
            _ => ArmError::Api {
                status: status.as_u16(),
                code: error.code,
                message: error.message,
            },
        }
    }
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
