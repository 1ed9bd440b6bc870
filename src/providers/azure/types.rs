use serde::Deserialize;

/// Body of an ARM error response.
#[derive(Debug, Deserialize)]
pub struct CloudError {
    pub error: CloudErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct CloudErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl CloudError {
    /// Parses an error body, falling back to the raw text when it is not the
    /// usual `{"error": {...}}` shape.
    pub fn from_body(body: &str) -> CloudErrorBody {
        serde_json::from_str::<CloudError>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| CloudErrorBody {
                code: String::new(),
                message: body.trim().to_string(),
            })
    }
}
