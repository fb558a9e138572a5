// Google Cloud Vision OCR backend.
use crate::extractor::traits::TextRecognizer;
use crate::model::ExtractError;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

pub struct VisionClient {
    pub client: Client,
    api_key: String,
}

impl VisionClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("❗ Failed to create HTTP client");
        Self { client, api_key }
    }
}

#[async_trait::async_trait]
impl TextRecognizer for VisionClient {
    async fn recognize(&self, image: &[u8]) -> Result<String, ExtractError> {
        let url = format!(
            "https://vision.googleapis.com/v1/images:annotate?key={}",
            self.api_key
        );
        let body = serde_json::json!({
            "requests": [{
                "image": { "content": BASE64.encode(image) },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|_| "unknown".into());
            warn!("❌ Vision API responded [{}]: {}", status, detail);
            return Err(ExtractError::InvalidResponse(format!("{}: {}", status, detail)));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .pointer("/responses/0/fullTextAnnotation/text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Ok(text)
    }
}
