// OpenAI chat-completions backend for structuring label text.
use crate::extractor::traits::FieldExtractor;
use crate::model::{ExtractError, ExtractedLabel};
use crate::utils::coerce_pack_qty;

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

pub struct OpenAiExtractor {
    pub client: Client,
    api_key: String,
    model: String,
}

/// Wire shape of the model's JSON answer. `qty` arrives as a string or a
/// number depending on the label.
#[derive(Debug, Deserialize)]
struct LabelFields {
    #[serde(default)]
    manufacturer: String,
    #[serde(rename = "ref", default)]
    reference: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    details: String,
    #[serde(default)]
    qty: serde_json::Value,
}

impl OpenAiExtractor {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("❗ Failed to create HTTP client");
        Self { client, api_key, model }
    }

    fn build_prompt(text: &str) -> String {
        format!(
            r#"Analyze this medical product label for inventory.

1. MANUFACTURER:
   - BRAND NAME or LOGO (largest visual text).
   - Ignore legal factory text unless it's the brand.

2. REF:
   - Catalog number / SKU (strictly the code).

3. NAME:
   - The short product title.
   - Example: "Gravity IV Set - Vented"

4. DETAILS:
   - The technical specifications.
   - Example: "150cm, 3-way stopcock, 15um filter".

5. QTY:
   - Pack size. Default "1" if missing.

Text content:
{text}

Return JSON: {{"manufacturer": "...", "ref": "...", "name": "...", "details": "...", "qty": "..."}}"#
        )
    }
}

#[async_trait::async_trait]
impl FieldExtractor for OpenAiExtractor {
    async fn extract(&self, text: &str) -> Result<ExtractedLabel, ExtractError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": Self::build_prompt(text) }],
            "response_format": { "type": "json_object" }
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|_| "unknown".into());
            warn!("❌ OpenAI API responded [{}]: {}", status, detail);
            return Err(ExtractError::InvalidResponse(format!("{}: {}", status, detail)));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExtractError::InvalidResponse("missing message content".into()))?;

        let fields: LabelFields = serde_json::from_str(content)
            .map_err(|e| ExtractError::InvalidResponse(format!("bad field JSON: {}", e)))?;

        Ok(ExtractedLabel {
            manufacturer: fields.manufacturer,
            reference: fields.reference,
            name: fields.name,
            details: fields.details,
            qty: coerce_pack_qty(&fields.qty),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_fields_accept_string_and_numeric_qty() {
        let fields: LabelFields =
            serde_json::from_str(r#"{"manufacturer":"ACME","ref":"R1","name":"Widget","details":"","qty":"6"}"#)
                .unwrap();
        assert_eq!(coerce_pack_qty(&fields.qty), 6);

        let fields: LabelFields =
            serde_json::from_str(r#"{"manufacturer":"ACME","ref":"R1","name":"Widget","details":"","qty":2}"#)
                .unwrap();
        assert_eq!(coerce_pack_qty(&fields.qty), 2);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let fields: LabelFields = serde_json::from_str(r#"{"manufacturer":"ACME"}"#).unwrap();
        assert_eq!(fields.reference, "");
        assert_eq!(coerce_pack_qty(&fields.qty), 1);
    }

    #[test]
    fn prompt_embeds_the_recognized_text() {
        let prompt = OpenAiExtractor::build_prompt("REF 4062981 B.Braun");
        assert!(prompt.contains("REF 4062981 B.Braun"));
        assert!(prompt.contains("Return JSON"));
    }
}
