use crate::model::{ExtractError, ExtractedLabel};

#[async_trait::async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Runs OCR over raw image bytes. An empty string means nothing was
    /// recognized.
    async fn recognize(&self, image: &[u8]) -> Result<String, ExtractError>;
}

#[async_trait::async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Structures recognized label text into inventory fields.
    async fn extract(&self, text: &str) -> Result<ExtractedLabel, ExtractError>;
}
