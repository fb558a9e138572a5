// Extractor module: OCR and structured field extraction behind trait seams.

pub mod traits;
pub mod vision;
pub mod openai;

pub use traits::{FieldExtractor, TextRecognizer};
pub use vision::VisionClient;
pub use openai::OpenAiExtractor;
