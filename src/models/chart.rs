use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;

/// Chart screenshot attached to a trade entry, carried inline as base64.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartImage {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub data: String,
}

impl ChartImage {
    /// File extension taken from the original file name, `bin` if none.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".into())
    }

    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }

    /// Decode the payload. Accepts data URLs (`data:image/png;base64,...`).
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = match self.data.split_once(";base64,") {
            Some((_, rest)) => rest,
            None => self.data.as_str(),
        };
        BASE64.decode(payload.trim())
    }
}
