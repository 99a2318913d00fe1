use axum::body::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Language hint may also arrive on the query string.
#[derive(Debug, Default, Deserialize)]
pub struct TranscribeQuery {
    pub language: Option<String>,
    pub lang: Option<String>,
}

impl TranscribeQuery {
    pub fn language_hint(&self) -> Option<String> {
        [&self.language, &self.lang]
            .into_iter()
            .flatten()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }
}

/// The audio part pulled out of an upload.
#[derive(Debug, Default)]
pub struct AudioUpload {
    pub data: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}
