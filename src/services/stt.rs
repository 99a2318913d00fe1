use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use crate::services::upstream::{read_failure, Upstream, UpstreamFailure};

const SUPPORTED_FORMATS: &[&str] = &[
    "flac", "m4a", "mp3", "mp4", "mpeg", "mpga", "oga", "ogg", "wav", "webm",
];

#[derive(Error, Debug)]
pub enum SttError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(UpstreamFailure),
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
}

pub struct SttResponse {
    pub text: String,
    pub model: String,
}

/// Client for an OpenAI-compatible `/audio/transcriptions` endpoint.
#[derive(Clone)]
pub struct SttClient {
    upstream: Upstream,
    model: String,
}

impl SttClient {
    pub fn new(upstream: Upstream, model: impl Into<String>) -> Self {
        Self {
            upstream,
            model: model.into(),
        }
    }

    pub async fn transcribe(
        &self,
        audio_data: Bytes,
        file_name: &str,
        mime_type: Option<&str>,
        language: Option<&str>,
    ) -> Result<SttResponse, SttError> {
        let mime_type = mime_type
            .map(str::to_string)
            .unwrap_or_else(|| Self::get_mime_type(file_name).to_string());

        let length = audio_data.len() as u64;
        let file_part = Part::stream_with_length(audio_data, length)
            .file_name(file_name.to_string())
            .mime_str(&mime_type)
            .map_err(|e| SttError::InvalidUpload(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        let response = self
            .upstream
            .post("/audio/transcriptions")
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SttError::ApiError(read_failure(response).await));
        }

        let whisper_response: WhisperResponse = response.json().await?;

        Ok(SttResponse {
            text: whisper_response.text,
            model: self.model.clone(),
        })
    }

    pub fn get_mime_type(file_name: &str) -> &'static str {
        match Self::extension(file_name).as_deref() {
            Some("mp3" | "mpga" | "mpeg") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("webm") => "audio/webm",
            Some("ogg" | "oga") => "audio/ogg",
            Some("m4a") => "audio/m4a",
            Some("flac") => "audio/flac",
            Some("mp4") => "audio/mp4",
            _ => "application/octet-stream",
        }
    }

    /// Lowercased extension, if the name has one.
    pub fn extension(file_name: &str) -> Option<String> {
        file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    pub fn is_supported(file_name: &str) -> bool {
        match Self::extension(file_name) {
            Some(ext) => SUPPORTED_FORMATS.contains(&ext.as_str()),
            None => true,
        }
    }

    pub fn supported_formats() -> Vec<&'static str> {
        SUPPORTED_FORMATS.to_vec()
    }
}
