use axum::{
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State,
    },
    Json,
};
use std::time::Instant;
use tracing::info;

use crate::error::AppError;
use crate::modules::transcribe::schema::{AudioUpload, TranscribeQuery, TranscribeResponse};
use crate::services::stt::SttClient;
use crate::AppState;

const DEFAULT_FILE_NAME: &str = "audio.wav";

pub async fn transcribe(
    State(state): State<AppState>,
    query: Result<Query<TranscribeQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, AppError> {
    let stt = state.stt()?;

    let Query(query) = query.map_err(|e| {
        AppError::InvalidInput(format!("Invalid query string: {}", e.body_text()))
    })?;

    let mut multipart = multipart.map_err(|e| {
        AppError::InvalidInput(format!("Expected multipart/form-data: {}", e.body_text()))
    })?;

    let mut upload: Option<AudioUpload> = None;
    let mut language = query.language_hint();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" | "audio" => {
                let file_name = field
                    .file_name()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;

                upload = Some(AudioUpload {
                    data,
                    file_name,
                    content_type,
                });
            }
            "language" | "lang" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read field: {}", e)))?;
                let text = text.trim();
                if !text.is_empty() {
                    language = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| {
        AppError::InvalidInput("No file field 'file' or 'audio' found".to_string())
    })?;

    if upload.data.is_empty() {
        return Err(AppError::InvalidInput("Empty audio file".to_string()));
    }

    let file_name = upload
        .file_name
        .clone()
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    if !SttClient::is_supported(&file_name) {
        return Err(AppError::InvalidInput(format!(
            "Unsupported audio format. Supported: {:?}",
            SttClient::supported_formats()
        )));
    }

    let size = upload.data.len();
    let started = Instant::now();

    let result = stt
        .transcribe(
            upload.data,
            &file_name,
            upload.content_type.as_deref(),
            language.as_deref(),
        )
        .await?;

    info!(
        model = %result.model,
        bytes = size,
        language = language.as_deref().unwrap_or("auto"),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Transcription relayed"
    );

    Ok(Json(TranscribeResponse {
        text: result.text,
        filename: upload.file_name,
    }))
}

pub async fn supported_formats() -> Json<Vec<&'static str>> {
    Json(SttClient::supported_formats())
}
