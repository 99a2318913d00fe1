use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::time::Instant;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::modules::chat::schema::{first_message, ChatRequest, ChatResponse};
use crate::AppState;

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let llm = state.llm()?;

    // An unreadable body carries no usable message either.
    let Json(payload) = payload.map_err(|e| {
        AppError::InvalidInput(format!("Invalid JSON body: {}", e.body_text()))
    })?;

    payload
        .validate()
        .map_err(|e| AppError::InvalidInput(first_message(&e)))?;

    let settings = &state.settings;
    let model = payload.model_or(&settings.chat_model).to_string();
    let temperature = payload.temperature.or(settings.chat_temperature);
    let messages = payload.turns(&settings.system_prompt);

    let started = Instant::now();
    let result = llm.complete(&messages, &model, temperature).await?;

    info!(
        model = %model,
        turns = messages.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Chat completion relayed"
    );

    Ok(Json(ChatResponse {
        reply: result.content,
        model,
        usage: result.usage.map(Into::into),
    }))
}
