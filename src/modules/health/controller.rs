use axum::{extract::State, Json};

use crate::modules::health::schema::HealthResponse;
use crate::AppState;

pub async fn root() -> &'static str {
    "SmartMeeting Server is running!"
}

pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        upstream_configured: state.settings.has_api_key(),
    })
}
