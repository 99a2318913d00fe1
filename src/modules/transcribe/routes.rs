use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::transcribe::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transcribe", post(controller::transcribe))
        .route("/transcribe/formats", get(controller::supported_formats))
}
