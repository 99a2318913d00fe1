use axum::{
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::modules;
use crate::AppState;

pub const APP_TOKEN_HEADER: &str = "x-app-token";

/// Full application router. Liveness routes stay open; proxy routes sit
/// behind the optional shared secret.
pub fn create_router(state: AppState) -> Router {
    let proxy_routes = Router::new()
        .merge(modules::chat::routes::routes())
        .merge(modules::transcribe::routes::routes())
        .layer(DefaultBodyLimit::max(state.settings.max_upload_bytes))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_app_token,
        ));

    Router::new()
        .merge(modules::health::routes::routes())
        .merge(proxy_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn require_app_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.settings.app_token.as_deref() {
        let provided = req
            .headers()
            .get(APP_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        if provided != Some(expected) {
            return Err(AppError::Unauthorized);
        }
    }

    Ok(next.run(req).await)
}
