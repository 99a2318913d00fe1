#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use httpmock::MockServer;
use smartmeeting::{config::Settings, routes::create_router, AppState};

pub const TEST_KEY: &str = "test-key";
pub const TEST_TOKEN: &str = "s3cret";

pub fn settings_for(upstream: &MockServer) -> Settings {
    Settings {
        api_key: Some(TEST_KEY.to_string()),
        base_url: upstream.base_url(),
        ..Settings::default()
    }
}

pub fn test_server(settings: Settings) -> TestServer {
    let state = AppState::new(settings).unwrap();
    TestServer::new(create_router(state)).unwrap()
}

pub fn token_header(value: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-app-token"),
        HeaderValue::from_static(value),
    )
}
