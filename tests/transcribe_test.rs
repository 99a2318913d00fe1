mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use httpmock::prelude::*;
use serde_json::{json, Value};
use smartmeeting::config::Settings;

use common::{settings_for, test_server, token_header, TEST_TOKEN};

fn wav_part(file_name: &str) -> Part {
    Part::bytes(b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec())
        .file_name(file_name)
        .mime_type("audio/wav")
}

#[tokio::test]
async fn test_transcribe_without_body_is_rejected() {
    let upstream = MockServer::start_async().await;
    let server = test_server(settings_for(&upstream));

    let response = server.post("/transcribe").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_transcribe_without_file_field_is_rejected() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST).path("/audio/transcriptions");
            then.status(200).json_body(json!({ "text": "unused" }));
        })
        .await;

    let server = test_server(settings_for(&upstream));

    let form = MultipartForm::new()
        .add_text("language", "ja")
        .add_part("attachment", wav_part("clip.wav"));

    let response = server.post("/transcribe").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "No file field 'file' or 'audio' found"
    );

    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_transcribe_empty_file_is_rejected() {
    let upstream = MockServer::start_async().await;
    let server = test_server(settings_for(&upstream));

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(Vec::<u8>::new()).file_name("clip.wav"),
    );

    let response = server.post("/transcribe").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Empty audio file");
}

#[tokio::test]
async fn test_transcribe_unsupported_format_is_rejected() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST).path("/audio/transcriptions");
            then.status(200).json_body(json!({ "text": "unused" }));
        })
        .await;

    let server = test_server(settings_for(&upstream));

    let form = MultipartForm::new().add_part("file", wav_part("notes.txt"));

    let response = server.post("/transcribe").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .starts_with("Unsupported audio format"));

    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_transcribe_relays_text() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST)
                .path("/audio/transcriptions")
                .header("authorization", "Bearer test-key")
                .body_contains("whisper-1")
                .body_contains(r#"filename="clip.wav""#)
                .body_contains("RIFF");
            then.status(200).json_body(json!({ "text": "hola" }));
        })
        .await;

    let server = test_server(settings_for(&upstream));

    let form = MultipartForm::new().add_part("file", wav_part("clip.wav"));

    let response = server.post("/transcribe").multipart(form).await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["text"], "hola");
    assert_eq!(body["filename"], "clip.wav");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_transcribe_accepts_audio_field_and_forwards_language() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST)
                .path("/audio/transcriptions")
                .body_contains("name=\"language\"\r\n\r\nes");
            then.status(200).json_body(json!({ "text": "hola" }));
        })
        .await;

    let server = test_server(settings_for(&upstream));

    let form = MultipartForm::new()
        .add_text("lang", "es")
        .add_part("audio", wav_part("meeting.m4a"));

    let response = server.post("/transcribe").multipart(form).await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["text"], "hola");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_transcribe_takes_language_from_query() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST)
                .path("/audio/transcriptions")
                .body_contains("name=\"language\"\r\n\r\nfr");
            then.status(200).json_body(json!({ "text": "bonjour" }));
        })
        .await;

    let server = test_server(settings_for(&upstream));

    let form = MultipartForm::new().add_part("file", wav_part("clip.wav"));

    let response = server
        .post("/transcribe")
        .add_query_param("lang", "fr")
        .multipart(form)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["text"], "bonjour");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_transcribe_upstream_error_maps_to_bad_gateway() {
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(POST).path("/audio/transcriptions");
            then.status(400).json_body(json!({
                "error": { "message": "Invalid file format." }
            }));
        })
        .await;

    let server = test_server(settings_for(&upstream));

    let form = MultipartForm::new().add_part("file", wav_part("clip.wav"));

    let response = server.post("/transcribe").multipart(form).await;

    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_eq!(body["error"], "upstream request failed");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Invalid file format."));
}

#[tokio::test]
async fn test_transcribe_without_credential_fails() {
    let upstream = MockServer::start_async().await;
    let settings = Settings {
        api_key: None,
        ..settings_for(&upstream)
    };
    let server = test_server(settings);

    let form = MultipartForm::new().add_part("file", wav_part("clip.wav"));

    let response = server.post("/transcribe").multipart(form).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "server api key missing");
}

#[tokio::test]
async fn test_transcribe_requires_matching_token() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST).path("/audio/transcriptions");
            then.status(200).json_body(json!({ "text": "hola" }));
        })
        .await;

    let settings = Settings {
        app_token: Some(TEST_TOKEN.to_string()),
        ..settings_for(&upstream)
    };
    let server = test_server(settings);

    let form = MultipartForm::new().add_part("file", wav_part("clip.wav"));
    server
        .post("/transcribe")
        .multipart(form)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    mock.assert_hits_async(0).await;

    let (name, value) = token_header(TEST_TOKEN);
    let form = MultipartForm::new().add_part("file", wav_part("clip.wav"));
    let response = server
        .post("/transcribe")
        .add_header(name, value)
        .multipart(form)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["text"], "hola");
}

#[tokio::test]
async fn test_supported_formats() {
    let upstream = MockServer::start_async().await;
    let server = test_server(settings_for(&upstream));

    let response = server.get("/transcribe/formats").await;

    response.assert_status(StatusCode::OK);

    let formats: Vec<String> = response.json();
    assert!(formats.contains(&"mp3".to_string()));
    assert!(formats.contains(&"wav".to_string()));
    assert!(formats.contains(&"m4a".to_string()));
}

#[tokio::test]
async fn test_transcribe_malformed_query_gets_json_error() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST).path("/audio/transcriptions");
            then.status(200).json_body(json!({ "text": "unused" }));
        })
        .await;

    let server = test_server(settings_for(&upstream));

    let form = MultipartForm::new().add_part("file", wav_part("clip.wav"));

    let response = server
        .post("/transcribe")
        .add_query_param("lang", "a")
        .add_query_param("lang", "b")
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid query string"));

    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_transcribe_without_credential_fails_before_reading_query() {
    let upstream = MockServer::start_async().await;
    let settings = Settings {
        api_key: None,
        ..settings_for(&upstream)
    };
    let server = test_server(settings);

    let form = MultipartForm::new().add_part("file", wav_part("clip.wav"));

    let response = server
        .post("/transcribe")
        .add_query_param("lang", "a")
        .add_query_param("lang", "b")
        .multipart(form)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "server api key missing");
}

#[tokio::test]
async fn test_transcribe_form_language_beats_query() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST)
                .path("/audio/transcriptions")
                .body_contains("name=\"language\"\r\n\r\nes");
            then.status(200).json_body(json!({ "text": "hola" }));
        })
        .await;

    let server = test_server(settings_for(&upstream));

    let form = MultipartForm::new()
        .add_text("language", "es")
        .add_part("file", wav_part("clip.wav"));

    let response = server
        .post("/transcribe")
        .add_query_param("lang", "fr")
        .multipart(form)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["text"], "hola");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_supported_formats_requires_matching_token() {
    let settings = Settings {
        app_token: Some(TEST_TOKEN.to_string()),
        ..Settings::default()
    };
    let server = test_server(settings);

    let response = server.get("/transcribe/formats").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "unauthorized");

    let (name, value) = token_header(TEST_TOKEN);
    let response = server
        .get("/transcribe/formats")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::OK);
    assert!(response.json::<Vec<String>>().contains(&"wav".to_string()));
}
