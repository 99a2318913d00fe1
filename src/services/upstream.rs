use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::config::Settings;

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Error, Debug)]
pub enum UpstreamSetupError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("{0} contains characters not allowed in an HTTP header")]
    InvalidHeader(&'static str),
}

/// Connection details shared by every upstream client.
#[derive(Clone)]
pub struct Upstream {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl Upstream {
    /// Returns `None` when no credential is configured.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, UpstreamSetupError> {
        let Some(api_key) = settings.api_key.as_deref() else {
            return Ok(None);
        };

        let headers = auth_headers(api_key, settings.project.as_deref())?;

        let client = Client::builder()
            .timeout(settings.upstream_timeout)
            .build()?;

        Ok(Some(Self {
            client,
            base_url: settings.base_url.clone(),
            headers,
        }))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .headers(self.headers.clone())
    }
}

fn auth_headers(api_key: &str, project: Option<&str>) -> Result<HeaderMap, UpstreamSetupError> {
    let mut headers = HeaderMap::new();

    let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|_| UpstreamSetupError::InvalidHeader("OPENAI_API_KEY"))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);

    if let Some(project) = project {
        let value = HeaderValue::from_str(project)
            .map_err(|_| UpstreamSetupError::InvalidHeader("OPENAI_PROJECT"))?;
        headers.insert("openai-project", value);
    }

    Ok(headers)
}

/// Status and message pulled out of a non-2xx upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamFailure {
    pub status: StatusCode,
    pub message: String,
}

impl std::fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "upstream returned {}: {}", self.status.as_u16(), self.message)
    }
}

/// Reads the body of a failed response, preferring the `{error:{message}}` shape.
pub async fn read_failure(response: Response) -> UpstreamFailure {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ApiErrorResponse>(&error_text) {
        Ok(error_response) => error_response.error.message,
        Err(_) if error_text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => error_text,
    };

    UpstreamFailure { status, message }
}
