use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_STT_MODEL: &str = "whisper-1";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Upstream transcription endpoints reject files above 25 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub project: Option<String>,
    pub app_token: Option<String>,
    pub host: String,
    pub port: u16,
    pub chat_model: String,
    pub system_prompt: String,
    pub chat_temperature: Option<f32>,
    pub stt_model: String,
    pub upstream_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            project: None,
            app_token: None,
            host: "0.0.0.0".to_string(),
            port: 5000,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            chat_temperature: None,
            stt_model: DEFAULT_STT_MODEL.to_string(),
            upstream_timeout: Duration::from_secs(90),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let port = parse(&get, "PORT")?.unwrap_or(defaults.port);
        let chat_temperature = parse::<f32, _>(&get, "CHAT_TEMPERATURE")?;
        let timeout_secs = parse::<u64, _>(&get, "UPSTREAM_TIMEOUT_SECS")?;
        let max_upload_bytes =
            parse(&get, "MAX_UPLOAD_BYTES")?.unwrap_or(defaults.max_upload_bytes);

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            project: get("OPENAI_PROJECT"),
            app_token: get("APP_TOKEN"),
            host: get("HOST").unwrap_or(defaults.host),
            port,
            chat_model: get("CHAT_MODEL").unwrap_or(defaults.chat_model),
            system_prompt: get("CHAT_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            chat_temperature,
            stt_model: get("STT_MODEL").unwrap_or(defaults.stt_model),
            upstream_timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
            max_upload_bytes,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(None),
    }
}
