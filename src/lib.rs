use std::sync::Arc;

pub mod config;
pub mod error;
pub mod modules;
pub mod routes;
pub mod services;

use config::Settings;
use error::AppError;
use services::llm::LlmClient;
use services::stt::SttClient;
use services::upstream::{Upstream, UpstreamSetupError};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    llm: Option<LlmClient>,
    stt: Option<SttClient>,
}

impl AppState {
    /// Builds the upstream clients once. Without a credential both stay unset
    /// and every proxy call answers with a configuration error.
    pub fn new(settings: Settings) -> Result<Self, UpstreamSetupError> {
        let upstream = Upstream::from_settings(&settings)?;

        let llm = upstream.clone().map(LlmClient::new);
        let stt = upstream.map(|u| SttClient::new(u, settings.stt_model.clone()));

        Ok(Self {
            settings: Arc::new(settings),
            llm,
            stt,
        })
    }

    pub fn llm(&self) -> Result<&LlmClient, AppError> {
        self.llm.as_ref().ok_or(AppError::Configuration)
    }

    pub fn stt(&self) -> Result<&SttClient, AppError> {
        self.stt.as_ref().ok_or(AppError::Configuration)
    }
}
