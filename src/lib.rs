pub mod config;
pub mod dto;
pub mod error;
pub mod game;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::ai_service::AIService;
use reqwest::Client;

#[derive(Clone)]
pub struct AppState {
    pub ai_service: AIService,
}

impl AppState {
    pub fn new(config: &crate::config::Config) -> crate::error::Result<Self> {
        let http_client = Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        let ai_service = AIService::new(config.gemini_api_key.clone(), http_client)
            .with_base_url(config.gemini_base_url.clone())
            .with_model(config.gemini_model.clone())
            .with_timeout(config.upstream_timeout);

        Ok(Self { ai_service })
    }

    pub fn with_ai_service(ai_service: AIService) -> Self {
        Self { ai_service }
    }
}
