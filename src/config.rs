use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub static_dir: String,
    pub api_rps: u32,
    pub upstream_timeout: Duration,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:3000"),
            gemini_api_key: get_env("GEMINI_KEY")?,
            gemini_model: get_env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            gemini_base_url: get_env_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            static_dir: get_env_or("STATIC_DIR", "public"),
            api_rps: get_env_parse_or("API_RPS", 20)?,
            upstream_timeout: Duration::from_secs(get_env_parse_or("UPSTREAM_TIMEOUT_SECS", 60)?),
            log_format: log_format_from_env()?,
        })
    }
}

/// Settings for the terminal client. It talks to the gateway server by
/// default, or straight to Gemini when `GEMINI_KEY` is set and
/// `GATEWAY_URL` is not.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub gateway_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub catalog: CatalogSource,
    pub question_delay: Duration,
    pub gateway_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(String),
    Url(String),
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let gemini_api_key = env::var("GEMINI_KEY").ok().filter(|k| !k.is_empty());
        let gateway_url = match env::var("GATEWAY_URL").ok() {
            Some(url) => Some(url),
            None if gemini_api_key.is_some() => None,
            None => Some("http://127.0.0.1:3000".to_string()),
        };

        let catalog = match env::var("CATALOG_URL").ok() {
            Some(url) => CatalogSource::Url(url),
            None => CatalogSource::File(get_env_or("CATALOG_PATH", "public/data/videos.json")),
        };

        Ok(Self {
            gateway_url,
            gemini_api_key,
            gemini_model: get_env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            gemini_base_url: get_env_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            catalog,
            question_delay: Duration::from_millis(get_env_parse_or("QUESTION_DELAY_MS", 2000)?),
            gateway_timeout: Duration::from_secs(get_env_parse_or("GATEWAY_TIMEOUT_SECS", 30)?),
        })
    }
}

fn log_format_from_env() -> Result<LogFormat> {
    match get_env_or("LOG_FORMAT", "text").to_lowercase().as_str() {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(Error::Config(format!("Invalid value for LOG_FORMAT: {}", other))),
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
