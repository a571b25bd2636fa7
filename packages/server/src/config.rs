use anyhow::{Context, Result};
use dotenvy::dotenv;
use research_engine::SecretString;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: SecretString,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub tavily_api_key: SecretString,
    pub inter_query_pause: Duration,
    pub fetch_timeout: Duration,
    pub search_timeout: Duration,
    pub model_timeout: Duration,
    pub health_check_url: String,
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: parse_or("PORT", 8080)?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?
                .into(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            tavily_api_key: env::var("TAVILY_API_KEY")
                .context("TAVILY_API_KEY must be set")?
                .into(),
            inter_query_pause: Duration::from_millis(parse_or("INTER_QUERY_PAUSE_MS", 1000)?),
            fetch_timeout: Duration::from_secs(parse_or("FETCH_TIMEOUT_SECS", 30)?),
            search_timeout: Duration::from_secs(parse_or("SEARCH_TIMEOUT_SECS", 30)?),
            model_timeout: Duration::from_secs(parse_or("MODEL_TIMEOUT_SECS", 120)?),
            health_check_url: env::var("HEALTH_CHECK_URL")
                .unwrap_or_else(|_| "https://httpbin.org/html".to_string()),
        })
    }
}
