use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; the service runs fully offline without any of them.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON taxonomy file. The built-in taxonomy is used when unset.
    pub taxonomy_path: Option<PathBuf>,
    pub anthropic_api_key: Option<String>,
    pub enable_llm_wording: bool,
    pub llm_timeout_ms: u64,
    pub llm_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            taxonomy_path: optional_env("TAXONOMY_PATH").map(PathBuf::from),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            enable_llm_wording: parse_env("ENABLE_LLM_WORDING", false)?,
            llm_timeout_ms: parse_env("LLM_TIMEOUT_MS", 8000)?,
            llm_max_attempts: parse_env("LLM_MAX_ATTEMPTS", 2)?,
        })
    }

    /// The API key, only when LLM wording is switched on.
    pub fn wording_api_key(&self) -> Option<&str> {
        if !self.enable_llm_wording {
            return None;
        }
        self.anthropic_api_key.as_deref()
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            taxonomy_path: None,
            anthropic_api_key: Some("key".to_string()),
            enable_llm_wording: false,
            llm_timeout_ms: 8000,
            llm_max_attempts: 2,
        }
    }

    #[test]
    fn test_wording_key_requires_flag() {
        let mut c = config();
        assert_eq!(c.wording_api_key(), None);
        c.enable_llm_wording = true;
        assert_eq!(c.wording_api_key(), Some("key"));
        c.anthropic_api_key = None;
        assert_eq!(c.wording_api_key(), None);
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u32 = parse_env("TAILOR_API_TEST_SURELY_UNSET", 7).unwrap();
        assert_eq!(value, 7);
    }
}
