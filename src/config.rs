//! Configuration management for Focus Catcher.
//!
//! Configuration can be set via environment variables:
//! - `SUPER_MIND_API_KEY` - Optional. Credential for the chat-completions and web search APIs.
//!   Without it the `/chat` endpoint answers with a configuration error.
//! - `LLM_BASE_URL` - Optional. Chat-completions base URL. Defaults to `https://space.ai-builders.com/backend/v1`.
//! - `CHAT_MODEL` - Optional. Model used by the agentic loop. Defaults to `gpt-5`.
//! - `SEARCH_URL` - Optional. Web search endpoint. Defaults to `<LLM_BASE_URL>/search/`.
//! - `SEARCH_MAX_RESULTS` - Optional. Results requested per search keyword. Defaults to `3`.
//! - `GOOGLE_API_KEY` - Optional. Credential for the classification / analysis model.
//! - `GEMINI_BASE_URL` - Optional. Defaults to `https://generativelanguage.googleapis.com/v1beta`.
//! - `ANALYSIS_MODEL` - Optional. Defaults to `gemini-2.5-flash`.
//! - `DATABASE_PATH` - Optional. SQLite file. Defaults to `focus_catcher.db`.
//! - `FRONTEND_DIR` - Optional. Static frontend directory. Defaults to `frontend`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `MAX_TURNS` - Optional. Maximum agentic loop turns. Defaults to `10`.

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_LLM_BASE_URL: &str = "https://space.ai-builders.com/backend/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const LLM_API_KEY_VAR: &str = "SUPER_MIND_API_KEY";
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Chat-completions and web search settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer credential shared by the chat and search APIs
    pub api_key: Option<String>,

    /// Chat-completions base URL (without the `/chat/completions` suffix)
    pub base_url: String,

    /// Model driving the agentic loop
    pub chat_model: String,

    /// Web search endpoint
    pub search_url: String,

    /// Results requested per search keyword
    pub search_max_results: u32,
}

/// Classification / analysis model settings.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,

    pub analysis: AnalysisConfig,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Static frontend directory served at `/`
    pub frontend_dir: PathBuf,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Maximum primary LLM calls per chat request
    pub max_turns: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Credentials are optional here; the features that need them report
    /// `ConfigError::MissingEnvVar` when invoked without one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL);
        let search_url = std::env::var("SEARCH_URL")
            .unwrap_or_else(|_| format!("{}/search/", base_url.trim_end_matches('/')));

        let llm = LlmConfig {
            api_key: non_empty_var(LLM_API_KEY_VAR),
            chat_model: env_or("CHAT_MODEL", "gpt-5"),
            search_max_results: parse_var("SEARCH_MAX_RESULTS", 3)?,
            base_url,
            search_url,
        };

        let analysis = AnalysisConfig {
            api_key: non_empty_var(GOOGLE_API_KEY_VAR),
            base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            model: env_or("ANALYSIS_MODEL", "gemini-2.5-flash"),
        };

        let max_turns: usize = parse_var("MAX_TURNS", 10)?;
        if max_turns == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_TURNS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            llm,
            analysis,
            database_path: PathBuf::from(env_or("DATABASE_PATH", "focus_catcher.db")),
            frontend_dir: PathBuf::from(env_or("FRONTEND_DIR", "frontend")),
            host: env_or("HOST", "127.0.0.1"),
            port: parse_var("PORT", 8000)?,
            max_turns,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            llm: LlmConfig {
                api_key: None,
                base_url: DEFAULT_LLM_BASE_URL.to_string(),
                chat_model: "gpt-5".to_string(),
                search_url: format!("{}/search/", DEFAULT_LLM_BASE_URL),
                search_max_results: 3,
            },
            analysis: AnalysisConfig {
                api_key: None,
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
                model: "gemini-2.5-flash".to_string(),
            },
            database_path,
            frontend_dir: PathBuf::from("frontend"),
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_turns: 10,
        }
    }

    /// Chat / search credential, or the error naming the missing variable.
    pub fn require_llm_api_key(&self) -> Result<&str, ConfigError> {
        self.llm
            .api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar(LLM_API_KEY_VAR.to_string()))
    }

    /// Analysis model credential, or the error naming the missing variable.
    pub fn require_analysis_api_key(&self) -> Result<&str, ConfigError> {
        self.analysis
            .api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar(GOOGLE_API_KEY_VAR.to_string()))
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}
