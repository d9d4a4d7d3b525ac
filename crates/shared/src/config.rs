use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_NEWSAPI_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com";

#[derive(Clone)]
pub struct Config {
    pub newsapi_api_key: String,
    pub gemini_api_key: String,
    pub deepgram_api_key: String,
    pub newsapi_base_url: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub deepgram_base_url: String,
    pub deepgram_model: Option<String>,
    pub database_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

// Keys must never reach logs or terminal output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("newsapi_api_key", &"<redacted>")
            .field("gemini_api_key", &"<redacted>")
            .field("deepgram_api_key", &"<redacted>")
            .field("newsapi_base_url", &self.newsapi_base_url)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("deepgram_base_url", &self.deepgram_base_url)
            .field("deepgram_model", &self.deepgram_model)
            .field("database_path", &self.database_path)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let newsapi_api_key = required_key(
            "NEWSAPI_API_KEY",
            "Get a NewsAPI key from: https://newsapi.org/register",
        )?;
        let gemini_api_key = required_key(
            "GEMINI_API_KEY",
            "Get a Gemini API key from: https://aistudio.google.com/app/apikey",
        )?;
        let deepgram_api_key = required_key(
            "DEEPGRAM_API_KEY",
            "Get a Deepgram API key from: https://console.deepgram.com",
        )?;

        Ok(Self {
            newsapi_api_key,
            gemini_api_key,
            deepgram_api_key,
            newsapi_base_url: env_or("NEWSAPI_BASE_URL", DEFAULT_NEWSAPI_BASE_URL),
            gemini_base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            deepgram_base_url: env_or("DEEPGRAM_BASE_URL", DEFAULT_DEEPGRAM_BASE_URL),
            deepgram_model: optional_var("DEEPGRAM_MODEL"),
            database_path: optional_var("PODCAST_DB_PATH").map(PathBuf::from),
            output_dir: optional_var("PODCAST_OUTPUT_DIR").map(PathBuf::from),
        })
    }

    /// `PODCAST_DB_PATH` from the environment or `.env`, for tools that
    /// need the database but none of the API keys
    pub fn database_path_from_env() -> Option<PathBuf> {
        Self::try_load_dotenv();
        optional_var("PODCAST_DB_PATH").map(PathBuf::from)
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/ai-news-podcast/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join(crate::io::APP_DIR_NAME).join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

fn required_key(name: &str, hint: &str) -> Result<String> {
    optional_var(name).with_context(|| {
        format!(
            "{name} not found.\n\n\
            To fix this, create ~/.config/{}/.env with:\n  \
            NEWSAPI_API_KEY=your_key_here\n  \
            GEMINI_API_KEY=your_key_here\n  \
            DEEPGRAM_API_KEY=your_key_here\n\n\
            {hint}",
            crate::io::APP_DIR_NAME
        )
    })
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    optional_var(name)
        .map(|value| value.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}
