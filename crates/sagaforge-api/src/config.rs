//! Server configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_NARRATOR_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_NARRATOR_MODEL: &str = "gpt-4o-mini";
const DEFAULT_NARRATOR_TIMEOUT_SECS: u64 = 60;

/// Connection settings for an OpenAI-compatible chat-completions provider.
#[derive(Clone)]
pub struct NarratorConfig {
    /// Bearer token.
    pub api_key: String,
    /// Base URL, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model name.
    pub model: String,
}

impl std::fmt::Debug for NarratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarratorConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Directory for the file-backed session store. In-memory when unset.
    pub data_dir: Option<PathBuf>,
    /// Extra YAML world catalog merged into the built-in worlds.
    pub worlds_file: Option<PathBuf>,
    /// Remote narrator; the offline scripted narrator is used when unset.
    pub narrator: Option<NarratorConfig>,
    /// Upper bound on a single narrator or outline call.
    pub narrator_timeout: Duration,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let timeout_secs = match var("NARRATOR_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().ok().filter(|secs| *secs > 0).ok_or_else(|| {
                AppError::Config(format!(
                    "NARRATOR_TIMEOUT_SECS must be a positive integer, got {raw:?}"
                ))
            })?,
            None => DEFAULT_NARRATOR_TIMEOUT_SECS,
        };

        let narrator = var("NARRATOR_API_KEY").map(|api_key| NarratorConfig {
            api_key,
            base_url: var("NARRATOR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_NARRATOR_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            model: var("NARRATOR_MODEL").unwrap_or_else(|| DEFAULT_NARRATOR_MODEL.to_owned()),
        });

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            data_dir: var("SAGAFORGE_DATA_DIR").map(PathBuf::from),
            worlds_file: var("SAGAFORGE_WORLDS_FILE").map(PathBuf::from),
            narrator,
            narrator_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
