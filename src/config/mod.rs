//! Configuration (layered: code > process env > `.env` file).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::error::{AgentError, Result};

/// Environment variables checked for the Gemini API key, in order.
pub const API_KEY_VARS: [&str; 3] = ["GOOGLE_API_KEY", "GENAI_API_KEY", "GEMINI_API_KEY"];
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const MODEL_VAR: &str = "AGENTDECK_MODEL";
pub const TIMEOUT_VAR: &str = "AGENTDECK_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Resolved settings shared by providers and agents.
#[derive(Clone, Default, PartialEq)]
pub struct AgentConfig {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AgentConfig {
    /// Empty config: no key, default endpoint, default model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from process environment, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a specific `.env` file without touching the process
    /// environment. Process variables still take precedence over the file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file_vars = HashMap::new();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            AgentError::Configuration(format!("Failed to read {}: {e}", path.display()))
        })?;
        for item in iter {
            let (key, value) = item.map_err(|e| {
                AgentError::Configuration(format!("Invalid entry in {}: {e}", path.display()))
            })?;
            file_vars.insert(key, value);
        }

        Ok(Self::from_lookup(|key| {
            std::env::var(key).ok().or_else(|| file_vars.get(key).cloned())
        }))
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = API_KEY_VARS.iter().find_map(|key| non_empty(key));
        let timeout = non_empty(TIMEOUT_VAR).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                warn!(value = %raw, "ignoring invalid {TIMEOUT_VAR}");
                None
            }
        });

        Self {
            api_key,
            base_url: non_empty(BASE_URL_VAR),
            model: non_empty(MODEL_VAR),
            timeout,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// The API key, or an authentication error naming the variables to set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key().ok_or_else(|| {
            AgentError::Authentication(
                "Set GOOGLE_API_KEY or GENAI_API_KEY before running an agent.".into(),
            )
        })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Model override, if one was configured.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// The configured model, falling back to `default`.
    pub fn model_or(&self, default: &str) -> String {
        self.model.clone().unwrap_or_else(|| default.to_string())
    }

    /// HTTP request timeout for provider calls.
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}
