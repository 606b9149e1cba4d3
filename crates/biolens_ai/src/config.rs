use std::path::Path;
use std::time::Duration;

use biolens_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::openai::OpenAiClient;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_CHAT_MODEL: &str = "BIOLENS_CHAT_MODEL";
pub const ENV_TITLE_MODEL: &str = "BIOLENS_TITLE_MODEL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: String,
    pub chat_model: String,
    pub title_model: String,
    pub title_max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            chat_model: "gpt-4o".to_string(),
            title_model: "gpt-4o-mini".to_string(),
            title_max_tokens: 50,
            timeout_secs: 60,
        }
    }
}

impl AiConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or blank optional
    /// variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut cfg = Self::default();
        cfg.api_key = get(ENV_API_KEY).ok_or_else(|| {
            AppError::new("AI_CONFIG_INVALID", "API key is not configured")
                .with_details(format!("missing {ENV_API_KEY}"))
        })?;
        if let Some(v) = get(ENV_BASE_URL) {
            cfg.base_url = v;
        }
        if let Some(v) = get(ENV_CHAT_MODEL) {
            cfg.chat_model = v;
        }
        if let Some(v) = get(ENV_TITLE_MODEL) {
            cfg.title_model = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::new("CONFIG_READ_FAILED", "Failed to read AI config file")
                .with_details(format!("path={}; err={e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_str(&text).map_err(|e| {
            AppError::new("AI_CONFIG_INVALID", "AI config file is not valid JSON")
                .with_details(format!("path={}; err={e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::new("AI_CONFIG_INVALID", "API key is not configured"));
        }
        if self.chat_model.trim().is_empty() || self.title_model.trim().is_empty() {
            return Err(AppError::new("AI_CONFIG_INVALID", "Model names are required"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::new("AI_CONFIG_INVALID", "timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn client(&self) -> Result<OpenAiClient, AppError> {
        Ok(OpenAiClient::new(&self.base_url, &self.api_key)?
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}
