use std::time::Duration;

use biolens_core::error::AppError;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a client for an OpenAI-compatible endpoint.
    ///
    /// Remote endpoints must use `https://`; plain `http://` is only accepted for
    /// a gateway on `127.0.0.1`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        if api_key.trim().is_empty() {
            return Err(AppError::new("AI_CONFIG_INVALID", "API key is required"));
        }

        Ok(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/v1/models", self.base_url);
        debug!(url = %url, "checking model endpoint");
        let resp = ureq::get(&url)
            .timeout(Duration::from_secs(5))
            .set("Authorization", &self.bearer())
            .call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(AppError::new("AI_UNHEALTHY", "Model endpoint health check failed")
                .with_details(format!("status={}", r.status()))),
            Err(ureq::Error::Status(status, _)) => Err(AppError::new(
                "AI_UNHEALTHY",
                "Model endpoint health check failed",
            )
            .with_details(format!("status={status}"))
            .with_retryable(status == 429 || status >= 500)),
            Err(e) => Err(AppError::new("AI_UNREACHABLE", "Failed to reach model endpoint")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}

fn validate_base_url(base_url: &str) -> Result<(), AppError> {
    let rejected = || {
        AppError::new(
            "AI_REMOTE_NOT_ALLOWED",
            "Model base URL must be https, or http on 127.0.0.1",
        )
        .with_details(format!("base_url={base_url}"))
    };

    if let Some(rest) = base_url.strip_prefix("https://") {
        let authority = rest.split('/').next().unwrap_or_default();
        // No userinfo (`user@host`).
        if authority.is_empty() || authority.contains('@') {
            return Err(rejected());
        }
        return Ok(());
    }

    if let Some(rest) = base_url.strip_prefix("http://") {
        if rest == "127.0.0.1" {
            return Ok(());
        }
        if let Some(port) = rest.strip_prefix("127.0.0.1:") {
            let digits_only = !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit());
            if digits_only && matches!(port.parse::<u16>(), Ok(p) if p != 0) {
                return Ok(());
            }
        }
    }

    Err(rejected())
}
