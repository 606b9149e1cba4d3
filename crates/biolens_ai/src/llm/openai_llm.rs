use biolens_core::error::AppError;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CompletionRequest, Llm};
use crate::openai::OpenAiClient;

#[derive(Debug, Clone)]
pub struct OpenAiLlm {
    client: OpenAiClient,
}

impl OpenAiLlm {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl Llm for OpenAiLlm {
    fn complete(&self, request: &CompletionRequest) -> Result<String, AppError> {
        let url = format!("{}/v1/chat/completions", self.client.base_url());
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "requesting completion"
        );

        let body = serde_json::to_value(request).map_err(|e| {
            AppError::new("AI_REQUEST_FAILED", "Failed to encode completion request")
                .with_details(e.to_string())
        })?;

        let resp = ureq::post(&url)
            .timeout(self.client.timeout())
            .set("Authorization", &self.client.bearer())
            .send_json(body);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: CompletionResponse = r.into_json().map_err(|e| {
                    AppError::new("AI_REQUEST_FAILED", "Failed to decode completion response")
                        .with_details(e.to_string())
                })?;
                let choice = v.choices.into_iter().next().ok_or_else(|| {
                    AppError::new("AI_REQUEST_FAILED", "Completion response had no choices")
                })?;
                Ok(choice.message.content.unwrap_or_default())
            }
            Ok(r) => Err(AppError::new("AI_REQUEST_FAILED", "Completion request failed")
                .with_details(format!("status={}", r.status()))),
            Err(ureq::Error::Status(status, r)) => {
                let body = r.into_string().unwrap_or_default();
                warn!(status, "completion endpoint returned an error status");
                Err(AppError::new("AI_REQUEST_FAILED", "Completion request failed")
                    .with_details(format!("status={status}; body={body}"))
                    .with_retryable(status == 429 || status >= 500))
            }
            Err(e) => Err(AppError::new("AI_UNREACHABLE", "Failed to call completion endpoint")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}
