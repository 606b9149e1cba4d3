use biolens_core::citations::{dedup_citations, extract_citations, Extraction};
use biolens_core::domain::{
    AnalysisCategory, Chat, Conversation, Sender, REF_NORMAL_RANGE, REF_NUMERIC_MEANING,
};
use biolens_core::error::AppError;
use biolens_core::health::{
    compose_chat_content, extract_health_data_from_history, health_data_message,
    HealthCheckupForm,
};
use biolens_core::store::ChatStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::AiConfig;
use crate::llm::{ChatMessage, CompletionRequest, Llm};

pub mod prompts;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendChatRequest {
    pub chat_id: Option<i64>,
    pub content: String,
}

impl SendChatRequest {
    /// A question with any filled checkup form fields appended to its text.
    pub fn with_form(chat_id: Option<i64>, content: &str, form: &HealthCheckupForm) -> Self {
        Self {
            chat_id,
            content: compose_chat_content(content, Some(form)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeHealthDataRequest {
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub health_data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdditionalAnalyzeRequest {
    pub term: String,
    pub category: AnalysisCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendChatResponse {
    pub chat_id: i64,
    pub conversation_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatListResponse {
    pub total_count: usize,
    pub chat_list: Vec<ChatSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListResponse {
    pub conversation_list: Vec<Conversation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdditionalAnalyzeResponse {
    pub content: String,
}

/// Prompt for a chat turn: system rules, every stored turn except the newest,
/// then `final_user`.
pub fn build_analysis_messages(history: &[Conversation], final_user: String) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(prompts::analysis_system_prompt())];
    let prior = history.len().saturating_sub(1);
    for conv in &history[..prior] {
        messages.push(match conv.sender {
            Sender::User => ChatMessage::user(conv.content.clone()),
            Sender::Ai => ChatMessage::assistant(conv.content.clone()),
        });
    }
    messages.push(ChatMessage::user(final_user));
    messages
}

pub struct ChatService<'a> {
    store: &'a mut dyn ChatStore,
    llm: &'a dyn Llm,
    config: &'a AiConfig,
}

impl<'a> ChatService<'a> {
    pub fn new(store: &'a mut dyn ChatStore, llm: &'a dyn Llm, config: &'a AiConfig) -> Self {
        Self { store, llm, config }
    }

    pub fn send_chat(
        &mut self,
        user_id: i64,
        req: SendChatRequest,
    ) -> Result<SendChatResponse, AppError> {
        if req.content.trim().is_empty() {
            return Err(AppError::new("CHAT_INVALID_REQUEST", "Message content is required"));
        }

        let chat = match req.chat_id {
            Some(chat_id) => self.owned_chat(user_id, chat_id)?,
            None => self.open_chat(user_id, Some(&req.content))?,
        };

        self.store
            .append_conversation(chat.id, Sender::User, &req.content)?;
        let history = self.store.conversations(chat.id)?;
        let reply = self.complete(build_analysis_messages(&history, req.content))?;
        let ai = self.store.append_conversation(chat.id, Sender::Ai, &reply)?;

        Ok(SendChatResponse {
            chat_id: chat.id,
            conversation_id: ai.id,
            content: ai.content,
        })
    }

    /// Analyze a checkup dataset. Without one in the request, the first dataset
    /// recorded in the chat is reused.
    pub fn analyze_health_data(
        &mut self,
        user_id: i64,
        req: AnalyzeHealthDataRequest,
    ) -> Result<SendChatResponse, AppError> {
        let existing = match req.chat_id {
            Some(chat_id) => Some(self.owned_chat(user_id, chat_id)?),
            None => None,
        };

        let health_data = match req.health_data {
            Some(v) if v.is_object() => v,
            Some(v) if !v.is_null() => {
                return Err(AppError::new(
                    "HEALTH_DATA_INVALID",
                    "healthData must be a JSON object",
                ));
            }
            _ => {
                let prior = match &existing {
                    Some(chat) => self.store.conversations(chat.id)?,
                    None => Vec::new(),
                };
                extract_health_data_from_history(&prior).ok_or_else(|| {
                    AppError::new("HEALTH_DATA_INVALID", "No health data to analyze")
                })?
            }
        };

        let chat = match existing {
            Some(chat) => chat,
            None => self.open_chat(user_id, None)?,
        };

        self.store
            .append_conversation(chat.id, Sender::User, &health_data_message(&health_data))?;
        let history = self.store.conversations(chat.id)?;
        let refs = self
            .store
            .standard_refs(&[REF_NUMERIC_MEANING, REF_NORMAL_RANGE])?;
        let context = prompts::health_context(&health_data, &refs)?;
        let reply = self.complete(build_analysis_messages(
            &history,
            prompts::analysis_user_turn(&context),
        ))?;
        let ai = self.store.append_conversation(chat.id, Sender::Ai, &reply)?;

        Ok(SendChatResponse {
            chat_id: chat.id,
            conversation_id: ai.id,
            content: ai.content,
        })
    }

    pub fn get_chat_list(&self, user_id: i64) -> Result<ChatListResponse, AppError> {
        let chat_list: Vec<ChatSummary> = self
            .store
            .list_chats(user_id)?
            .into_iter()
            .map(|c| ChatSummary {
                id: c.id,
                title: c.title,
            })
            .collect();
        Ok(ChatListResponse {
            total_count: chat_list.len(),
            chat_list,
        })
    }

    pub fn get_chat_detail(
        &self,
        user_id: i64,
        chat_id: i64,
    ) -> Result<ConversationListResponse, AppError> {
        let chat = self.owned_chat(user_id, chat_id)?;
        Ok(ConversationListResponse {
            conversation_list: self.store.conversations(chat.id)?,
        })
    }

    pub fn delete_chat(&mut self, user_id: i64, chat_id: i64) -> Result<(), AppError> {
        let chat = self.owned_chat(user_id, chat_id)?;
        self.store.delete_chat(chat.id)?;
        info!(chat_id, "chat deleted");
        Ok(())
    }

    pub fn additional_analyze(
        &self,
        req: AdditionalAnalyzeRequest,
    ) -> Result<AdditionalAnalyzeResponse, AppError> {
        let term = req.term.trim();
        if term.is_empty() {
            return Err(AppError::new("CHAT_INVALID_REQUEST", "term is required"));
        }
        let refs = self.store.standard_refs(&[req.category.as_str()])?;
        let messages = vec![
            ChatMessage::system(prompts::additional_analyze_system_prompt(term, req.category)),
            ChatMessage::user(prompts::additional_analyze_user_turn(term, &refs)?),
        ];
        Ok(AdditionalAnalyzeResponse {
            content: self.complete(messages)?,
        })
    }

    /// Split a stored reply into display text and reference links.
    pub fn render_reply(&self, content: &str) -> Extraction {
        extract_citations(content)
    }

    /// Short title for a new chat; falls back to [`prompts::DEFAULT_TITLE`] when
    /// the model fails or returns nothing.
    pub fn generate_chat_title(&self, first_message: Option<&str>) -> String {
        let seed = first_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(prompts::DEFAULT_TITLE_SEED);
        let request = CompletionRequest {
            model: self.config.title_model.clone(),
            messages: vec![
                ChatMessage::system(prompts::TITLE_SYSTEM_PROMPT),
                ChatMessage::user(seed),
            ],
            max_tokens: Some(self.config.title_max_tokens),
        };
        match self.llm.complete(&request) {
            Ok(title) if !title.trim().is_empty() => title.trim().to_string(),
            Ok(_) => prompts::DEFAULT_TITLE.to_string(),
            Err(e) => {
                warn!(error = %e, "title generation failed; using default title");
                prompts::DEFAULT_TITLE.to_string()
            }
        }
    }

    fn owned_chat(&self, user_id: i64, chat_id: i64) -> Result<Chat, AppError> {
        self.store
            .find_chat(user_id, chat_id)?
            .ok_or_else(|| AppError::chat_not_found(chat_id))
    }

    fn open_chat(&mut self, user_id: i64, first_message: Option<&str>) -> Result<Chat, AppError> {
        let title = self.generate_chat_title(first_message);
        let chat = self.store.create_chat(user_id, &title)?;
        info!(chat_id = chat.id, user_id, "chat created");
        Ok(chat)
    }

    fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, AppError> {
        let request = CompletionRequest {
            model: self.config.chat_model.clone(),
            messages,
            max_tokens: None,
        };
        let reply = self.llm.complete(&request).map_err(|e| {
            warn!(error = %e, "completion failed");
            e
        })?;
        Ok(dedup_citations(&reply))
    }
}
