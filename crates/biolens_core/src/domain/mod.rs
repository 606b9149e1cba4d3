use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: String, // RFC3339
    pub updated_at: String, // RFC3339
}

/// One turn of a chat, either the user's message or the model's reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    pub chat_id: i64,
    pub sender: Sender,
    pub content: String,
    pub created_at: String, // RFC3339
}

/// Curated reference text handed to the model as grounding context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandardRef {
    pub id: i64,
    pub category: String,
    pub content: String,
}

pub const REF_NUMERIC_MEANING: &str = "numeric_meaning";
pub const REF_NORMAL_RANGE: &str = "normal_range";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisCategory {
    ActionGuide,
    Cause,
    Definition,
}

impl AnalysisCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisCategory::ActionGuide => "action_guide",
            AnalysisCategory::Cause => "cause",
            AnalysisCategory::Definition => "definition",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "action_guide" => Some(Self::ActionGuide),
            "cause" => Some(Self::Cause),
            "definition" => Some(Self::Definition),
            _ => None,
        }
    }
}
