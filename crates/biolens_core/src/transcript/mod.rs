use serde::{Deserialize, Serialize};

use crate::citations::{extract_citations, Extraction};
use crate::domain::{Conversation, Sender};

pub const LOADING_TEXT: &str = "loading...";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

impl From<Sender> for Role {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Role::User,
            Sender::Ai => Role::Ai,
        }
    }
}

/// Stored turns carry the server id; placeholders carry a local `loading-<n>` id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageId {
    Stored(i64),
    Local(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub pending: bool,
}

impl Message {
    pub fn user(id: i64, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::Stored(id),
            role: Role::User,
            text: text.into(),
            pending: false,
        }
    }

    pub fn ai(id: i64, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::Stored(id),
            role: Role::Ai,
            text: text.into(),
            pending: false,
        }
    }

    /// Display form: model replies have their citation tokens lifted into links.
    pub fn rendered(&self) -> Extraction {
        match (self.role, self.pending) {
            (Role::Ai, false) => extract_citations(&self.text),
            _ => Extraction {
                text: self.text.clone(),
                links: Vec::new(),
            },
        }
    }
}

/// Client-side message list with optimistic loading placeholders.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_local: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_conversations(conversations: &[Conversation]) -> Self {
        let messages = conversations
            .iter()
            .map(|c| Message {
                id: MessageId::Stored(c.id),
                role: c.sender.into(),
                text: c.content.clone(),
                pending: false,
            })
            .collect();
        Self {
            messages,
            next_local: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn remove(&mut self, id: &MessageId) -> Option<Message> {
        let idx = self.messages.iter().position(|m| &m.id == id)?;
        Some(self.messages.remove(idx))
    }

    /// Append an AI placeholder and return its id.
    pub fn begin_pending(&mut self) -> MessageId {
        self.next_local += 1;
        let id = MessageId::Local(format!("loading-{}", self.next_local));
        self.messages.push(Message {
            id: id.clone(),
            role: Role::Ai,
            text: LOADING_TEXT.to_string(),
            pending: true,
        });
        id
    }

    /// Swap the placeholder for the real reply, appended at the end.
    /// Returns `false` when no such placeholder exists.
    pub fn resolve_pending(&mut self, id: &MessageId, reply: Message) -> bool {
        if !self.drop_placeholder(id) {
            return false;
        }
        self.messages.push(reply);
        true
    }

    pub fn fail_pending(&mut self, id: &MessageId) -> bool {
        self.drop_placeholder(id)
    }

    fn drop_placeholder(&mut self, id: &MessageId) -> bool {
        match self.messages.iter().position(|m| m.pending && &m.id == id) {
            Some(idx) => {
                self.messages.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.messages.iter().any(|m| m.pending)
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }
}
