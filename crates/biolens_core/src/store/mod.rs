use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::{Chat, Conversation, Sender, StandardRef};
use crate::error::AppError;

/// Storage seam for chats, their turns and reference material.
pub trait ChatStore {
    /// The chat with `chat_id` if it belongs to `user_id`.
    fn find_chat(&self, user_id: i64, chat_id: i64) -> Result<Option<Chat>, AppError>;
    fn create_chat(&mut self, user_id: i64, title: &str) -> Result<Chat, AppError>;
    fn append_conversation(
        &mut self,
        chat_id: i64,
        sender: Sender,
        content: &str,
    ) -> Result<Conversation, AppError>;
    /// Oldest first.
    fn conversations(&self, chat_id: i64) -> Result<Vec<Conversation>, AppError>;
    /// Most recently updated first.
    fn list_chats(&self, user_id: i64) -> Result<Vec<Chat>, AppError>;
    /// Removes the chat and all of its turns.
    fn delete_chat(&mut self, chat_id: i64) -> Result<(), AppError>;
    fn standard_refs(&self, categories: &[&str]) -> Result<Vec<StandardRef>, AppError>;
}

pub fn now_rfc3339_utc() -> Result<String, AppError> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
        AppError::new("STORE_TIME_FAILED", "Failed to format time").with_details(e.to_string())
    })
}

#[derive(Debug, Clone)]
struct ChatRow {
    chat: Chat,
    // Monotonic touch counter; wall-clock timestamps can tie.
    touched: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryChatStore {
    chats: Vec<ChatRow>,
    conversations: Vec<Conversation>,
    refs: Vec<StandardRef>,
    next_id: i64,
    tick: u64,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_standard_ref(&mut self, category: &str, content: &str) -> StandardRef {
        let r = StandardRef {
            id: self.allocate_id(),
            category: category.to_string(),
            content: content.to_string(),
        };
        self.refs.push(r.clone());
        r
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

impl ChatStore for MemoryChatStore {
    fn find_chat(&self, user_id: i64, chat_id: i64) -> Result<Option<Chat>, AppError> {
        Ok(self
            .chats
            .iter()
            .find(|row| row.chat.id == chat_id && row.chat.user_id == user_id)
            .map(|row| row.chat.clone()))
    }

    fn create_chat(&mut self, user_id: i64, title: &str) -> Result<Chat, AppError> {
        if title.trim().is_empty() {
            return Err(AppError::new("CHAT_INVALID_REQUEST", "Chat title is required"));
        }
        let now = now_rfc3339_utc()?;
        let chat = Chat {
            id: self.allocate_id(),
            user_id,
            title: title.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        let touched = self.next_tick();
        self.chats.push(ChatRow {
            chat: chat.clone(),
            touched,
        });
        Ok(chat)
    }

    fn append_conversation(
        &mut self,
        chat_id: i64,
        sender: Sender,
        content: &str,
    ) -> Result<Conversation, AppError> {
        let now = now_rfc3339_utc()?;
        let touched = self.next_tick();
        let row = self
            .chats
            .iter_mut()
            .find(|row| row.chat.id == chat_id)
            .ok_or_else(|| AppError::chat_not_found(chat_id))?;
        row.chat.updated_at = now.clone();
        row.touched = touched;

        let conversation = Conversation {
            id: self.allocate_id(),
            chat_id,
            sender,
            content: content.to_string(),
            created_at: now,
        };
        self.conversations.push(conversation.clone());
        Ok(conversation)
    }

    fn conversations(&self, chat_id: i64) -> Result<Vec<Conversation>, AppError> {
        // Insertion order is creation order.
        Ok(self
            .conversations
            .iter()
            .filter(|c| c.chat_id == chat_id)
            .cloned()
            .collect())
    }

    fn list_chats(&self, user_id: i64) -> Result<Vec<Chat>, AppError> {
        let mut rows: Vec<&ChatRow> = self
            .chats
            .iter()
            .filter(|row| row.chat.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.touched.cmp(&a.touched).then(b.chat.id.cmp(&a.chat.id)));
        Ok(rows.into_iter().map(|row| row.chat.clone()).collect())
    }

    fn delete_chat(&mut self, chat_id: i64) -> Result<(), AppError> {
        let before = self.chats.len();
        self.chats.retain(|row| row.chat.id != chat_id);
        if self.chats.len() == before {
            return Err(AppError::chat_not_found(chat_id));
        }
        self.conversations.retain(|c| c.chat_id != chat_id);
        Ok(())
    }

    fn standard_refs(&self, categories: &[&str]) -> Result<Vec<StandardRef>, AppError> {
        Ok(self
            .refs
            .iter()
            .filter(|r| categories.contains(&r.category.as_str()))
            .cloned()
            .collect())
    }
}
