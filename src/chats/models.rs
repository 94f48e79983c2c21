use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::common::helpers::deserialize_optional_id;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

// ============================================================================
// Core Chat Models
// ============================================================================

/// A conversation thread ("recent chat") owned by one user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub recent_id: i64,
    pub recent_time: String,
    pub user_id: i64,
    pub title: String,
}

/// One turn in a chat session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub recent_id: i64,
    pub sender: String, // 'user' or 'ai'
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of one history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sender: String,
    pub message: String,
}

impl From<ChatMessage> for HistoryEntry {
    fn from(msg: ChatMessage) -> Self {
        Self {
            sender: msg.sender,
            message: msg.message,
        }
    }
}

/// Result of posting a message: the reply plus the full ordered history
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub reply: String,
    pub history: Vec<HistoryEntry>,
}

// ============================================================================
// Request/Response Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub recent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub chat_history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SaveTitleRequest {
    #[serde(default)]
    pub chat_title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub recent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SaveTitleResponse {
    pub success: bool,
    pub chat_title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewRecentRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewRecentResponse {
    pub success: bool,
    pub recent_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoadChatResponse {
    pub chat_history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct RecentChatsResponse {
    pub recent_chats: Vec<ChatSession>,
}

#[derive(Debug, Serialize)]
pub struct DeleteChatResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateTitleRequest {
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateTitleResponse {
    pub success: bool,
    pub title: Option<String>,
}
