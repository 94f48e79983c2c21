use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::models::{ChatSession, ExchangeOutcome, HistoryEntry, Sender, DEFAULT_CHAT_TITLE};
use super::store;
use super::validators::{is_acceptable_title, validate_message_content, validate_title};
use crate::common::ApiError;
use crate::services::completion::{complete_with_timeout, CompletionClient};

/// Instruction sent ahead of an AI reply when asking for a chat title
pub const TITLE_PROMPT_TEMPLATE: &str = "Generate a concise title of at most 20 characters and just single sentence just the title no other thing for the following conversation response if its not greeting or error message or asking for clarification else just return 'error' no anything else :";

pub fn build_title_prompt(reply_text: &str) -> String {
    format!("{}\n\nResponse: {}\n\n", TITLE_PROMPT_TEMPLATE, reply_text)
}

/// Chat flow: sessions, history, AI replies and titles
pub struct ChatService {
    db: SqlitePool,
    completion: Arc<dyn CompletionClient>,
    ai_timeout: Duration,
}

impl ChatService {
    pub fn new(db: SqlitePool, completion: Arc<dyn CompletionClient>, ai_timeout: Duration) -> Self {
        Self {
            db,
            completion,
            ai_timeout,
        }
    }

    /// Loads a session and checks it belongs to `user_id`
    async fn owned_session(
        conn: &mut SqliteConnection,
        user_id: i64,
        recent_id: i64,
    ) -> Result<ChatSession, ApiError> {
        let session = store::find_session(conn, recent_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;

        if session.user_id != user_id {
            warn!(
                user_id = user_id,
                recent_id = recent_id,
                owner_id = session.user_id,
                "Rejected access to another user's chat"
            );
            return Err(ApiError::Forbidden(
                "Chat belongs to another user".to_string(),
            ));
        }

        Ok(session)
    }

    /// Appends the user's message, asks the completion service for a reply,
    /// appends the reply and returns the whole history.
    ///
    /// The user message is committed before the AI call. A failed AI call
    /// still produces an `ai` message carrying the error text.
    pub async fn post_message(
        &self,
        user_id: i64,
        recent_id: i64,
        text: &str,
    ) -> Result<ExchangeOutcome, ApiError> {
        validate_message_content(text)?;

        {
            let mut conn = self.db.acquire().await?;
            Self::owned_session(&mut conn, user_id, recent_id).await?;
            store::append_message(&mut conn, recent_id, Sender::User, text).await?;
        }

        let reply = self.generate_reply(text).await;

        let mut conn = self.db.acquire().await?;
        store::append_message(&mut conn, recent_id, Sender::Ai, &reply).await?;
        let history = store::load_messages(&mut conn, recent_id)
            .await?
            .into_iter()
            .map(HistoryEntry::from)
            .collect();

        info!(recent_id = recent_id, user_id = user_id, "Chat exchange stored");

        Ok(ExchangeOutcome { reply, history })
    }

    /// Reply text for a prompt; failures degrade to an explanatory message
    async fn generate_reply(&self, prompt: &str) -> String {
        match complete_with_timeout(self.completion.as_ref(), prompt, self.ai_timeout).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    error = %e,
                    client = %self.completion.name(),
                    "AI completion failed, replying with error text"
                );
                format!("Error generating AI response: {}", e)
            }
        }
    }

    pub async fn create_session(
        &self,
        user_id: i64,
        title: Option<&str>,
    ) -> Result<ChatSession, ApiError> {
        let title = match title.map(str::trim) {
            None | Some("") => DEFAULT_CHAT_TITLE.to_string(),
            Some(t) => validate_title(t)?,
        };

        let mut conn = self.db.acquire().await?;
        store::create_session(&mut conn, user_id, &title).await
    }

    /// Renames a session owned by `user_id`; returns the stored title
    pub async fn rename_session(
        &self,
        user_id: i64,
        recent_id: i64,
        title: &str,
    ) -> Result<String, ApiError> {
        let title = validate_title(title)?;

        let mut conn = self.db.acquire().await?;
        Self::owned_session(&mut conn, user_id, recent_id).await?;
        if !store::rename_session(&mut conn, recent_id, &title).await? {
            return Err(ApiError::NotFound("Chat not found".to_string()));
        }

        debug!(recent_id = recent_id, "Chat title saved");
        Ok(title)
    }

    pub async fn delete_session(&self, user_id: i64, recent_id: i64) -> Result<(), ApiError> {
        let mut tx = self.db.begin().await?;
        Self::owned_session(&mut tx, user_id, recent_id).await?;
        let removed = store::delete_session(&mut tx, recent_id).await?;
        tx.commit().await?;

        info!(
            recent_id = recent_id,
            user_id = user_id,
            messages_removed = removed,
            "Chat deleted"
        );
        Ok(())
    }

    pub async fn load_history(
        &self,
        user_id: i64,
        recent_id: i64,
    ) -> Result<Vec<HistoryEntry>, ApiError> {
        let mut conn = self.db.acquire().await?;
        Self::owned_session(&mut conn, user_id, recent_id).await?;

        Ok(store::load_messages(&mut conn, recent_id)
            .await?
            .into_iter()
            .map(HistoryEntry::from)
            .collect())
    }

    pub async fn list_sessions(&self, user_id: i64) -> Result<Vec<ChatSession>, ApiError> {
        let mut conn = self.db.acquire().await?;
        store::list_sessions_for_user(&mut conn, user_id).await
    }

    /// Asks the completion service for a short title summarizing `reply_text`.
    ///
    /// Returns `None` for empty input, a failed call, an over-long answer, or
    /// the literal `error`.
    pub async fn generate_title(&self, reply_text: &str) -> Option<String> {
        if reply_text.trim().is_empty() {
            return None;
        }

        let prompt = build_title_prompt(reply_text);
        let generated =
            match complete_with_timeout(self.completion.as_ref(), &prompt, self.ai_timeout).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Title generation failed");
                    return None;
                }
            };

        let title = generated.trim();
        if is_acceptable_title(title) {
            Some(title.to_string())
        } else {
            debug!(
                candidate_chars = title.chars().count(),
                "Rejected generated title"
            );
            None
        }
    }
}
