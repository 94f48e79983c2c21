//! Chat store: `recent_chats` and `chat_messages` queries.
//!
//! Every function takes a `&mut SqliteConnection` so callers can run it on a
//! pooled connection or inside a transaction.

use sqlx::SqliteConnection;
use tracing::{debug, error};

use super::models::{ChatMessage, ChatSession, Sender};
use crate::common::{now_timestamp, ApiError};

pub async fn create_session(
    conn: &mut SqliteConnection,
    user_id: i64,
    title: &str,
) -> Result<ChatSession, ApiError> {
    let session = sqlx::query_as::<_, ChatSession>(
        "INSERT INTO recent_chats (recent_time, user_id, title) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(now_timestamp())
    .bind(user_id)
    .bind(title)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        error!(error = %e, user_id = user_id, "Database error creating chat session");
        ApiError::DatabaseError(e)
    })?;

    debug!(
        user_id = user_id,
        recent_id = session.recent_id,
        "Chat session created"
    );

    Ok(session)
}

pub async fn find_session(
    conn: &mut SqliteConnection,
    recent_id: i64,
) -> Result<Option<ChatSession>, ApiError> {
    sqlx::query_as::<_, ChatSession>("SELECT * FROM recent_chats WHERE recent_id = ?")
        .bind(recent_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)
}

/// Sessions owned by `user_id`, newest first
pub async fn list_sessions_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<ChatSession>, ApiError> {
    sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM recent_chats WHERE user_id = ? ORDER BY recent_time DESC, recent_id DESC",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(ApiError::DatabaseError)
}

/// Returns `false` when no session has that id
pub async fn rename_session(
    conn: &mut SqliteConnection,
    recent_id: i64,
    title: &str,
) -> Result<bool, ApiError> {
    let result = sqlx::query("UPDATE recent_chats SET title = ? WHERE recent_id = ?")
        .bind(title)
        .bind(recent_id)
        .execute(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(result.rows_affected() > 0)
}

/// Deletes the messages, then the session row (foreign key order).
///
/// Returns the number of messages removed.
pub async fn delete_session(
    conn: &mut SqliteConnection,
    recent_id: i64,
) -> Result<u64, ApiError> {
    let messages = sqlx::query("DELETE FROM chat_messages WHERE recent_id = ?")
        .bind(recent_id)
        .execute(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)?;

    sqlx::query("DELETE FROM recent_chats WHERE recent_id = ?")
        .bind(recent_id)
        .execute(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(messages.rows_affected())
}

pub async fn append_message(
    conn: &mut SqliteConnection,
    recent_id: i64,
    sender: Sender,
    message: &str,
) -> Result<ChatMessage, ApiError> {
    sqlx::query_as::<_, ChatMessage>(
        "INSERT INTO chat_messages (recent_id, sender, message, timestamp) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(recent_id)
    .bind(sender.as_str())
    .bind(message)
    .bind(now_timestamp())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            recent_id = recent_id,
            sender = %sender,
            "Database error appending chat message"
        );
        ApiError::DatabaseError(e)
    })
}

/// Messages of one session in replay order: timestamp, then insertion order
pub async fn load_messages(
    conn: &mut SqliteConnection,
    recent_id: i64,
) -> Result<Vec<ChatMessage>, ApiError> {
    sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_messages WHERE recent_id = ? ORDER BY timestamp ASC, id ASC",
    )
    .bind(recent_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(ApiError::DatabaseError)
}
