use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;

/// Creates and returns the chat router
///
/// # Routes
/// - `GET /chat` - Chat page with the recent-chat list
/// - `POST /chat` - Send a message and get the AI reply plus history
/// - `POST /save/title` - Rename a chat
/// - `POST /api/new_recent` - Start a new chat
/// - `GET /api/recent_chats` - List the user's chats
/// - `GET /api/load_chat/:recent_id` - Load a chat's history
/// - `DELETE /api/delete_chat/:recent_id` - Delete a chat and its messages
/// - `POST /generate/title` - Suggest a title for an AI reply
pub fn chats_routes() -> Router {
    Router::new()
        .route("/chat", get(handlers::chat_page).post(handlers::post_chat))
        .route("/save/title", post(handlers::save_title))
        .route("/api/new_recent", post(handlers::create_new_chat))
        .route("/api/recent_chats", get(handlers::list_recent_chats))
        .route("/api/load_chat/:recent_id", get(handlers::load_chat))
        .route("/api/delete_chat/:recent_id", delete(handlers::delete_chat))
        .route("/generate/title", post(handlers::generate_title))
}
