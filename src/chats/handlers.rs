//! Chat handlers

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::info;

use super::models::{
    ChatRequest, ChatResponse, ChatSession, DeleteChatResponse, GenerateTitleRequest,
    GenerateTitleResponse, LoadChatResponse, NewRecentRequest, NewRecentResponse,
    RecentChatsResponse, SaveTitleRequest, SaveTitleResponse,
};
use crate::auth::AuthedUser;
use crate::common::{escape_html, ApiError, AppState};

/// GET /chat
/// Renders the chat page with the user's recent chats; anonymous visitors go to `/login`
pub async fn chat_page(
    Extension(state): Extension<Arc<AppState>>,
    authed: Option<AuthedUser>,
) -> Result<Response, ApiError> {
    let Some(authed) = authed else {
        return Ok(Redirect::to("/login").into_response());
    };

    let recent_chats = state.chat_service().list_sessions(authed.id).await?;
    Ok(Html(render_chat_page(&authed.email, &recent_chats)).into_response())
}

/// POST /chat
///
/// # Request Body
/// ```json
/// { "message": "hi", "recent_id": 1 }
/// ```
///
/// # Response
/// ```json
/// { "response": "...", "chat_history": [{ "sender": "user", "message": "hi" }, ...] }
/// ```
pub async fn post_chat(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(input): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (Some(message), Some(recent_id)) = (input.message, input.recent_id) else {
        return Err(ApiError::InvalidInput(
            "Invalid message or recent_id".to_string(),
        ));
    };

    let outcome = state
        .chat_service()
        .post_message(authed.id, recent_id, &message)
        .await?;

    Ok(Json(ChatResponse {
        response: outcome.reply,
        chat_history: outcome.history,
    }))
}

/// POST /save/title
pub async fn save_title(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(input): Json<SaveTitleRequest>,
) -> Result<Json<SaveTitleResponse>, ApiError> {
    let (Some(chat_title), Some(recent_id)) = (input.chat_title, input.recent_id) else {
        return Err(ApiError::InvalidInput(
            "Missing chat title or recent_id".to_string(),
        ));
    };

    let chat_title = state
        .chat_service()
        .rename_session(authed.id, recent_id, &chat_title)
        .await?;

    Ok(Json(SaveTitleResponse {
        success: true,
        chat_title,
    }))
}

/// POST /api/new_recent
pub async fn create_new_chat(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    input: Option<Json<NewRecentRequest>>,
) -> Result<(StatusCode, Json<NewRecentResponse>), ApiError> {
    let input = input.map(|Json(body)| body).unwrap_or_default();

    let session = state
        .chat_service()
        .create_session(authed.id, input.title.as_deref())
        .await?;

    info!(user_id = authed.id, recent_id = session.recent_id, "New chat created");

    Ok((
        StatusCode::CREATED,
        Json(NewRecentResponse {
            success: true,
            recent_id: session.recent_id,
        }),
    ))
}

/// GET /api/recent_chats
pub async fn list_recent_chats(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<RecentChatsResponse>, ApiError> {
    let recent_chats = state.chat_service().list_sessions(authed.id).await?;
    Ok(Json(RecentChatsResponse { recent_chats }))
}

/// GET /api/load_chat/:recent_id
pub async fn load_chat(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(recent_id): Path<i64>,
) -> Result<Json<LoadChatResponse>, ApiError> {
    let chat_history = state
        .chat_service()
        .load_history(authed.id, recent_id)
        .await?;

    Ok(Json(LoadChatResponse { chat_history }))
}

/// DELETE /api/delete_chat/:recent_id
pub async fn delete_chat(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(recent_id): Path<i64>,
) -> Result<Json<DeleteChatResponse>, ApiError> {
    state
        .chat_service()
        .delete_session(authed.id, recent_id)
        .await?;

    Ok(Json(DeleteChatResponse {
        success: true,
        message: "Successfully Deleted".to_string(),
    }))
}

/// POST /generate/title
///
/// `success` is false when no usable title came back; the client keeps its default.
pub async fn generate_title(
    Extension(state): Extension<Arc<AppState>>,
    _authed: AuthedUser,
    Json(input): Json<GenerateTitleRequest>,
) -> Json<GenerateTitleResponse> {
    let reply = input.response.unwrap_or_default();
    let title = state.chat_service().generate_title(&reply).await;

    Json(GenerateTitleResponse {
        success: title.is_some(),
        title,
    })
}

fn render_chat_page(email: &str, recent_chats: &[ChatSession]) -> String {
    let items: String = recent_chats
        .iter()
        .map(|chat| {
            format!(
                r##"<li data-recent-id="{id}"><a href="#" onclick="loadChat({id});return false;">{title}</a> <button onclick="deleteChat({id})">&times;</button></li>"##,
                id = chat.recent_id,
                title = escape_html(&chat.title)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Chat</title>
    <style>
        body {{ font-family: Arial, sans-serif; display: flex; margin: 0; }}
        aside {{ width: 240px; padding: 16px; background: #f5f5f5; height: 100vh; }}
        main {{ flex: 1; padding: 16px; }}
        #history div {{ margin: 6px 0; }}
        .user {{ font-weight: bold; }}
    </style>
</head>
<body>
    <aside>
        <p>{email}</p>
        <button onclick="newChat()">New Chat</button>
        <ul id="recent">{items}</ul>
        <a href="/logout">Log out</a>
    </aside>
    <main>
        <div id="history"></div>
        <textarea id="message" rows="3" cols="60"></textarea>
        <button onclick="send()">Send</button>
    </main>
    <script>
        let recentId = sessionStorage.getItem("recent_id");
        function render(history) {{
            const box = document.getElementById("history");
            box.innerHTML = "";
            for (const m of history) {{
                const d = document.createElement("div");
                d.className = m.sender;
                d.textContent = m.sender + ": " + m.message;
                box.appendChild(d);
            }}
        }}
        async function loadChat(id) {{
            recentId = id;
            sessionStorage.setItem("recent_id", id);
            const r = await fetch(`/api/load_chat/${{id}}`);
            if (r.ok) render((await r.json()).chat_history);
        }}
        async function newChat() {{
            const r = await fetch("/api/new_recent", {{ method: "POST", headers: {{ "Content-Type": "application/json" }}, body: JSON.stringify({{ title: "New Chat" }}) }});
            if (r.ok) {{ sessionStorage.setItem("recent_id", (await r.json()).recent_id); location.reload(); }}
        }}
        async function deleteChat(id) {{
            const r = await fetch(`/api/delete_chat/${{id}}`, {{ method: "DELETE" }});
            if (r.ok) location.reload();
        }}
        async function send() {{
            const input = document.getElementById("message");
            const message = input.value.trim();
            if (!message || !recentId) return;
            input.value = "";
            const r = await fetch("/chat", {{ method: "POST", headers: {{ "Content-Type": "application/json" }}, body: JSON.stringify({{ message, recent_id: recentId }}) }});
            if (!r.ok) return;
            const data = await r.json();
            render(data.chat_history);
            if (data.chat_history.length === 2) {{
                const t = await (await fetch("/generate/title", {{ method: "POST", headers: {{ "Content-Type": "application/json" }}, body: JSON.stringify({{ response: data.response }}) }})).json();
                if (t.success && t.title) {{
                    await fetch("/save/title", {{ method: "POST", headers: {{ "Content-Type": "application/json" }}, body: JSON.stringify({{ chat_title: t.title, recent_id: recentId }}) }});
                    location.reload();
                }}
            }}
        }}
        if (recentId) loadChat(recentId);
    </script>
</body>
</html>"#,
        email = escape_html(email),
        items = items
    )
}
