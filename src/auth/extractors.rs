//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{debug, warn};

use super::session::SESSION_COOKIE;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Reads the session token from the `session` cookie, falling back to an
/// `Authorization: Bearer` header, and checks it against `auth_sessions`.
/// Use `Option<AuthedUser>` on pages that redirect anonymous visitors.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: i64,
    pub email: String,
    pub session_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match session_token(parts) {
            Some(t) => t,
            None => {
                debug!("Authentication failed: no session cookie or Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        let authenticated = app_state.auth_service().authenticate(&token).await?;

        debug!(
            user_id = authenticated.user.id,
            email = %safe_email_log(&authenticated.user.email),
            "User authentication successful via extractor"
        );

        Ok(AuthedUser {
            id: authenticated.user.id,
            email: authenticated.user.email,
            session_id: authenticated.session_id,
        })
    }
}

/// Session cookie first, then a Bearer (or raw) Authorization header
fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        warn!("Empty Authorization header");
        return None;
    }
    Some(token.to_string())
}
