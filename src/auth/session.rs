//! Session tokens and the cookies that carry them

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{error, warn};

use super::models::Claims;
use crate::common::ApiError;

pub const SESSION_COOKIE: &str = "session";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Signs an HS256 token naming the user and their `auth_sessions` row
pub fn issue_token(
    secret: &str,
    user_id: i64,
    session_id: &str,
    ttl: Duration,
) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id.to_string(),
        sid: session_id.to_string(),
        exp: (Utc::now() + ttl).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = user_id, "JWT token encoding failed");
        ApiError::InternalServer("token encoding failed".to_string())
    })
}

/// Verifies signature and expiry
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!(error = %e, "JWT token validation failed");
        ApiError::Unauthorized("invalid token".to_string())
    })
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Holds the CSRF `state` between the OAuth redirect and the callback
pub fn oauth_state_cookie(state: String, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, state))
        .path("/login/google")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

pub fn clear_oauth_state(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(OAUTH_STATE_COOKIE).path("/login/google"))
}
