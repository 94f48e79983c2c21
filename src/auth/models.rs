//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// `auth_sessions.id` this token belongs to
    pub sid: String,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// `auth_sessions` row backing a session cookie
#[derive(FromRow, Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: i64,
    pub expires_at: String,
}

/// A freshly established login
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    /// Signed session token set as the session cookie
    pub token: String,
    pub recent_id: i64,
}

#[derive(Deserialize, Debug, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub recent_id: i64,
}

#[derive(Deserialize, Debug, Default)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
}

/// Query parameters Google appends to the redirect URI
#[derive(Deserialize, Debug, Default)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// `/login` query parameters; `error` carries a flash code
#[derive(Deserialize, Debug, Default)]
pub struct LoginPageParams {
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GoogleLandingParams {
    pub recent_id: Option<i64>,
}
