use chrono::Duration;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::models::{LoginOutcome, User};
use super::password::{hash_password_blocking, verify_password_blocking};
use super::session::{decode_token, issue_token};
use super::store;
use super::validators::{SignupInput, SignupValidator};
use crate::chats::models::DEFAULT_CHAT_TITLE;
use crate::chats::store as chat_store;
use crate::common::{safe_email_log, ApiError, AppConfig, Validator};
use crate::services::oauth::{IdentityProvider, OAuthProfile};

/// Resolved from a valid session token
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub session_id: String,
}

/// Account creation, password and OAuth login, logout and token checks
pub struct AuthService {
    db: SqlitePool,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    fn session_ttl(&self) -> Duration {
        Duration::hours(self.config.session_ttl_hours)
    }

    pub async fn signup(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        name: Option<&str>,
    ) -> Result<User, ApiError> {
        let (email, password, name) = match (
            non_empty(email),
            password.filter(|p| !p.is_empty()),
            non_empty(name),
        ) {
            (Some(e), Some(p), Some(n)) => (e.to_lowercase(), p, n),
            _ => {
                return Err(ApiError::InvalidInput(
                    "Email, password and name are required".to_string(),
                ))
            }
        };

        SignupValidator
            .validate(&SignupInput {
                email: &email,
                password,
                name,
            })
            .into_result()?;

        let password_hash = hash_password_blocking(password.to_string()).await?;

        let mut conn = self.db.acquire().await?;
        store::create_local_user(&mut conn, &email, &password_hash, name).await
    }

    /// Checks the password and opens a fresh auth session plus a new chat
    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<LoginOutcome, ApiError> {
        let (Some(email), Some(password)) = (non_empty(email), password.filter(|p| !p.is_empty()))
        else {
            return Err(ApiError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        };
        let email = email.to_lowercase();

        let mut conn = self.db.acquire().await?;
        let found = store::find_user_by_email(&mut conn, &email).await?;
        drop(conn);

        let user = found.ok_or_else(|| {
            debug!(email = %safe_email_log(&email), "Login for unknown email");
            ApiError::NotFound("User not found".to_string())
        })?;

        let Some(hash) = user.password_hash.clone().filter(|h| !h.is_empty()) else {
            warn!(user_id = user.id, "Password login attempted on federated-only account");
            return Err(ApiError::InvalidCredentials(
                "Invalid email or password".to_string(),
            ));
        };

        if !verify_password_blocking(password.to_string(), hash).await? {
            warn!(user_id = user.id, "Password login failed");
            return Err(ApiError::InvalidCredentials(
                "Invalid email or password".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;
        let (token, recent_id) = self.open_session(&mut tx, user.id).await?;
        tx.commit().await?;

        info!(
            user_id = user.id,
            email = %safe_email_log(&user.email),
            recent_id = recent_id,
            "User logged in"
        );

        Ok(LoginOutcome {
            user,
            token,
            recent_id,
        })
    }

    /// Finishes an authorization-code login.
    ///
    /// Provider calls run first; every database write then happens in one
    /// transaction, so any failure leaves no partial account, token or chat.
    pub async fn complete_oauth_login(
        &self,
        provider: &dyn IdentityProvider,
        code: &str,
    ) -> Result<LoginOutcome, ApiError> {
        let token = provider.exchange_code(code).await.map_err(|e| {
            warn!(error = %e, provider = provider.name(), "OAuth code exchange failed");
            ApiError::Upstream(e.to_string())
        })?;

        let profile = provider.fetch_profile(&token).await.map_err(|e| {
            warn!(error = %e, provider = provider.name(), "OAuth profile fetch failed");
            ApiError::Upstream(e.to_string())
        })?;

        let token_json = serde_json::to_string(&token)
            .map_err(|e| ApiError::InternalServer(format!("token serialization failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let user = Self::resolve_federated_user(&mut tx, provider.name(), &profile).await?;
        store::upsert_oauth_token(
            &mut tx,
            provider.name(),
            &profile.provider_user_id,
            &token_json,
            user.id,
        )
        .await?;
        let (session_token, recent_id) = self.open_session(&mut tx, user.id).await?;

        tx.commit().await?;

        info!(
            user_id = user.id,
            email = %safe_email_log(&user.email),
            provider = provider.name(),
            recent_id = recent_id,
            "User logged in via OAuth"
        );

        Ok(LoginOutcome {
            user,
            token: session_token,
            recent_id,
        })
    }

    /// Existing account by email, then by provider identity, else a new one
    async fn resolve_federated_user(
        conn: &mut SqliteConnection,
        provider: &str,
        profile: &OAuthProfile,
    ) -> Result<User, ApiError> {
        if let Some(user) = store::find_user_by_email(conn, &profile.email).await? {
            if user.provider_id.is_none() {
                store::link_provider(
                    conn,
                    user.id,
                    provider,
                    &profile.provider_user_id,
                    profile.picture.as_deref(),
                )
                .await?;
            }
            return Ok(user);
        }

        if let Some(user) =
            store::find_user_by_provider(conn, provider, &profile.provider_user_id).await?
        {
            return Ok(user);
        }

        store::create_federated_user(
            conn,
            &profile.email,
            profile.name.as_deref(),
            profile.picture.as_deref(),
            provider,
            &profile.provider_user_id,
        )
        .await
    }

    /// Auth session row, signed token and the chat the user lands in
    async fn open_session(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<(String, i64), ApiError> {
        let ttl = self.session_ttl();
        let auth_session = store::create_auth_session(conn, user_id, ttl).await?;
        debug!(
            user_id = user_id,
            expires_at = %auth_session.expires_at,
            "Auth session opened"
        );
        let token = issue_token(&self.config.jwt_secret, user_id, &auth_session.id, ttl)?;
        let chat = chat_store::create_session(conn, user_id, DEFAULT_CHAT_TITLE).await?;

        Ok((token, chat.recent_id))
    }

    /// Resolves a session token to its user; revoked or expired sessions fail
    pub async fn authenticate(&self, token: &str) -> Result<Authenticated, ApiError> {
        let claims = decode_token(&self.config.jwt_secret, token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| ApiError::Unauthorized("invalid token".to_string()))?;

        let mut conn = self.db.acquire().await?;

        let session = store::find_active_auth_session(&mut conn, &claims.sid)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| {
                debug!(user_id = user_id, "Session revoked or expired");
                ApiError::Unauthorized("session expired".to_string())
            })?;

        let user = store::find_user_by_id(&mut conn, user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = user_id, "Authentication failed: user not found in database");
                ApiError::Unauthorized("user not found".to_string())
            })?;

        Ok(Authenticated {
            user,
            session_id: session.id,
        })
    }

    pub async fn logout(&self, session_id: &str) -> Result<(), ApiError> {
        let mut conn = self.db.acquire().await?;
        if store::delete_auth_session(&mut conn, session_id).await? {
            info!("User logged out");
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
