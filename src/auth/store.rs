//! Identity and session store: `users`, `oauth` and `auth_sessions` queries.
//!
//! Functions take `&mut SqliteConnection` so a login can run every step in
//! one transaction.

use chrono::{Duration, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::models::{AuthSession, User};
use crate::common::helpers::TIMESTAMP_FORMAT;
use crate::common::{now_timestamp, safe_email_log, ApiError};

pub async fn find_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                email = %safe_email_log(email),
                "Database error during user lookup by email"
            );
            ApiError::DatabaseError(e)
        })
}

pub async fn find_user_by_provider(
    conn: &mut SqliteConnection,
    provider: &str,
    provider_id: &str,
) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE provider = ? AND provider_id = ?")
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)
}

pub async fn find_user_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)
}

/// Creates a password account; `Conflict` when the email is taken
pub async fn create_local_user(
    conn: &mut SqliteConnection,
    email: &str,
    password_hash: &str,
    name: &str,
) -> Result<User, ApiError> {
    if find_user_by_email(conn, email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let now = now_timestamp();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_unique_violation(e, email))?;

    info!(
        user_id = user.id,
        email = %safe_email_log(email),
        "Local user account created"
    );
    Ok(user)
}

/// Creates an account for a first-time OAuth login
pub async fn create_federated_user(
    conn: &mut SqliteConnection,
    email: &str,
    name: Option<&str>,
    picture_url: Option<&str>,
    provider: &str,
    provider_id: &str,
) -> Result<User, ApiError> {
    let now = now_timestamp();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, name, provider, provider_id, profile_picture, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(email)
    .bind(name)
    .bind(provider)
    .bind(provider_id)
    .bind(picture_url)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_unique_violation(e, email))?;

    info!(
        user_id = user.id,
        email = %safe_email_log(email),
        provider = provider,
        "Federated user account created"
    );
    Ok(user)
}

/// Links an existing user to a provider identity they signed in with
pub async fn link_provider(
    conn: &mut SqliteConnection,
    user_id: i64,
    provider: &str,
    provider_id: &str,
    picture_url: Option<&str>,
) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE users SET provider = ?, provider_id = ?, profile_picture = COALESCE(?, profile_picture), updated_at = ? WHERE id = ?",
    )
    .bind(provider)
    .bind(provider_id)
    .bind(picture_url)
    .bind(now_timestamp())
    .bind(user_id)
    .execute(&mut *conn)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(())
}

/// Stores the provider token, replacing any token saved on an earlier login
pub async fn upsert_oauth_token(
    conn: &mut SqliteConnection,
    provider: &str,
    provider_user_id: &str,
    token: &str,
    user_id: i64,
) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO oauth (provider, provider_user_id, token, user_id)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(provider_user_id) DO UPDATE SET
            provider = excluded.provider,
            token = excluded.token,
            user_id = excluded.user_id
        "#,
    )
    .bind(provider)
    .bind(provider_user_id)
    .bind(token)
    .bind(user_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        error!(error = %e, provider = provider, user_id = user_id, "Failed to store OAuth token");
        ApiError::DatabaseError(e)
    })?;

    debug!(provider = provider, user_id = user_id, "OAuth token stored");
    Ok(())
}

/// Inserts a new session row after sweeping every expired one
pub async fn create_auth_session(
    conn: &mut SqliteConnection,
    user_id: i64,
    ttl: Duration,
) -> Result<AuthSession, ApiError> {
    let now = Utc::now();
    let swept = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= ?")
        .bind(now.format(TIMESTAMP_FORMAT).to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to sweep expired auth sessions");
            ApiError::DatabaseError(e)
        })?
        .rows_affected();
    if swept > 0 {
        debug!(swept = swept, "Expired auth sessions removed");
    }

    sqlx::query_as::<_, AuthSession>(
        "INSERT INTO auth_sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(now.format(TIMESTAMP_FORMAT).to_string())
    .bind((now + ttl).format(TIMESTAMP_FORMAT).to_string())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        error!(error = %e, user_id = user_id, "Failed to create auth session");
        ApiError::DatabaseError(e)
    })
}

/// The session row if it exists and has not expired
pub async fn find_active_auth_session(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<AuthSession>, ApiError> {
    sqlx::query_as::<_, AuthSession>("SELECT * FROM auth_sessions WHERE id = ? AND expires_at > ?")
        .bind(id)
        .bind(now_timestamp())
        .fetch_optional(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)
}

/// Returns `false` when there was no such session
pub async fn delete_auth_session(conn: &mut SqliteConnection, id: &str) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM auth_sessions WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(result.rows_affected() > 0)
}

fn map_unique_violation(e: sqlx::Error, email: &str) -> ApiError {
    let is_unique = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
    if is_unique {
        debug!(email = %safe_email_log(email), "Email already registered");
        ApiError::Conflict("Email already exists".to_string())
    } else {
        error!(error = %e, email = %safe_email_log(email), "Database error creating user");
        ApiError::DatabaseError(e)
    }
}
