//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Signup validation and password storage
//! - Password login opening an auth session and a chat
//! - OAuth login with a stub identity provider
//! - Session tokens and logout
//! - The auth router end to end (status codes, cookies)

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::migrations::run_migrations;
    use crate::chats::chats_routes;
    use crate::common::{ApiError, AppConfig, AppState};
    use crate::services::completion::{CompletionClient, CompletionError};
    use crate::services::oauth::{IdentityProvider, OAuthError, OAuthProfile, OAuthTokenPayload};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::extract::Extension;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use super::super::models::User;
    use super::super::service::AuthService;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        run_migrations(&pool, false)
            .await
            .expect("Failed to run migrations");
        pool
    }

    fn auth(pool: &SqlitePool) -> AuthService {
        AuthService::new(pool.clone(), Arc::new(AppConfig::for_tests()))
    }

    async fn count(pool: &SqlitePool, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(pool)
            .await
            .expect("Failed to count rows")
    }

    async fn signup_alice(service: &AuthService) -> User {
        service
            .signup(Some("alice@gmail.com"), Some("password123"), Some("Alice"))
            .await
            .expect("Signup failed")
    }

    /// Identity provider returning a canned token and profile
    struct StubProvider {
        access_token: String,
        profile: Option<OAuthProfile>,
        fail_exchange: bool,
    }

    impl StubProvider {
        fn with_profile(access_token: &str, email: &str, provider_user_id: &str) -> Self {
            Self {
                access_token: access_token.to_string(),
                profile: Some(OAuthProfile {
                    provider_user_id: provider_user_id.to_string(),
                    email: email.to_string(),
                    name: Some("Google User".to_string()),
                    picture: Some("https://example.com/p.png".to_string()),
                }),
                fail_exchange: false,
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        fn name(&self) -> &str {
            "google"
        }

        fn authorization_url(&self, state: &str) -> String {
            format!("https://accounts.example.com/auth?state={}", state)
        }

        async fn exchange_code(&self, _code: &str) -> Result<OAuthTokenPayload, OAuthError> {
            if self.fail_exchange {
                return Err(OAuthError::OAuthFailed("invalid_grant".to_string()));
            }
            Ok(OAuthTokenPayload {
                access_token: self.access_token.clone(),
                token_type: Some("Bearer".to_string()),
                ..Default::default()
            })
        }

        async fn fetch_profile(
            &self,
            _token: &OAuthTokenPayload,
        ) -> Result<OAuthProfile, OAuthError> {
            self.profile
                .clone()
                .ok_or_else(|| OAuthError::MalformedProfile("missing email".to_string()))
        }
    }

    // ------------------------------------------------------------------
    // Signup
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_signup_stores_verifiable_hash() {
        let pool = test_pool().await;
        let service = auth(&pool);

        let user = signup_alice(&service).await;

        assert_eq!(user.email, "alice@gmail.com");
        assert_eq!(user.name.as_deref(), Some("Alice"));
        let hash = user.password_hash.as_deref().unwrap();
        assert_ne!(hash, "password123");
        assert!(password::verify_password("password123", hash));
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 1);
    }

    #[tokio::test]
    async fn test_signup_rejects_disallowed_domain() {
        let pool = test_pool().await;
        let service = auth(&pool);

        let result = service
            .signup(Some("alice@example.com"), Some("password123"), Some("Alice"))
            .await;

        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 0);
    }

    #[tokio::test]
    async fn test_signup_requires_all_fields() {
        let pool = test_pool().await;
        let service = auth(&pool);

        let result = service
            .signup(Some("alice@gmail.com"), None, Some("Alice"))
            .await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));

        let result = service
            .signup(Some("  "), Some("password123"), Some("Alice"))
            .await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_conflicts() {
        let pool = test_pool().await;
        let service = auth(&pool);
        signup_alice(&service).await;

        let result = service
            .signup(Some("Alice@Gmail.com"), Some("another-pass"), Some("Alice 2"))
            .await;

        assert!(matches!(result, Err(ApiError::Conflict(_))));
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 1);
    }

    // ------------------------------------------------------------------
    // Password login
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_creates_one_chat_and_session() {
        let pool = test_pool().await;
        let service = auth(&pool);
        let user = signup_alice(&service).await;

        let outcome = service
            .login(Some("alice@gmail.com"), Some("password123"))
            .await
            .unwrap();

        assert_eq!(outcome.user.id, user.id);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM recent_chats").await, 1);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM auth_sessions").await, 1);

        let title: String =
            sqlx::query_scalar("SELECT title FROM recent_chats WHERE recent_id = ?")
                .bind(outcome.recent_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(title, "New Chat");
    }

    #[tokio::test]
    async fn test_wrong_password_creates_nothing() {
        let pool = test_pool().await;
        let service = auth(&pool);
        signup_alice(&service).await;

        let result = service
            .login(Some("alice@gmail.com"), Some("wrong-password"))
            .await;

        assert!(matches!(result, Err(ApiError::InvalidCredentials(_))));
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM recent_chats").await, 0);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM auth_sessions").await, 0);
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_not_found() {
        let pool = test_pool().await;
        let service = auth(&pool);

        let result = service
            .login(Some("nobody@gmail.com"), Some("password123"))
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_login_missing_fields_is_invalid_input() {
        let pool = test_pool().await;
        let service = auth(&pool);

        let result = service.login(Some("alice@gmail.com"), None).await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_federated_account_cannot_use_password() {
        let pool = test_pool().await;
        let service = auth(&pool);
        let provider = StubProvider::with_profile("tok-1", "gina@gmail.com", "g-1");
        service
            .complete_oauth_login(&provider, "code")
            .await
            .unwrap();

        let result = service
            .login(Some("gina@gmail.com"), Some("password123"))
            .await;
        assert!(matches!(result, Err(ApiError::InvalidCredentials(_))));
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_token_authenticates_until_logout() {
        let pool = test_pool().await;
        let service = auth(&pool);
        let user = signup_alice(&service).await;
        let outcome = service
            .login(Some("alice@gmail.com"), Some("password123"))
            .await
            .unwrap();

        let authenticated = service.authenticate(&outcome.token).await.unwrap();
        assert_eq!(authenticated.user.id, user.id);

        service.logout(&authenticated.session_id).await.unwrap();

        assert!(matches!(
            service.authenticate(&outcome.token).await,
            Err(ApiError::Unauthorized(_))
        ));
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM auth_sessions").await, 0);
    }

    #[tokio::test]
    async fn test_token_claims_name_user_and_session() {
        let pool = test_pool().await;
        let service = auth(&pool);
        let user = signup_alice(&service).await;
        let outcome = service
            .login(Some("alice@gmail.com"), Some("password123"))
            .await
            .unwrap();

        let decoded = decode::<models::Claims>(
            &outcome.token,
            &DecodingKey::from_secret("test_secret_key".as_bytes()),
            &Validation::default(),
        )
        .expect("Failed to decode token");

        assert_eq!(decoded.claims.sub, user.id.to_string());
        let authenticated = service.authenticate(&outcome.token).await.unwrap();
        assert_eq!(decoded.claims.sid, authenticated.session_id);
    }

    #[tokio::test]
    async fn test_new_session_sweeps_expired_rows() {
        let pool = test_pool().await;
        let service = auth(&pool);
        let user = signup_alice(&service).await;

        sqlx::query(
            "INSERT INTO auth_sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind("stale-session")
        .bind(user.id)
        .bind("2020-01-01 00:00:00.000000")
        .bind("2020-01-02 00:00:00.000000")
        .execute(&pool)
        .await
        .unwrap();

        service
            .login(Some("alice@gmail.com"), Some("password123"))
            .await
            .unwrap();

        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM auth_sessions WHERE id = 'stale-session'").await,
            0
        );
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM auth_sessions").await, 1);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let pool = test_pool().await;
        let service = auth(&pool);

        assert!(matches!(
            service.authenticate("not-a-jwt").await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    // ------------------------------------------------------------------
    // OAuth login
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_oauth_first_login_creates_user_token_and_chat() {
        let pool = test_pool().await;
        let service = auth(&pool);
        let provider = StubProvider::with_profile("tok-1", "gina@gmail.com", "g-1");

        let outcome = service
            .complete_oauth_login(&provider, "code")
            .await
            .unwrap();

        assert_eq!(outcome.user.email, "gina@gmail.com");
        assert_eq!(outcome.user.provider.as_deref(), Some("google"));
        assert_eq!(outcome.user.provider_id.as_deref(), Some("g-1"));
        assert!(outcome.user.password_hash.is_none());
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 1);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM oauth").await, 1);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM recent_chats").await, 1);
        assert!(service.authenticate(&outcome.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_oauth_repeat_login_updates_token() {
        let pool = test_pool().await;
        let service = auth(&pool);

        let first = service
            .complete_oauth_login(
                &StubProvider::with_profile("tok-1", "gina@gmail.com", "g-1"),
                "code",
            )
            .await
            .unwrap();
        let second = service
            .complete_oauth_login(
                &StubProvider::with_profile("tok-2", "gina@gmail.com", "g-1"),
                "code",
            )
            .await
            .unwrap();

        assert_eq!(first.user.id, second.user.id);
        assert_ne!(first.recent_id, second.recent_id);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 1);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM oauth").await, 1);

        let stored: String = sqlx::query_scalar("SELECT token FROM oauth WHERE provider_user_id = ?")
            .bind("g-1")
            .fetch_one(&pool)
            .await
            .unwrap();
        let payload: OAuthTokenPayload = serde_json::from_str(&stored).unwrap();
        assert_eq!(payload.access_token, "tok-2");
    }

    #[tokio::test]
    async fn test_oauth_links_existing_local_account() {
        let pool = test_pool().await;
        let service = auth(&pool);
        let user = signup_alice(&service).await;

        let outcome = service
            .complete_oauth_login(
                &StubProvider::with_profile("tok-1", "alice@gmail.com", "g-9"),
                "code",
            )
            .await
            .unwrap();

        assert_eq!(outcome.user.id, user.id);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 1);

        // Password login keeps working after linking
        assert!(service
            .login(Some("alice@gmail.com"), Some("password123"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_oauth_failure_leaves_no_rows() {
        let pool = test_pool().await;
        let service = auth(&pool);

        let failing = StubProvider {
            access_token: String::new(),
            profile: None,
            fail_exchange: true,
        };
        assert!(matches!(
            service.complete_oauth_login(&failing, "bad").await,
            Err(ApiError::Upstream(_))
        ));

        let no_profile = StubProvider {
            access_token: "tok".to_string(),
            profile: None,
            fail_exchange: false,
        };
        assert!(matches!(
            service.complete_oauth_login(&no_profile, "code").await,
            Err(ApiError::Upstream(_))
        ));

        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 0);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM oauth").await, 0);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM recent_chats").await, 0);
    }

    // ------------------------------------------------------------------
    // HTTP routes
    // ------------------------------------------------------------------

    /// Completion client for router tests that never reach the AI
    struct NoReplyClient;

    #[async_trait]
    impl CompletionClient for NoReplyClient {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::RequestFailed("not configured".to_string()))
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    fn app(pool: &SqlitePool) -> Router {
        let state = AppState::for_tests(pool.clone(), Arc::new(NoReplyClient));
        auth_routes()
            .merge(chats_routes())
            .layer(Extension(Arc::new(state)))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    }

    #[tokio::test]
    async fn test_signup_route_returns_created() {
        let pool = test_pool().await;

        let response = app(&pool)
            .oneshot(post_json(
                "/signup",
                serde_json::json!({
                    "email": "alice@gmail.com",
                    "password": "password123",
                    "name": "Alice"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 1);
    }

    #[tokio::test]
    async fn test_login_route_unknown_email_is_unauthorized() {
        let pool = test_pool().await;

        let response = app(&pool)
            .oneshot(post_json(
                "/login",
                serde_json::json!({ "email": "nobody@gmail.com", "password": "password123" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid email or password");
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_login_route_wrong_password_is_unauthorized() {
        let pool = test_pool().await;
        signup_alice(&auth(&pool)).await;

        let response = app(&pool)
            .oneshot(post_json(
                "/login",
                serde_json::json!({ "email": "alice@gmail.com", "password": "wrong-password" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_login_route_sets_session_cookie() {
        let pool = test_pool().await;
        signup_alice(&auth(&pool)).await;

        let response = app(&pool)
            .oneshot(post_json(
                "/login",
                serde_json::json!({ "email": "alice@gmail.com", "password": "password123" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("Missing Set-Cookie header")
            .to_string();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));

        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert!(body["recent_id"].as_i64().is_some());

        // The cookie value is a usable session token
        let token = cookie
            .trim_start_matches("session=")
            .split(';')
            .next()
            .unwrap();
        assert!(auth(&pool).authenticate(token).await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_route_revokes_session() {
        let pool = test_pool().await;
        let service = auth(&pool);
        signup_alice(&service).await;
        let outcome = service
            .login(Some("alice@gmail.com"), Some("password123"))
            .await
            .unwrap();

        let response = app(&pool)
            .oneshot(
                Request::builder()
                    .uri("/logout")
                    .header(header::COOKIE, format!("session={}", outcome.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM auth_sessions").await, 0);
    }
}
