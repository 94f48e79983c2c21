// src/common/config.rs
//! Runtime configuration read from the environment (and `.env` via dotenv)

use std::env;
use std::time::Duration;

pub const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    /// Adds the `Secure` attribute to session cookies
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub reset_db: bool,
    pub google: Option<GoogleOAuthConfig>,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://chatbot.db".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let jwt_secret = env::var("JWT_SECRET")
            .or_else(|_| env::var("SECRET_KEY"))
            .unwrap_or_else(|_| "replace_with_strong_secret".to_string());
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|h| (1..=24 * 365).contains(h))
            .unwrap_or(24);
        let cookie_secure = env_flag("COOKIE_SECURE");
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let reset_db = env_flag("RESET_DB");

        // Both credentials are required; a half-configured provider is treated as absent
        let google = match (
            env::var("GOOGLE_CLIENT_ID").or_else(|_| env::var("CLIENT_ID")),
            env::var("GOOGLE_CLIENT_SECRET").or_else(|_| env::var("CLIENT_SECRET")),
        ) {
            (Ok(client_id), Ok(client_secret))
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                Some(GoogleOAuthConfig {
                    client_id,
                    client_secret,
                    redirect_uri: env::var("GOOGLE_OAUTH_REDIRECT_URI").unwrap_or_else(|_| {
                        format!("http://localhost:{}/login/google/authorized", port)
                    }),
                })
            }
            _ => None,
        };

        let ai = AiConfig {
            api_key: env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            model: env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
            base_url: env::var("AI_BASE_URL").unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                env::var("AI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .filter(|s| *s > 0)
                    .unwrap_or(30),
            ),
        };

        Self {
            database_url,
            port,
            jwt_secret,
            session_ttl_hours,
            cookie_secure,
            cors_origins,
            reset_db,
            google,
            ai,
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
impl AppConfig {
    /// Configuration used by in-crate tests
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 8080,
            jwt_secret: "test_secret_key".to_string(),
            session_ttl_hours: 24,
            cookie_secure: false,
            cors_origins: vec![],
            reset_db: false,
            google: None,
            ai: AiConfig {
                api_key: None,
                model: DEFAULT_AI_MODEL.to_string(),
                base_url: DEFAULT_AI_BASE_URL.to_string(),
                timeout: Duration::from_secs(5),
            },
        }
    }
}
