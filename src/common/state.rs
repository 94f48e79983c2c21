// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::service::AuthService;
use crate::chats::service::ChatService;
use crate::common::config::AppConfig;
use crate::services::{CompletionClient, IdentityProvider};

/// Application context built once in `main` and handed to every handler
/// through an axum `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub completion: Arc<dyn CompletionClient>,
    /// `None` when Google credentials are not configured
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl AppState {
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.db.clone(), self.config.clone())
    }

    pub fn chat_service(&self) -> ChatService {
        ChatService::new(
            self.db.clone(),
            self.completion.clone(),
            self.config.ai.timeout,
        )
    }
}

#[cfg(test)]
impl AppState {
    /// State over a test pool with no identity provider configured
    pub fn for_tests(db: SqlitePool, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            db,
            config: Arc::new(AppConfig::for_tests()),
            completion,
            identity_provider: None,
        }
    }
}
