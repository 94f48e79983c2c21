// src/main.rs
use axum::{
    extract::Extension,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use dotenv::dotenv;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod chats;
mod common;
mod logging_middleware;
mod services;
mod site;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::{AppConfig, AppState};
use services::{CompletionClient, GeminiService, GoogleService, IdentityProvider};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = Arc::new(AppConfig::from_env());

    if config.jwt_secret == "replace_with_strong_secret" {
        warn!("JWT_SECRET is not set; using the built-in development secret");
    }

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    // Run database migrations
    common::migrations::run_migrations(&pool, config.reset_db).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let completion: Arc<dyn CompletionClient> = Arc::new(GeminiService::new(config.ai.clone()));
    info!(model = %config.ai.model, "GeminiService initialized");
    if config.ai.api_key.is_none() {
        warn!("API_KEY is not set; chat replies will carry an error message");
    }

    let identity_provider: Option<Arc<dyn IdentityProvider>> = match &config.google {
        Some(google) => {
            info!("GoogleService initialized");
            Some(Arc::new(GoogleService::new(google.clone())))
        }
        None => {
            warn!("Google OAuth credentials not set; Google login disabled");
            None
        }
    };

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let shared = Arc::new(AppState {
        db: pool,
        config: config.clone(),
        completion,
        identity_provider,
    });

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .route("/health", get(health))
        // ====================================================================
        // PUBLIC PAGES (welcome, about, contact)
        // ====================================================================
        .merge(site::site_routes())
        // ====================================================================
        // AUTHENTICATION ROUTES (password, Google OAuth, logout)
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // CHAT ROUTES (messages, sessions, titles)
        // ====================================================================
        .merge(chats::chats_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        // Add request/response body logging in debug mode
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
}
