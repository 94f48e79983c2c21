// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if they don't exist. With `reset` set, every table is
/// dropped first.
pub async fn run_migrations(pool: &SqlitePool, reset: bool) -> Result<(), sqlx::Error> {
    if reset {
        warn!("RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("Dropped old tables");
    } else {
        info!("Skipping table drop (RESET_DB not set). Tables will be created if they don't exist.");
    }

    create_identity_tables(pool).await?;
    create_chat_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed successfully");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Drop tables in reverse dependency order
    let tables = ["chat_messages", "recent_chats", "auth_sessions", "oauth", "users"];

    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    Ok(())
}

async fn create_identity_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email VARCHAR(255) UNIQUE NOT NULL,
            password_hash VARCHAR(255),
            name VARCHAR(255),
            provider VARCHAR(50),
            provider_id VARCHAR(255),
            profile_picture TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // OAuth token associations
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS oauth (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            provider VARCHAR(50) NOT NULL,
            provider_user_id VARCHAR(255) UNIQUE NOT NULL,
            token TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Server-side login sessions referenced by the session cookie
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS auth_sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_chat_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recent_chats (
            recent_id INTEGER PRIMARY KEY AUTOINCREMENT,
            recent_time TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            title VARCHAR(20) NOT NULL DEFAULT 'New Chat',
            FOREIGN KEY(user_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recent_id INTEGER NOT NULL,
            sender VARCHAR(50) NOT NULL CHECK (sender IN ('user', 'ai')),
            message TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            FOREIGN KEY(recent_id) REFERENCES recent_chats(recent_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_users_provider ON users(provider, provider_id)",
        "CREATE INDEX IF NOT EXISTS idx_auth_sessions_user ON auth_sessions(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_recent_chats_user ON recent_chats(user_id, recent_time)",
        "CREATE INDEX IF NOT EXISTS idx_chat_messages_recent ON chat_messages(recent_id, timestamp, id)",
    ];

    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
