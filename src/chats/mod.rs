//! # Chats Module
//!
//! Chat sessions ("recent chats") and their messages:
//! - Chat store queries over `recent_chats` and `chat_messages`
//! - Chat flow: post a message, get an AI reply, load history
//! - Session management: create, rename, delete
//! - AI-derived chat titles

pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;
pub mod validators;


pub use routes::chats_routes;
