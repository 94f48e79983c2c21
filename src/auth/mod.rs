//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Email/password signup and login (argon2 hashes)
//! - Google OAuth login
//! - Server-side auth sessions named by a signed JWT cookie
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;
pub mod session;
pub mod store;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use routes::auth_routes;
