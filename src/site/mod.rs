//! # Site Module
//!
//! Public pages that need no account:
//! - Welcome page with flash messages
//! - About page
//! - Contact form (validated, logged, then redirected with a flash)

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::site_routes;
