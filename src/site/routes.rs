use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the public site router
///
/// # Routes
/// - `GET /` - Welcome page
/// - `GET /about` - About page
/// - `GET|POST /contact` - Contact form / form submission
pub fn site_routes() -> Router {
    Router::new()
        .route("/", get(handlers::welcome_page))
        .route("/about", get(handlers::about_page))
        .route(
            "/contact",
            get(handlers::contact_page).post(handlers::submit_contact),
        )
}
