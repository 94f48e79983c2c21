//! Authentication routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET|POST /login` - Login page / password login
/// - `GET|POST /signup` - Signup page / account creation
/// - `GET /logout` - Revoke the session and clear the cookie
/// - `GET /login/google` - Start Google OAuth
/// - `GET /login/google/authorized` - Google OAuth callback
/// - `GET /handle_google_login` - Post-OAuth landing page
pub fn auth_routes() -> Router {
    Router::new()
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/signup", get(handlers::signup_page).post(handlers::signup))
        .route("/logout", get(handlers::logout))
        .route("/login/google", get(handlers::google_login_start))
        .route(
            "/login/google/authorized",
            get(handlers::google_login_callback),
        )
        .route("/handle_google_login", get(handlers::google_login_landing))
}
