//! Authentication handlers

use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{
    GoogleLandingParams, LoginPageParams, LoginRequest, LoginResponse, OAuthCallbackParams,
    SignupRequest, SignupResponse,
};
use super::session::{
    clear_oauth_state, clear_session, oauth_state_cookie, session_cookie, OAUTH_STATE_COOKIE,
};
use crate::common::{escape_html, safe_email_log, ApiError, AppState};

const GOOGLE_LOGIN_FAILED: &str = "/login?error=google";

/// GET /login
pub async fn login_page(Query(params): Query<LoginPageParams>) -> Html<String> {
    let flash = match params.error.as_deref() {
        Some("google") => Some("Google sign-in failed. Please try again."),
        Some(_) => Some("Sign-in failed. Please try again."),
        None => None,
    };
    Html(render_login_page(flash))
}

/// POST /login
///
/// # Request Body
/// ```json
/// { "email": "alice@gmail.com", "password": "..." }
/// ```
///
/// # Response
/// ```json
/// { "success": true, "message": "Login successful", "recent_id": 12 }
/// ```
/// The session token is set as an HttpOnly `session` cookie.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let outcome = state
        .auth_service()
        .login(input.email.as_deref(), input.password.as_deref())
        .await
        .map_err(|e| match e {
            // Unknown email and wrong password look the same to the client
            ApiError::NotFound(_) => {
                ApiError::InvalidCredentials("Invalid email or password".to_string())
            }
            other => other,
        })?;

    info!(
        user_id = outcome.user.id,
        email = %safe_email_log(&outcome.user.email),
        "Session cookie issued"
    );
    let jar = jar.add(session_cookie(outcome.token, state.config.cookie_secure));

    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            recent_id: outcome.recent_id,
        }),
    ))
}

/// GET /signup
pub async fn signup_page() -> Html<String> {
    Html(render_signup_page())
}

/// POST /signup
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let user = state
        .auth_service()
        .signup(
            input.email.as_deref(),
            input.password.as_deref(),
            input.name.as_deref(),
        )
        .await?;

    info!(user_id = user.id, email = %safe_email_log(&user.email), "Signup completed");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "User created successfully".to_string(),
        }),
    ))
}

/// GET /logout
/// Revokes the server-side session (if any) and clears the cookie
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    authed: Option<AuthedUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    if let Some(authed) = authed {
        state.auth_service().logout(&authed.session_id).await?;
        info!(user_id = authed.id, "Session revoked");
    }

    Ok((clear_session(jar), Redirect::to("/login")))
}

/// GET /login/google - Start Google OAuth flow
/// Redirects the browser to Google's authorization page
pub async fn google_login_start(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    let Some(provider) = state.identity_provider.as_ref() else {
        warn!("Google login requested but OAuth is not configured");
        return Redirect::to(GOOGLE_LOGIN_FAILED).into_response();
    };

    let csrf_state = random_state();
    let auth_url = provider.authorization_url(&csrf_state);
    let jar = jar.add(oauth_state_cookie(csrf_state, state.config.cookie_secure));

    info!(provider = provider.name(), "Redirecting to OAuth provider");
    (jar, Redirect::to(&auth_url)).into_response()
}

/// GET /login/google/authorized - OAuth callback
///
/// Success lands on `/handle_google_login?recent_id=<id>`; any failure lands
/// on `/login?error=google`.
pub async fn google_login_callback(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<OAuthCallbackParams>,
) -> (CookieJar, Redirect) {
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let jar = clear_oauth_state(jar);

    if let Some(err) = params.error.as_deref() {
        warn!(oauth_error = %err, "OAuth provider returned error");
        return (jar, Redirect::to(GOOGLE_LOGIN_FAILED));
    }

    match (&expected_state, &params.state) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => {
            warn!(
                has_cookie = expected_state.is_some(),
                has_param = params.state.is_some(),
                "OAuth state mismatch"
            );
            return (jar, Redirect::to(GOOGLE_LOGIN_FAILED));
        }
    }

    let (Some(provider), Some(code)) = (state.identity_provider.as_ref(), params.code.as_deref())
    else {
        warn!("OAuth callback without provider or authorization code");
        return (jar, Redirect::to(GOOGLE_LOGIN_FAILED));
    };

    match state
        .auth_service()
        .complete_oauth_login(provider.as_ref(), code)
        .await
    {
        Ok(outcome) => {
            info!(
                user_id = outcome.user.id,
                email = %safe_email_log(&outcome.user.email),
                "Session cookie issued after Google login"
            );
            let jar = jar.add(session_cookie(outcome.token, state.config.cookie_secure));
            let target = format!("/handle_google_login?recent_id={}", outcome.recent_id);
            (jar, Redirect::to(&target))
        }
        Err(e) => {
            error!(error = %e, "OAuth login failed");
            (jar, Redirect::to(GOOGLE_LOGIN_FAILED))
        }
    }
}

/// GET /handle_google_login
/// Stores the new chat id client-side and forwards to `/chat`
pub async fn google_login_landing(Query(params): Query<GoogleLandingParams>) -> Html<String> {
    let recent_id = params
        .recent_id
        .map(|id| id.to_string())
        .unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Signing in</title></head>
<body>
    <p>Signing you in...</p>
    <script>
        const recentId = "{recent_id}";
        if (recentId) sessionStorage.setItem("recent_id", recentId);
        window.location.replace("/chat");
    </script>
</body>
</html>"#
    ))
}

fn random_state() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn render_login_page(flash: Option<&str>) -> String {
    let flash_html = flash
        .map(|msg| format!(r#"<p class="flash">{}</p>"#, escape_html(msg)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Log in</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 360px; margin: 60px auto; }}
        input {{ display: block; width: 100%; margin: 8px 0; padding: 8px; }}
        .flash {{ background: #fee; border: 1px solid #fcc; padding: 8px; }}
    </style>
</head>
<body>
    <h1>Log in</h1>
    {flash_html}
    <p id="error" class="flash" hidden></p>
    <input id="email" type="email" placeholder="Email">
    <input id="password" type="password" placeholder="Password">
    <button onclick="login()">Log in</button>
    <p><a href="/login/google">Continue with Google</a></p>
    <p>No account? <a href="/signup">Sign up</a></p>
    <script>
        async function login() {{
            const body = {{ email: document.getElementById("email").value, password: document.getElementById("password").value }};
            const r = await fetch("/login", {{ method: "POST", headers: {{ "Content-Type": "application/json" }}, body: JSON.stringify(body) }});
            const data = await r.json();
            if (r.ok && data.success) {{
                sessionStorage.setItem("recent_id", data.recent_id);
                window.location.href = "/chat";
            }} else {{
                const e = document.getElementById("error");
                e.textContent = data.error || "Login failed";
                e.hidden = false;
            }}
        }}
    </script>
</body>
</html>"#
    )
}

fn render_signup_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
    <title>Sign up</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 360px; margin: 60px auto; }
        input { display: block; width: 100%; margin: 8px 0; padding: 8px; }
        .flash { background: #fee; border: 1px solid #fcc; padding: 8px; }
    </style>
</head>
<body>
    <h1>Sign up</h1>
    <p id="error" class="flash" hidden></p>
    <input id="name" type="text" placeholder="Name">
    <input id="email" type="email" placeholder="Email">
    <input id="password" type="password" placeholder="Password (8+ characters)">
    <button onclick="signup()">Create account</button>
    <p>Already registered? <a href="/login">Log in</a></p>
    <script>
        async function signup() {
            const body = {
                name: document.getElementById("name").value,
                email: document.getElementById("email").value,
                password: document.getElementById("password").value
            };
            const r = await fetch("/signup", { method: "POST", headers: { "Content-Type": "application/json" }, body: JSON.stringify(body) });
            const data = await r.json();
            if (r.ok && data.success) {
                window.location.href = "/login";
            } else {
                const e = document.getElementById("error");
                e.textContent = data.error || "Signup failed";
                e.hidden = false;
            }
        }
    </script>
</body>
</html>"#
        .to_string()
}
