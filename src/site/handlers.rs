//! Public page handlers

use axum::{
    extract::{Form, Query},
    response::{Html, Redirect},
};
use tracing::{info, warn};

use super::models::{ContactForm, ContactPageParams, WelcomeParams};
use super::validators::{ContactInput, ContactValidator};
use crate::common::{escape_html, safe_email_log, Validator};

const CONTACT_SENT: &str = "/?flash=contact_sent";

/// GET /
pub async fn welcome_page(Query(params): Query<WelcomeParams>) -> Html<String> {
    let flash = match params.flash.as_deref() {
        Some("contact_sent") => Some("Thanks for your message!"),
        _ => None,
    };
    Html(render_welcome_page(flash))
}

/// GET /about
pub async fn about_page() -> Html<String> {
    Html(render_about_page())
}

/// GET /contact
pub async fn contact_page(Query(params): Query<ContactPageParams>) -> Html<String> {
    let flash = params.error.as_deref().map(|field| match field {
        "name" => "Please enter your name.",
        "email" => "Please enter a valid email address.",
        "message" => "Please enter a message.",
        _ => "Something went wrong. Please try again.",
    });
    Html(render_contact_page(flash))
}

/// POST /contact
///
/// Urlencoded `name`, `email` and `message`. Valid submissions are logged and
/// redirect to `/` with a thank-you flash; invalid ones go back to `/contact`
/// naming the first field that failed.
pub async fn submit_contact(Form(form): Form<ContactForm>) -> Redirect {
    let input = ContactInput {
        name: form.name.as_deref().map(str::trim).unwrap_or_default(),
        email: form.email.as_deref().map(str::trim).unwrap_or_default(),
        message: form.message.as_deref().map(str::trim).unwrap_or_default(),
    };

    let result = ContactValidator.validate(&input);
    if let Some(first) = result.errors.first() {
        warn!(field = %first.field, "Contact form rejected");
        return Redirect::to(&format!("/contact?error={}", first.field));
    }

    info!(
        email = %safe_email_log(input.email),
        message_chars = input.message.chars().count(),
        "Contact message received"
    );
    Redirect::to(CONTACT_SENT)
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 640px; margin: 60px auto; }}
        nav a {{ margin-right: 12px; }}
        input, textarea {{ display: block; width: 100%; margin: 8px 0; padding: 8px; }}
        .flash {{ background: #eef; border: 1px solid #ccf; padding: 8px; }}
    </style>
</head>
<body>
    <nav><a href="/">Home</a><a href="/about">About</a><a href="/contact">Contact</a><a href="/chat">Chat</a></nav>
{body}
</body>
</html>"#
    )
}

fn flash_html(flash: Option<&str>) -> String {
    flash
        .map(|msg| format!(r#"<p class="flash">{}</p>"#, escape_html(msg)))
        .unwrap_or_default()
}

fn render_welcome_page(flash: Option<&str>) -> String {
    let body = format!(
        r#"    <h1>Welcome to Chatbot</h1>
    {}
    <p>Chat with an AI assistant and pick up any conversation where you left it.</p>
    <p><a href="/login">Log in</a> or <a href="/signup">create an account</a> to start.</p>"#,
        flash_html(flash)
    );
    page("Welcome", &body)
}

fn render_about_page() -> String {
    page(
        "About",
        r#"    <h1>About</h1>
    <p>Chatbot keeps your conversations with a Gemini-backed assistant.
    Each chat gets a short title suggested from its first answer.</p>"#,
    )
}

fn render_contact_page(flash: Option<&str>) -> String {
    let body = format!(
        r#"    <h1>Contact</h1>
    {}
    <form method="post" action="/contact">
        <input name="name" placeholder="Name">
        <input name="email" type="email" placeholder="Email">
        <textarea name="message" rows="6" placeholder="Message"></textarea>
        <button type="submit">Send</button>
    </form>"#,
        flash_html(flash)
    );
    page("Contact", &body)
}
