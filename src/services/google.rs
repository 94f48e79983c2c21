// src/services/google.rs
use crate::common::config::GoogleOAuthConfig;
use crate::common::helpers::safe_token_log;
use crate::services::oauth::{IdentityProvider, OAuthError, OAuthProfile, OAuthTokenPayload};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const SCOPES: [&str; 3] = ["openid", "email", "profile"];

#[derive(Debug, Deserialize)]
struct UserInfo {
    id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Google sign-in via the OAuth2 authorization-code flow
#[derive(Debug, Clone)]
pub struct GoogleService {
    config: GoogleOAuthConfig,
    client: Client,
}

impl GoogleService {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }
}

#[async_trait]
impl IdentityProvider for GoogleService {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> String {
        let scope_param = SCOPES.join(" ");

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=online",
            AUTHORIZATION_ENDPOINT,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scope_param),
            urlencoding::encode(state)
        );

        debug!("Generated Google OAuth authorization URL with scopes: {}", scope_param);
        auth_url
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthTokenPayload, OAuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(OAuthError::OAuthFailed(format!("HTTP {}", status)));
        }

        let mut token = response
            .json::<OAuthTokenPayload>()
            .await
            .map_err(|e| OAuthError::SerializationError(e.to_string()))?;

        if let Some(expires_in) = token.expires_in {
            token.expires_at = Some(Utc::now().timestamp() + expires_in);
        }

        info!(
            access_token = %safe_token_log(&token.access_token),
            has_refresh_token = token.refresh_token.is_some(),
            "Successfully exchanged authorization code for tokens"
        );
        Ok(token)
    }

    async fn fetch_profile(&self, token: &OAuthTokenPayload) -> Result<OAuthProfile, OAuthError> {
        let response = self
            .client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::RequestFailed(format!(
                "Failed to get user info: HTTP {}",
                response.status()
            )));
        }

        let user_info = response
            .json::<UserInfo>()
            .await
            .map_err(|e| OAuthError::SerializationError(e.to_string()))?;

        profile_from_user_info(user_info)
    }
}

fn profile_from_user_info(info: UserInfo) -> Result<OAuthProfile, OAuthError> {
    let provider_user_id = info
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| OAuthError::MalformedProfile("missing id".to_string()))?;
    let email = info
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| e.contains('@'))
        .ok_or_else(|| OAuthError::MalformedProfile("missing email".to_string()))?;

    Ok(OAuthProfile {
        provider_user_id,
        email,
        name: info.name.filter(|n| !n.trim().is_empty()),
        picture: info.picture.filter(|p| !p.trim().is_empty()),
    })
}
