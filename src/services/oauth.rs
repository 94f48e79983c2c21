// src/services/oauth.rs
//! OAuth2 identity provider collaborator types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed profile: {0}")]
    MalformedProfile(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Token issued by the provider's token endpoint.
///
/// Known fields are typed; anything provider-specific lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthTokenPayload {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Unix timestamp computed from `expires_in` when the token was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Identity returned by the provider's userinfo endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthProfile {
    pub provider_user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name stored in `users.provider` and `oauth.provider`
    fn name(&self) -> &str;

    /// URL the browser is redirected to, carrying the CSRF `state`
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a token
    async fn exchange_code(&self, code: &str) -> Result<OAuthTokenPayload, OAuthError>;

    /// Fetch the signed-in user's profile with the token from `exchange_code`
    async fn fetch_profile(&self, token: &OAuthTokenPayload) -> Result<OAuthProfile, OAuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_payload_keeps_unknown_fields() {
        let raw = serde_json::json!({
            "access_token": "ya29.token",
            "token_type": "Bearer",
            "expires_in": 3599,
            "scope": "openid email profile",
            "id_token": "eyJ.header.sig",
            "nonce_hint": "abc"
        });

        let payload: OAuthTokenPayload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.access_token, "ya29.token");
        assert_eq!(payload.expires_in, Some(3599));
        assert_eq!(payload.refresh_token, None);
        assert_eq!(
            payload.extra.get("nonce_hint"),
            Some(&serde_json::json!("abc"))
        );

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back["nonce_hint"], "abc");
        assert!(back.get("refresh_token").is_none());
    }
}
