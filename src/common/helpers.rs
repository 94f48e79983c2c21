// Helper functions for safe logging and serialization

use chrono::Utc;
use serde::{Deserialize, Deserializer};

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            let first = parts[0].chars().next().unwrap_or('*');
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Format of every timestamp column.
///
/// Fixed-width microsecond precision keeps lexical order equal to time order,
/// so `ORDER BY timestamp` is chronological.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Current UTC time formatted with [`TIMESTAMP_FORMAT`]
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Escapes text interpolated into server-rendered HTML
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Deserializes an optional numeric id sent either as a JSON number or a string.
///
/// Browser clients keep `recent_id` in storage and send it back as a string.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(n)) => Ok(Some(n)),
        Some(RawId::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawId::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct WithId {
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        recent_id: Option<i64>,
    }

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@gmail.com"), "u***@gmail.com");
        assert_eq!(safe_email_log("a@b"), "***@***.***");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
        assert_eq!(safe_email_log("@gmail.com"), "***@***.***");
    }

    #[test]
    fn test_safe_token_log() {
        assert_eq!(safe_token_log("eyJhbGciOiJIUzI1NiJ9"), "eyJh...NiJ9");
        assert_eq!(safe_token_log("short"), "***");
    }

    #[test]
    fn test_now_timestamp_is_fixed_width() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), "2024-01-01 00:00:00.000000".len());
        assert!(now_timestamp() >= ts);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape_html("New Chat"), "New Chat");
    }

    #[test]
    fn test_deserialize_optional_id_accepts_numbers_and_strings() {
        let n: WithId = serde_json::from_str(r#"{"recent_id": 7}"#).unwrap();
        assert_eq!(n.recent_id, Some(7));

        let s: WithId = serde_json::from_str(r#"{"recent_id": "12"}"#).unwrap();
        assert_eq!(s.recent_id, Some(12));

        let missing: WithId = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.recent_id, None);

        let null: WithId = serde_json::from_str(r#"{"recent_id": null}"#).unwrap();
        assert_eq!(null.recent_id, None);

        assert!(serde_json::from_str::<WithId>(r#"{"recent_id": "abc"}"#).is_err());
    }
}
