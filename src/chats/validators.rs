use crate::common::error::ApiError;

/// `recent_chats.title` is VARCHAR(20)
pub const TITLE_MAX_CHARS: usize = 20;

/// Messages only need visible content; length is unbounded
pub fn validate_message_content(content: &str) -> Result<(), ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "Message cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validate a chat title and return it trimmed
pub fn validate_title(title: &str) -> Result<String, ApiError> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput("Title cannot be empty".to_string()));
    }

    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(ApiError::InvalidInput(format!(
            "Title exceeds maximum length of {} characters",
            TITLE_MAX_CHARS
        )));
    }

    Ok(trimmed.to_string())
}

/// Whether a completion result is usable as a title
pub fn is_acceptable_title(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.chars().count() <= TITLE_MAX_CHARS
        && !candidate.eq_ignore_ascii_case("error")
}
