//! Shared helpers for providers and callers that surface backend errors

/// Keys this short are fully hidden
const MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY: usize = 8;

/// Characters kept at each end of a masked key
const KEY_MASK_VISIBLE_CHARS: usize = 4;

/// Substrings that make an error unfit for a chat reply
const SENSITIVE_PATTERNS: &[&str] = &[
    "api_key",
    "api-key",
    "apikey",
    "authorization",
    "bearer",
    "token",
    "secret",
    "password",
    "credential",
];

/// Hide the middle of an API key for logs and `Debug` output
///
/// # Examples
/// ```
/// use chatbro_llm::util::mask_api_key;
/// assert_eq!(mask_api_key("sk-1234567890abcdef"), "sk-1...cdef");
/// assert_eq!(mask_api_key("short"), "****");
/// ```
#[must_use]
pub fn mask_api_key(key: &str) -> String {
    if key.len() <= MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY || !key.is_ascii() {
        return "****".to_string();
    }
    format!(
        "{}...{}",
        &key[..KEY_MASK_VISIBLE_CHARS],
        &key[key.len() - KEY_MASK_VISIBLE_CHARS..]
    )
}

/// Error text safe to show a chat user
///
/// Anything mentioning credentials is replaced by a generic message.
#[must_use]
pub fn sanitize_error_for_user(error: &str) -> String {
    let lower = error.to_lowercase();

    for pattern in SENSITIVE_PATTERNS {
        if lower.contains(pattern) {
            return "An API error occurred. Please try again.".to_string();
        }
    }

    error.to_string()
}

/// Truncate to at most `max_bytes` without splitting a UTF-8 character
#[must_use]
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
