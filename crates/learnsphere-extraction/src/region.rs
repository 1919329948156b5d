use learnsphere_utils::error::ParseError;

/// Return the trimmed text between the first `opener` and the first `closer`
/// that follows it.
///
/// # Errors
///
/// - `DelimiterNotFound` when the opener is missing, or no closer exists anywhere
/// - `OrderViolation` when the closer appears only before the opener
pub fn extract_delimited(text: &str, opener: &str, closer: &str) -> Result<String, ParseError> {
    let open_at = text
        .find(opener)
        .ok_or_else(|| ParseError::DelimiterNotFound {
            marker: opener.to_string(),
        })?;
    let body_start = open_at + opener.len();

    match text[body_start..].find(closer) {
        Some(len) => Ok(text[body_start..body_start + len].trim().to_string()),
        None if text[..open_at].contains(closer) => Err(ParseError::OrderViolation {
            opener: opener.to_string(),
            closer: closer.to_string(),
        }),
        None => Err(ParseError::DelimiterNotFound {
            marker: closer.to_string(),
        }),
    }
}
