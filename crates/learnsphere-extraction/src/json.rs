use serde_json::{Map, Value};

use learnsphere_utils::error::ParseError;

/// Extract the outermost JSON object embedded in `text`.
///
/// Each `{` is tried as the start of a candidate. The candidate ends at its
/// matching `}`; braces inside string literals (including escaped quotes) do
/// not count. Of the candidates that parse as JSON objects, the longest is
/// returned, the earliest on a tie. Prose with stray braces or small example
/// objects around the payload is tolerated.
///
/// # Errors
///
/// Returns `ParseError::MalformedJson` when no balanced candidate exists or
/// none of the candidates parses as an object.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, ParseError> {
    let mut last_failure: Option<String> = None;
    let mut best: Option<(usize, Map<String, Value>)> = None;

    for (start, _) in text.match_indices('{') {
        let Some(end) = matching_brace(text, start) else {
            continue;
        };

        let len = end - start + 1;
        if best.as_ref().is_some_and(|(best_len, _)| *best_len >= len) {
            continue;
        }

        match serde_json::from_str::<Value>(&text[start..=end]) {
            Ok(Value::Object(map)) => best = Some((len, map)),
            Ok(_) => {}
            Err(e) => last_failure = Some(e.to_string()),
        }
    }

    if let Some((_, map)) = best {
        return Ok(map);
    }

    Err(ParseError::MalformedJson {
        reason: last_failure.unwrap_or_else(|| "no balanced JSON object found".to_string()),
    })
}

/// Read a string field from an extracted object.
///
/// # Errors
///
/// Returns `ParseError::MissingField` when the field is absent or not a string.
pub fn extract_string_field(object: &Map<String, Value>, field: &str) -> Result<String, ParseError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ParseError::MissingField {
            field: field.to_string(),
        })
}

/// Byte offset of the `}` closing the object that opens at `start`.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }

    None
}
