//! JSON extraction for vendor responses.
//!
//! Backends occasionally wrap the object in a markdown fence or add a
//! sentence around it even when told not to.

/// Locate the JSON object in a vendor response.
///
/// Tries, in order:
/// 1. A fenced block (` ```json ` or bare ` ``` `) whose content starts with `{`
/// 2. The first balanced `{ ... }` span that parses as JSON
/// 3. The trimmed input unchanged, so the caller's decode error shows it
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(inner) = fenced_block(trimmed) {
        return inner;
    }

    if let Some(object) = find_json_object(trimmed) {
        return object;
    }

    trimmed
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip an optional language tag on the opening fence line.
    let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    let inner = body[..end].trim();
    inner.starts_with('{').then_some(inner)
}

fn find_json_object(text: &str) -> Option<&str> {
    text.match_indices('{').find_map(|(start, _)| {
        let candidate = balanced_object(&text[start..])?;
        serde_json::from_str::<serde_json::Value>(candidate)
            .is_ok()
            .then_some(candidate)
    })
}

/// Prefix of `text` up to the brace closing its leading `{`.
///
/// Braces inside JSON string literals (including escaped quotes) are ignored.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
