use serde_json::Value;

/// Best-effort extraction of the first balanced JSON object or array
/// embedded in `text`.
///
/// On success the span is parsed and reserialized (compact form); when no
/// balanced span exists or the span fails to parse, the input is returned
/// unchanged. Never fails — this is a heuristic, not a validator.
pub fn extract_json(text: &str) -> String {
    let Some(span) = first_balanced_span(text) else {
        return text.to_string();
    };

    match serde_json::from_str::<Value>(span) {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

/// Locate the first `{...}` or `[...]` span with balanced delimiters,
/// respecting JSON string literals and escapes.
fn first_balanced_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == b'{' || b == b'[')?;

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
