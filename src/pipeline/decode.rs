use serde_json::Value;

/// Which repair strategy produced the decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Strict,
    CommaRepair,
    TruncationRepair,
    Failed,
}

impl DecodeStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            DecodeStrategy::Strict => "strict",
            DecodeStrategy::CommaRepair => "comma-repair",
            DecodeStrategy::TruncationRepair => "truncation-repair",
            DecodeStrategy::Failed => "failed",
        }
    }
}

/// Scraped blobs nest JSON inside JSON strings; don't chase that forever.
const MAX_UNWRAP_DEPTH: usize = 3;

/// Best-effort decode of an arbitrary text blob. Strategies are attempted
/// in order and the first success wins; nothing here ever panics or errors.
/// `None` means the caller should fall back to pattern extraction.
pub fn decode(text: &str) -> (Option<Value>, DecodeStrategy) {
    decode_at_depth(text, 0)
}

fn decode_at_depth(text: &str, depth: usize) -> (Option<Value>, DecodeStrategy) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return (None, DecodeStrategy::Failed);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return (Some(unwrap_nested(value, depth)), DecodeStrategy::Strict);
    }

    let repaired = strip_trailing_commas(trimmed);
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        return (Some(unwrap_nested(value, depth)), DecodeStrategy::CommaRepair);
    }

    if let Some(closed) = close_truncated(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(&closed) {
            return (Some(unwrap_nested(value, depth)), DecodeStrategy::TruncationRepair);
        }
    }

    (None, DecodeStrategy::Failed)
}

/// Unwrap one level of string-encoded JSON: a bare JSON string whose content
/// is itself JSON, or the `{"raw_content": "..."}` wrapper the scrapers emit.
/// On inner decode failure the outer value is kept; `raw_content_text` lets
/// the caller pattern-match the inner text instead.
fn unwrap_nested(value: Value, depth: usize) -> Value {
    if depth >= MAX_UNWRAP_DEPTH {
        return value;
    }

    let inner_text = match &value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("raw_content").and_then(|v| v.as_str()).map(String::from),
        _ => None,
    };

    if let Some(text) = inner_text {
        // Only replace the outer value when the inner text is actually
        // structured; a plain prose string stays as-is.
        if text.trim_start().starts_with(['{', '[']) {
            if let (Some(inner), _) = decode_at_depth(&text, depth + 1) {
                return inner;
            }
        }
    }

    value
}

/// The inner text of a `raw_content` wrapper whose content never decoded.
pub fn raw_content_text(value: &Value) -> Option<&str> {
    value.as_object()?.get("raw_content")?.as_str()
}

/// Remove trailing commas that sit (outside string literals) directly before
/// a closing brace or bracket.
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Repair a blob cut off mid-stream: cut just after the last complete
/// container close seen outside a string, then append closers for every
/// container still open at that point.
fn close_truncated(text: &str) -> Option<String> {
    let mut in_string = false;
    let mut escaped = false;
    let mut depth = 0i32;
    let mut last_close: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                last_close = Some(i + c.len_utf8());
            }
            _ => {}
        }
    }

    // Nothing ever closed, or the text already ends balanced: no repair.
    let cut = last_close?;
    if cut == text.len() && depth == 0 {
        return None;
    }

    let prefix = &text[..cut];
    let mut open: Vec<char> = Vec::new();
    in_string = false;
    escaped = false;
    for c in prefix.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => open.push(c),
            '}' | ']' => {
                open.pop();
            }
            _ => {}
        }
    }

    let mut repaired = prefix.to_string();
    for opener in open.iter().rev() {
        repaired.push(if *opener == '{' { '}' } else { ']' });
    }
    Some(repaired)
}

// ── Tests ──
