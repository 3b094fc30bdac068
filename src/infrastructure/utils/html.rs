//! HTML entity escaping for user-submitted text.

/// Escapes the five HTML special characters, quotes included, so stored
/// comment text is inert when rendered. Already-escaped input is escaped
/// again; unescaping is the renderer's concern.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
