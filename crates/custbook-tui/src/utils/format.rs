/// Truncate a string to at most `max_len` characters, adding an ellipsis if cut
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Last `max_len` characters of a string.
///
/// Text inputs show the end of the value so the cursor stays visible.
pub fn tail(s: &str, max_len: usize) -> &str {
    let count = s.chars().count();
    if count <= max_len {
        return s;
    }
    let skip = count - max_len;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}
