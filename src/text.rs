//! Character-aware string helpers.

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Keep the first `max_chars` characters of `text`, appending [`ELLIPSIS`]
/// when anything was cut.
#[must_use]
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &text[..byte_idx]),
        None => text.to_string(),
    }
}
