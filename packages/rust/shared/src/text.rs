//! Small string helpers used by more than one crate.

/// Longest prefix of `text` with at most `max` characters.
///
/// Cuts on a char boundary, so multi-byte text never panics.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
