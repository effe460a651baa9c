use std::borrow::Cow;

/// Truncates a string to at most `max_chars` characters.
///
/// Counts Unicode scalar values, not bytes or display columns, and cuts hard:
/// no ellipsis is appended and word boundaries are ignored. The cut always
/// lands on a character boundary, so multi-byte text never panics.
///
/// Returns `Cow::Borrowed` when the string already fits.
///
/// # Examples
///
/// ```
/// use feedboard::util::truncate_chars;
///
/// assert_eq!(truncate_chars("Hello World", 5), "Hello");
/// assert_eq!(truncate_chars("Short", 10), "Short");
/// assert_eq!(truncate_chars("日本語テスト", 3), "日本語");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((byte_end, _)) => Cow::Owned(s[..byte_end].to_string()),
        None => Cow::Borrowed(s),
    }
}

/// Returns the trimmed string when it has any non-whitespace content.
///
/// Feeds routinely carry empty or whitespace-only titles and links; callers
/// treat those the same as an absent field.
pub fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|t| !t.is_empty())
}
