//! Port name sanitization

use std::borrow::Cow;

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
///
/// Returns the input unchanged (borrowed) when it is already a valid name.
/// Each non-ASCII character becomes a single `_`.
pub fn sanitize_name(raw: &str) -> Cow<'_, str> {
    if raw.chars().all(is_name_char) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.chars()
            .map(|c| if is_name_char(c) { c } else { '_' })
            .collect(),
    )
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
