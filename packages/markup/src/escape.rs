//! Text and attribute escaping for serialized markup

use std::borrow::Cow;

/// Escape character data
///
/// Only markup-significant characters and `U+00A0` are replaced; everything
/// else, non-ASCII included, is written as is.
pub fn escape_text(input: &str) -> Cow<'_, str> {
    escape(input, false)
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(input: &str) -> Cow<'_, str> {
    escape(input, true)
}

fn escape(input: &str, attribute: bool) -> Cow<'_, str> {
    let needs_escape = input
        .chars()
        .any(|c| matches!(c, '&' | '\u{a0}') || (!attribute && matches!(c, '<' | '>')) || (attribute && c == '"'));
    if !needs_escape {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
