//! Quoting and escaping for Nix strings and attribute keys
//!
//! Attribute keys are dotted paths (`networking.firewall.enable`). A key is left
//! bare when every segment is a valid identifier, quoted per segment when only
//! some segments need it (`a."12".c`), and quoted as a whole when splitting on
//! dots would change its meaning (`"127.0.0.1"`, `"key with space"`).
//!
//! Quoting is idempotent: feeding an already quoted key back in yields the same
//! text.

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_'-]*$").unwrap());

/// Words that cannot appear as bare attribute names.
const KEYWORDS: &[&str] = &[
    "assert", "else", "if", "in", "inherit", "let", "or", "rec", "then", "with",
];

/// Whether `segment` can be written as a bare attribute name.
pub fn is_identifier(segment: &str) -> bool {
    IDENTIFIER.is_match(segment) && !KEYWORDS.contains(&segment)
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Escape text for a double-quoted Nix string (without the surrounding quotes).
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse of [`escape_string`].
fn unescape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Render `text` as a double-quoted Nix string.
pub fn quote_string(text: &str) -> String {
    format!("\"{}\"", escape_string(text))
}

/// Escape text for the body of an indented (`''`) string.
///
/// `''` becomes `'''`. Every `${` becomes `${"$"}{`, which evaluates to a literal
/// `${`; this form never puts a quote in front of the marker, so text such as
/// `PS1='${x}` cannot merge into a `'''` escape.
pub fn escape_indented(text: &str) -> String {
    text.replace("''", "'''").replace("${", "${\"$\"}{")
}

/// If `key` is exactly one quoted segment, return its inner text.
fn single_quoted_inner(key: &str) -> Option<&str> {
    if key.len() < 2 || !key.starts_with('"') {
        return None;
    }
    let bytes = key.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => {
                return if i == bytes.len() - 1 {
                    Some(&key[1..i])
                } else {
                    None
                };
            }
            _ => i += 1,
        }
    }
    None
}

/// Split a key on dots that are not inside quotes.
fn split_segments(key: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in key.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                segments.push(&key[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&key[start..]);
    segments
}

/// Quote an attribute key for output.
pub fn quote_key(key: &str) -> String {
    if let Some(inner) = single_quoted_inner(key) {
        return quote_string(&unescape_string(inner));
    }

    if key.starts_with('.') || key.ends_with('.') {
        return quote_string(key);
    }

    let segments = split_segments(key);
    let is_quoted = |s: &str| single_quoted_inner(s).is_some();

    let has_invalid_chars = segments
        .iter()
        .any(|s| !is_quoted(s) && !s.chars().all(is_key_char));
    // A quoted first segment never counts as a leading digit.
    let leading_digit = segments
        .first()
        .is_some_and(|s| !is_quoted(s) && s.starts_with(|c: char| c.is_ascii_digit()));

    if has_invalid_chars || leading_digit {
        return quote_string(key);
    }

    segments
        .iter()
        .map(|s| {
            if is_quoted(s) || is_identifier(s) {
                s.to_string()
            } else {
                quote_string(s)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
