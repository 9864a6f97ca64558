//! Shell-style `KEY=VALUE` files (`/etc/default/grub`, `os-release`)

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9_]+)\s*=\s*(.*?)\s*$").unwrap());

/// Parse assignments, ignoring comments and anything else. Matching outer
/// quotes are stripped from values.
pub fn parse_kv(text: &str) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    for line in text.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let Some(caps) = ASSIGNMENT.captures(line) else {
            continue;
        };
        out.insert(caps[1].to_string(), strip_quotes(&caps[2]).to_string());
    }
    out
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
