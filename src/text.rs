use std::sync::LazyLock;

use regex::Regex;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

/// Collapse whitespace runs to a single space and trim. Case is preserved.
pub fn clean_ws(s: &str) -> String {
    WS_RE.replace_all(s.trim(), " ").trim().to_string()
}

/// Comparison key used everywhere two pieces of text are judged "the same":
/// lowercase, anything outside `[a-z0-9]` becomes a space, whitespace collapsed.
pub fn normalize(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    let stripped = NON_ALNUM_RE.replace_all(&lowered, " ");
    WS_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Split a display name into (first token, remaining tokens).
pub fn split_name(full_name: &str) -> (String, String) {
    let cleaned = clean_ws(full_name);
    match cleaned.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.to_string()),
        None => (cleaned, String::new()),
    }
}
