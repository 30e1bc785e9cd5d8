//! Channel reference normalization.
//!
//! Users paste channels as `@name`, `name`, `t.me/name` or full
//! `https://t.me/name` links. The backend wants the bare username.

const LINK_PREFIXES: [&str; 4] = ["https://t.me/", "http://t.me/", "t.me/", "telegram.me/"];

/// Bare username for one pasted reference, or `None` if nothing usable remains.
#[must_use]
pub fn normalize_channel(raw: &str) -> Option<String> {
    let mut name = raw.trim();
    for prefix in LINK_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest;
            break;
        }
    }
    let name = name.trim_start_matches('@');
    // Drop trailing post ids or query strings: `name/123`, `name?start=x`.
    let name = name.split(['/', '?']).next().unwrap_or_default().trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

/// Normalize a batch, dropping unusable entries and duplicates while keeping
/// first-seen order.
#[must_use]
pub fn normalize_channels<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw.iter().filter_map(|r| normalize_channel(r.as_ref())) {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
#[path = "channels_test.rs"]
mod tests;
