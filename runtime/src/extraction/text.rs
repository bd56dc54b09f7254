//! Text, HTML snapshot and URL helpers shared by the extractors.

use url::Url;

/// Collapse every whitespace run to one space and trim both ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when the text carries no real content: after dropping hyphens and
/// en-dashes and trimming, fewer than ten characters remain.
pub fn is_placeholder_text(text: &str) -> bool {
    let stripped: String = text.chars().filter(|c| *c != '-' && *c != '–').collect();
    stripped.trim().chars().count() < 10
}

/// Cap a serialized node at `max` characters.
///
/// Returns the (possibly cut) snapshot and whether cutting happened.
pub fn truncate_html(html: &str, max: usize) -> (String, bool) {
    match html.char_indices().nth(max) {
        None => (html.to_string(), false),
        Some((byte_idx, _)) => (html[..byte_idx].to_string(), true),
    }
}

/// Resolve `link` against `base_url` with standard URL-join semantics.
///
/// Empty input or a join failure yields `None`.
pub fn make_absolute_url(base_url: &str, link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    match Url::parse(base_url) {
        Ok(base) => base.join(link).ok().map(|u| u.to_string()),
        Err(_) => Url::parse(link).ok().map(|u| u.to_string()),
    }
}

/// First `n` whitespace-separated words of `text`, joined by single spaces.
pub fn first_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

/// First `n` characters of `text`.
pub fn truncate_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
