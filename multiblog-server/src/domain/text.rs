use std::sync::LazyLock;

use regex::Regex;

pub(crate) const EXCERPT_LEN: usize = 200;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("html tag regex must compile"));

/// Collapses every whitespace run into one space and trims the ends.
pub(crate) fn sanitize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain-text summary of `content`: markup stripped, whitespace collapsed,
/// cut to at most `max_chars` characters on a word boundary with `...`
/// appended when anything was dropped.
pub(crate) fn extract_excerpt(content: &str, max_chars: usize) -> String {
    let plain = sanitize_text(&HTML_TAG.replace_all(content, " "));
    if plain.chars().count() <= max_chars {
        return plain;
    }

    let cut_at = plain
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(plain.len());
    let head = &plain[..cut_at];
    let head = match head.rfind(' ') {
        Some(pos) if pos > 0 => &head[..pos],
        _ => head,
    };
    format!("{}...", head.trim_end())
}
