//! URL-safe identifiers derived from post titles and tag names.
//!
//! A slug only ever contains `[a-z0-9]` separated by single hyphens and is at
//! most [`MAX_SLUG_LEN`] bytes long. Uniqueness is resolved by the services:
//! they walk [`candidate`] for attempts `0, 1, 2, ...` until the repository
//! reports a free value.

use std::sync::LazyLock;

use regex::Regex;

pub(crate) const MAX_SLUG_LEN: usize = 100;

/// Upper bound for the `-N` suffix search before giving up with a conflict.
pub(crate) const MAX_SLUG_ATTEMPTS: u32 = 1000;

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug regex must compile"));

/// Lowercases `text`, collapses every run of non `[a-z0-9]` characters into a
/// single hyphen and trims hyphens at both ends. May return an empty string.
pub(crate) fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let replaced = NON_ALNUM_RUN.replace_all(&lowered, "-");
    truncate_at_boundary(replaced.trim_matches('-'), MAX_SLUG_LEN)
}

/// Like [`slugify`], but never empty: titles made only of punctuation fall
/// back to `fallback`.
pub(crate) fn derive_base(text: &str, fallback: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// `attempt == 0` is the base itself, otherwise `base-N` with the base
/// shortened so the result still fits in [`MAX_SLUG_LEN`].
pub(crate) fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        return base.to_string();
    }

    let suffix = format!("-{attempt}");
    let room = MAX_SLUG_LEN.saturating_sub(suffix.len());
    let base = truncate_at_boundary(base, room);
    format!("{base}{suffix}")
}

pub(crate) fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

// Input is ASCII at this point, so byte offsets are char offsets.
fn truncate_at_boundary(slug: &str, max_len: usize) -> String {
    if slug.len() <= max_len {
        return slug.to_string();
    }

    let cut = &slug[..max_len];
    let mid_word = slug.as_bytes()[max_len] != b'-' && !cut.ends_with('-');
    let cut = match cut.rfind('-') {
        Some(pos) if mid_word => &cut[..pos],
        _ => cut,
    };
    cut.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::{MAX_SLUG_LEN, candidate, derive_base, is_valid_slug, slugify};

    #[test]
    fn slugify_lowercases_and_joins_words() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust & Tokio: 2024 edition!! "), "rust-tokio-2024-edition");
    }

    #[test]
    fn slugify_collapses_runs_and_trims_hyphens() {
        assert_eq!(slugify("--a   b__c--"), "a-b-c");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Déjà Vu"), "caf-d-j-vu");
        assert_eq!(slugify("Привет мир"), "");
    }

    #[test]
    fn slugify_truncates_on_word_boundary() {
        let title = format!("{} tail", "word ".repeat(30));
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(slug.ends_with("word"));
        assert!(is_valid_slug(&slug));
    }

    #[test]
    fn slugify_hard_cuts_a_single_long_word() {
        let slug = slugify(&"a".repeat(150));
        assert_eq!(slug.len(), MAX_SLUG_LEN);
    }

    #[test]
    fn derived_slugs_are_always_valid() {
        let titles = [
            "Hello World",
            "  --Leading and trailing--  ",
            "Numbers 123 and symbols #$%",
            "MiXeD CaSe___under_scores",
            "emoji 🚀 rocket",
            &"long title segment ".repeat(20),
        ];

        for title in titles {
            let slug = derive_base(title, "post");
            assert!(is_valid_slug(&slug), "invalid slug {slug:?} for {title:?}");
        }
    }

    #[test]
    fn derive_base_falls_back_when_empty() {
        assert_eq!(derive_base("???", "post"), "post");
        assert_eq!(derive_base("News", "tag"), "news");
    }

    #[test]
    fn candidate_appends_numeric_suffix() {
        assert_eq!(candidate("hello-world", 0), "hello-world");
        assert_eq!(candidate("hello-world", 1), "hello-world-1");
        assert_eq!(candidate("hello-world", 12), "hello-world-12");
    }

    #[test]
    fn candidate_keeps_suffixed_slug_within_limit() {
        let base = slugify(&"segment ".repeat(20));
        let slug = candidate(&base, 7);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(slug.ends_with("-7"));
        assert!(is_valid_slug(&slug));
    }

    #[test]
    fn is_valid_slug_rejects_malformed_values() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-a"));
        assert!(!is_valid_slug("a-"));
        assert!(!is_valid_slug("a--b"));
        assert!(!is_valid_slug("A-b"));
        assert!(is_valid_slug("a-b-1"));
    }
}
