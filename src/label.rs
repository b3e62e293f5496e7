//! # Page Labels
//!
//! Turns raw extracted page text into a short label that is safe to use as
//! a sort key (and as a file name): punctuation removed, whitespace runs
//! collapsed to `_`, length capped.

use std::sync::LazyLock;

use regex::Regex;

/// Label used when a page has no extractable text.
pub const FALLBACK_LABEL: &str = "page";

/// Default cap on label length, in characters.
pub const DEFAULT_MAX_LABEL_LEN: usize = 50;

/// Anything that is not a letter, a number, `_` or whitespace. Combining
/// marks are not word characters here; superscripts and other numerics are.
/// The information separators U+001C..=U+001F count as whitespace.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_\s\x1C-\x1F]").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\x1C-\x1F]+").unwrap());

/// Whitespace as the label alphabet sees it.
fn is_label_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Sanitize `text` into a label of at most `max_len` characters.
///
/// Leading/trailing whitespace is stripped, every character that is not a
/// letter, number, underscore or whitespace is removed, and each remaining
/// whitespace run becomes a single underscore. Never fails; the result is
/// empty when `max_len` is 0 or nothing survives.
pub fn sanitize(text: &str, max_len: usize) -> String {
    let kept = NON_WORD.replace_all(text.trim_matches(is_label_space), "");
    let joined = WHITESPACE_RUN.replace_all(&kept, "_");
    joined.chars().take(max_len).collect()
}

/// Label for a page's extracted text, falling back to [`FALLBACK_LABEL`]
/// when the text is empty after stripping.
pub fn label_for(raw_text: &str, max_len: usize) -> String {
    let stripped = raw_text.trim_matches(is_label_space);
    if stripped.is_empty() {
        sanitize(FALLBACK_LABEL, max_len)
    } else {
        sanitize(stripped, max_len)
    }
}
