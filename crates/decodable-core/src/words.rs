//! Word tokenizing for HTML-bearing text.
//!
//! Word boundaries are whitespace-driven; punctuation is stripped only where
//! it touches whitespace or the ends of the text, so contractions and
//! hyphenated words survive intact. Leading and trailing hyphens are stripped
//! along with other edge punctuation.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::pattern;

/// Break markup (`<br>`, `<br/>`, `<br />`, `<br></br>`, with attributes) and
/// CR/LF line endings.
pub(crate) static BREAK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\b[^>]*>(?:\s*</br\s*>)?|</br\s*>|\r\n|\r|\n").expect("valid regex")
});

/// Tags that start or end a block of text; words never run across them.
static BLOCK_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|li|ul|ol|dl|dt|dd|h[1-6]|table|thead|tbody|tr|td|th|blockquote|pre|section|article|header|footer|aside|figure|figcaption|hr)\b[^>]*>",
    )
    .expect("valid regex")
});

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Edge punctuation when no letters are protected.
static EDGE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| edge_punctuation_regex("\\p{P}").expect("valid regex"));

/// Runs that separate words: separators, real control characters, zero-width
/// space, directional marks and isolates. ZWJ/ZWNJ are deliberately absent.
static WORD_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Z}\p{Cc}\x{200B}\x{200E}\x{200F}\x{2066}-\x{2069}]+").expect("valid regex")
});

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{N}\p{P}]+$").expect("valid regex"));

fn edge_punctuation_regex(punct: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"^{punct}+|{punct}+$|\s{punct}+|{punct}+\s"))
}

/// Punctuation pattern that leaves the caller's letters alone.
///
/// Unicode calls `'` punctuation, but a language may use it as a letter.
fn punctuation_class(letters: &str) -> String {
    let members: String = letters
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<HashSet<_>>()
        .into_iter()
        .map(pattern::class_member)
        .collect();
    if members.is_empty() {
        "\\p{P}".to_string()
    } else {
        format!("[\\p{{P}}--[{members}]]")
    }
}

/// Replace break markup, block tags and line endings with a space, drop the
/// remaining (inline) tags, then decode entities.
///
/// Entities are decoded after tags are gone so `&lt;b&gt;` stays text.
/// Non-breaking spaces become plain spaces.
pub(crate) fn html_to_plain(text: &str) -> String {
    let text = BREAK_PATTERN.replace_all(text, " ");
    let text = BLOCK_TAG_PATTERN.replace_all(&text, " ");
    let text = TAG_PATTERN.replace_all(&text, "");
    html_escape::decode_html_entities(&text).replace('\u{A0}', " ")
}

/// Split HTML-bearing text into lowercase words, in order.
///
/// `letters` lists characters that belong to the language's alphabet even if
/// Unicode classifies them as punctuation.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn get_words(text: &str, letters: Option<&str>) -> Vec<String> {
    let lowered = html_to_plain(text).to_lowercase();

    let stripped = match letters {
        Some(letters) if !letters.trim().is_empty() => {
            match edge_punctuation_regex(&punctuation_class(letters)) {
                Ok(re) => re.replace_all(&lowered, " ").into_owned(),
                Err(e) => {
                    tracing::warn!(error = %e, "letters do not form a usable pattern; ignoring them");
                    EDGE_PUNCTUATION.replace_all(&lowered, " ").into_owned()
                }
            }
        }
        _ => EDGE_PUNCTUATION.replace_all(&lowered, " ").into_owned(),
    };

    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    WORD_SEPARATORS
        .split(trimmed)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`get_words`], keeping only the first occurrence of each word.
pub fn unique_words(text: &str, letters: Option<&str>) -> Vec<String> {
    dedup_in_order(get_words(text, letters))
}

pub(crate) fn dedup_in_order(words: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Whether a token is made only of numerals and punctuation.
///
/// Works for any numeral system Unicode knows about (e.g. Devanagari digits).
pub fn is_numeric(token: &str) -> bool {
    NUMERIC.is_match(token)
}
