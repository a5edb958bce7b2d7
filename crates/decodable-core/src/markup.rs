//! Wrapping classified words in marker spans.
//!
//! Only text between tags is touched: the HTML is split on `<`, and
//! everything up to the matching `>` is copied through unchanged. Character
//! entities are never matched, and a word only matches as a whole word.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::classify::StoryCheckResults;
use crate::pattern;

/// Class for words that could not be classified as readable.
pub const NOT_FOUND_CLASS: &str = "word-not-found";
/// Class for sight words.
pub const SIGHT_WORD_CLASS: &str = "sight-word";
/// Class for words that can be sounded out.
pub const POSSIBLE_WORD_CLASS: &str = "possible-word";

static WORD_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{M}\p{N}\p{Pc}]$").expect("valid regex"));

fn is_word_char(ch: char) -> bool {
    let mut buf = [0u8; 4];
    WORD_CHAR.is_match(ch.encode_utf8(&mut buf))
}

/// Wrap every whole-word, case-insensitive occurrence of `words` in a
/// `<span class="...">`.
pub fn wrap_words(html: &str, words: &[String], class: &str) -> String {
    let classes: Vec<(&str, &str)> = words.iter().map(|w| (w.as_str(), class)).collect();
    wrap_classified(html, &classes)
}

/// Mark up a story with the outcome of a classification.
///
/// Unreadable words, sight words and possible words each get their own
/// class. Focus and cumulative words are left alone, as are numerals.
#[tracing::instrument(skip_all, fields(text_len = html.len()))]
pub fn highlight(html: &str, results: &StoryCheckResults) -> String {
    let unreadable = results.unreadable_words();
    let classes: Vec<(&str, &str)> = unreadable
        .iter()
        .map(|w| (w.as_str(), NOT_FOUND_CLASS))
        .chain(results.sight_words.iter().map(|w| (w.as_str(), SIGHT_WORD_CLASS)))
        .chain(
            results
                .possible_words
                .iter()
                .map(|w| (w.as_str(), POSSIBLE_WORD_CLASS)),
        )
        .collect();
    wrap_classified(html, &classes)
}

/// Wrap each word with its class. The first class given for a word wins.
fn wrap_classified(html: &str, classes: &[(&str, &str)]) -> String {
    let mut lookup: HashMap<String, &str> = HashMap::new();
    for &(word, class) in classes {
        lookup.entry(word.to_lowercase()).or_insert(class);
    }

    let Some(alternatives) = pattern::alternation(lookup.keys().map(String::as_str)) else {
        return html.to_string();
    };
    // Entities come first so that `&amp;` is consumed whole and skipped.
    let matcher = match Regex::new(&format!("(?i)&#?[0-9a-z]+;|{alternatives}")) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(error = %e, "word list does not form a usable pattern");
            return html.to_string();
        }
    };

    let mut out = String::with_capacity(html.len() * 2);
    let mut inside_tag = false;
    for (i, part) in html.split('<').enumerate() {
        if i > 0 {
            out.push('<');
            inside_tag = true;
        }
        let text = if inside_tag {
            match part.find('>') {
                Some(end) => {
                    out.push_str(&part[..=end]);
                    inside_tag = false;
                    &part[end + 1..]
                }
                None => {
                    out.push_str(part);
                    continue;
                }
            }
        } else {
            part
        };
        wrap_text(text, &matcher, &lookup, &mut out);
    }
    out
}

fn wrap_text(text: &str, matcher: &Regex, lookup: &HashMap<String, &str>, out: &mut String) {
    let mut last = 0;
    for m in matcher.find_iter(text) {
        let found = m.as_str();
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
            continue;
        }
        let Some(class) = lookup.get(&found.to_lowercase()) else {
            // An entity.
            continue;
        };
        out.push_str(&text[last..m.start()]);
        out.push_str("<span class=\"");
        out.push_str(class);
        out.push_str("\">");
        out.push_str(found);
        out.push_str("</span>");
        last = m.end();
    }
    out.push_str(&text[last..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn wraps_text_but_not_attributes() {
        let html = "<p title=\"cat\">The cat sat.</p>";
        let wrapped = wrap_words(html, &strings(&["cat"]), POSSIBLE_WORD_CLASS);
        assert_eq!(
            wrapped,
            "<p title=\"cat\">The <span class=\"possible-word\">cat</span> sat.</p>"
        );
    }

    #[test]
    fn matching_ignores_case_and_keeps_original_text() {
        let wrapped = wrap_words("Cat and CAT", &strings(&["cat"]), "x");
        assert_eq!(
            wrapped,
            "<span class=\"x\">Cat</span> and <span class=\"x\">CAT</span>"
        );
    }

    #[test]
    fn only_whole_words_match() {
        let wrapped = wrap_words("category, cat's cat", &strings(&["cat"]), "x");
        assert_eq!(
            wrapped,
            "category, <span class=\"x\">cat</span>'s <span class=\"x\">cat</span>"
        );
    }

    #[test]
    fn entities_are_left_alone() {
        let wrapped = wrap_words("&amp; amp&nbsp;", &strings(&["amp", "nbsp"]), "x");
        assert_eq!(wrapped, "&amp; <span class=\"x\">amp</span>&nbsp;");
    }

    #[test]
    fn special_characters_match_literally() {
        let wrapped = wrap_words("c++ axb a.b", &strings(&["c++", "a.b"]), "x");
        assert_eq!(
            wrapped,
            "<span class=\"x\">c++</span> axb <span class=\"x\">a.b</span>"
        );
    }

    #[test]
    fn empty_word_list_is_a_no_op() {
        let html = "<b>unchanged</b>";
        assert_eq!(wrap_words(html, &[], "x"), html);
    }

    #[test]
    fn highlight_uses_bucket_classes() {
        let results = StoryCheckResults {
            focus_words: strings(&["dog"]),
            possible_words: strings(&["sat"]),
            sight_words: strings(&["the"]),
            remaining_words: strings(&["mat", "3"]),
            ..StoryCheckResults::default()
        };
        let html = "<p>The dog sat on 3 mat.</p>";
        assert_eq!(
            highlight(html, &results),
            "<p><span class=\"sight-word\">The</span> dog \
             <span class=\"possible-word\">sat</span> on 3 \
             <span class=\"word-not-found\">mat</span>.</p>"
        );
    }
}
