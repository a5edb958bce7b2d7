//! Decodability classification of a story.
//!
//! Every distinct word of the story lands in exactly one of five buckets,
//! decided by ordered passes. Each pass only sees what earlier passes left:
//!
//! 1. focus words (the words being taught now)
//! 2. cumulative words (previously taught vocabulary)
//! 3. possible words (spelled entirely with known graphemes; simple GPC
//!    notation only)
//! 4. sight words
//! 5. remaining words
//!
//! Matches within a pass are ordered longest first, ties in story order.

use std::collections::HashSet;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::gpc;
use crate::language::{LanguageData, WordEntry};
use crate::pattern;
use crate::words;

/// Inputs for one classification run.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoryCheck<'a> {
    /// Words currently being taught.
    pub focus_words: &'a [String],
    /// Previously taught vocabulary.
    pub cumulative_words: &'a [WordEntry],
    /// Graphemes the reader knows.
    pub known_graphemes: &'a [String],
    /// The story, possibly with markup.
    pub story_html: &'a str,
    /// Sight words as free text.
    pub sight_words: &'a str,
}

/// Outcome of classifying a story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoryCheckResults {
    /// Story words that are focus words.
    pub focus_words: Vec<String>,
    /// Story words from the cumulative vocabulary.
    pub cumulative_words: Vec<String>,
    /// Story words that can be sounded out with known graphemes.
    pub possible_words: Vec<String>,
    /// Story words that are sight words.
    pub sight_words: Vec<String>,
    /// Everything else, numerals included.
    pub remaining_words: Vec<String>,
    /// Word occurrences in the first four buckets.
    pub readable_words: usize,
    /// Word occurrences, numerals excluded.
    pub total_words: usize,
}

impl StoryCheckResults {
    /// Numeric tokens among the remaining words, in order.
    pub fn numbers(&self) -> Vec<String> {
        self.remaining_words
            .iter()
            .filter(|w| words::is_numeric(w))
            .cloned()
            .collect()
    }

    /// Remaining words that are not numerals.
    pub fn unreadable_words(&self) -> Vec<String> {
        self.remaining_words
            .iter()
            .filter(|w| !words::is_numeric(w))
            .cloned()
            .collect()
    }
}

/// Classify every word of a story against the given vocabulary.
///
/// The model supplies the grapheme catalog (for digraph-aware matching),
/// the tokenizer's protected letters and the GPC notation flag.
#[tracing::instrument(skip_all, fields(text_len = check.story_html.len()))]
pub fn check_story(model: &LanguageData, check: &StoryCheck<'_>) -> StoryCheckResults {
    let letters = model.letters();
    let letters = (!letters.is_empty()).then_some(letters.as_str());

    let tokens = words::get_words(check.story_html, letters);
    let mut remaining = words::dedup_in_order(tokens.clone());

    let focus: HashSet<String> = check.focus_words.iter().map(|w| w.to_lowercase()).collect();
    let focus_words = take_matching(&mut remaining, |w| focus.contains(w));

    let cumulative: HashSet<&str> = check.cumulative_words.iter().map(|w| w.name.as_str()).collect();
    let cumulative_words = take_matching(&mut remaining, |w| cumulative.contains(w));

    let possible_words = if model.use_full_gpc_notation {
        Vec::new()
    } else {
        match PossibleWords::new(model, check.known_graphemes) {
            Some(matcher) => take_matching(&mut remaining, |w| matcher.is_possible(w)),
            None => Vec::new(),
        }
    };

    let sight: HashSet<String> = words::get_words(check.sight_words, letters).into_iter().collect();
    let sight_words = take_matching(&mut remaining, |w| sight.contains(w));

    let readable: HashSet<&str> = focus_words
        .iter()
        .chain(&cumulative_words)
        .chain(&possible_words)
        .chain(&sight_words)
        .map(String::as_str)
        .collect();
    let readable_words = tokens.iter().filter(|t| readable.contains(t.as_str())).count();
    let total_words = tokens.iter().filter(|t| !words::is_numeric(t)).count();

    let results = StoryCheckResults {
        focus_words,
        cumulative_words,
        possible_words,
        sight_words,
        remaining_words: remaining,
        readable_words,
        total_words,
    };
    tracing::debug!(
        readable = results.readable_words,
        total = results.total_words,
        remaining = results.remaining_words.len(),
        "classified story"
    );
    results
}

/// Move the words matching `pred` out of `pool`, longest first.
fn take_matching(pool: &mut Vec<String>, pred: impl Fn(&str) -> bool) -> Vec<String> {
    let (mut taken, kept): (Vec<String>, Vec<String>) =
        std::mem::take(pool).into_iter().partition(|w| pred(w));
    *pool = kept;
    taken.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    taken
}

/// Tests whether a word can be sounded out with the known graphemes.
struct PossibleWords {
    /// Whole word is runs of known graphemes, optionally followed by punctuation.
    shape: Regex,
    catalog: Vec<String>,
    known: HashSet<String>,
}

impl PossibleWords {
    fn new(model: &LanguageData, known_graphemes: &[String]) -> Option<Self> {
        let known: HashSet<String> = known_graphemes
            .iter()
            .map(|g| g.to_lowercase())
            .chain(model.always_match.iter().cloned())
            .collect();
        let alternatives = pattern::alternation(known.iter().map(String::as_str))?;

        let shape = match Regex::new(&format!(r"^(?:(?:{alternatives})+\p{{P}}*)+$")) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!(error = %e, "known graphemes do not form a usable pattern");
                return None;
            }
        };

        Some(Self {
            shape,
            catalog: model.graphemes_desc(),
            known,
        })
    }

    fn is_possible(&self, word: &str) -> bool {
        if !self.shape.is_match(word) {
            return false;
        }
        // Letter-by-letter matching is fooled by multi-letter graphemes: with
        // only "a" known, "aa" matches the pattern but is the grapheme "aa".
        gpc::segment(word, &self.catalog)
            .iter()
            .all(|unit| self.known.contains(unit) || !self.catalog.contains(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index;
    use crate::language::GraphemeUnit;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn model(graphemes: &[&str]) -> LanguageData {
        let mut model = LanguageData::new("Test", "x-test");
        for g in graphemes {
            model.add_grapheme(GraphemeUnit::new(*g));
        }
        index::reindex(&mut model);
        model
    }

    fn all_buckets(results: &StoryCheckResults) -> Vec<&String> {
        results
            .focus_words
            .iter()
            .chain(&results.cumulative_words)
            .chain(&results.possible_words)
            .chain(&results.sight_words)
            .chain(&results.remaining_words)
            .collect()
    }

    #[test]
    fn digraphs_are_respected() {
        let model = model(&["a", "aa", "b", "c", "ch", "d", "h", "n"]);
        let known = strings(&["a", "b", "ch", "d", "n"]);
        let check = StoryCheck {
            known_graphemes: &known,
            story_html: "a bad cad chad ch,ad had d,ach d,ac",
            ..StoryCheck::default()
        };
        let results = check_story(&model, &check);
        assert_eq!(results.possible_words.len(), 5);
        assert_eq!(results.remaining_words.len(), 3);
        assert_eq!(results.remaining_words, strings(&["cad", "had", "d,ac"]));
        assert_eq!(results.readable_words, 5);
        assert_eq!(results.total_words, 8);
    }

    #[test]
    fn paragraphs_and_entities_yield_passage_words() {
        let model = model(&["a", "c", "d", "g", "m", "o", "s", "t"]);
        let known = strings(&["a", "c", "t", "s", "d", "o", "g"]);
        let html = "<p>A cat sat.</p><p>A dog sat.</p><p>Tom &amp; Sam</p>";
        let check = StoryCheck {
            known_graphemes: &known,
            story_html: html,
            ..StoryCheck::default()
        };
        let results = check_story(&model, &check);

        let mut possible = results.possible_words.clone();
        possible.sort();
        assert_eq!(possible, strings(&["a", "cat", "dog", "sat"]));
        let mut remaining = results.remaining_words.clone();
        remaining.sort();
        assert_eq!(remaining, strings(&["sam", "tom"]));
        assert_eq!(results.total_words, 8);
        assert_eq!(results.readable_words, 6);

        let mut union: Vec<String> = all_buckets(&results).into_iter().cloned().collect();
        union.sort();
        let mut unique = crate::words::unique_words(html, None);
        unique.sort();
        assert_eq!(union, unique);

        let marked = crate::markup::highlight(html, &results);
        assert!(marked.contains("<span class=\"possible-word\">sat</span>.</p>"));
        assert!(marked.contains("&amp; <span class=\"word-not-found\">Sam</span>"));
    }

    #[test]
    fn unknown_multi_letter_grapheme_is_not_possible() {
        let model = model(&["a", "aa", "b"]);
        let known = strings(&["a", "b"]);
        let check = StoryCheck {
            known_graphemes: &known,
            story_html: "ab aab",
            ..StoryCheck::default()
        };
        let results = check_story(&model, &check);
        assert_eq!(results.possible_words, strings(&["ab"]));
        assert_eq!(results.remaining_words, strings(&["aab"]));
    }

    #[test]
    fn numbers_come_from_remaining() {
        let results = StoryCheckResults {
            remaining_words: strings(&["qwerty", "a1sdfg", "123", "12zxcvb", "456.789"]),
            ..StoryCheckResults::default()
        };
        assert_eq!(results.numbers(), strings(&["123", "456.789"]));
        assert_eq!(results.unreadable_words(), strings(&["qwerty", "a1sdfg", "12zxcvb"]));
    }

    #[test]
    fn passes_run_in_order() {
        let mut model = model(&["a", "c", "t", "s", "h", "e"]);
        model.add_word(1, "cat", 1).unwrap();
        model.add_word(1, "the", 1).unwrap();
        index::reindex(&mut model);

        let focus = strings(&["Sat"]);
        let known = strings(&["a", "t", "s", "c", "h", "e"]);
        let check = StoryCheck {
            focus_words: &focus,
            cumulative_words: model.group(1).unwrap().words(),
            known_graphemes: &known,
            story_html: "<p>The cat sat. The cats said 12 things!</p>",
            sight_words: "the said",
        };
        let results = check_story(&model, &check);
        assert_eq!(results.focus_words, strings(&["sat"]));
        assert_eq!(results.cumulative_words, strings(&["the", "cat"]));
        assert_eq!(results.possible_words, strings(&["cats"]));
        assert_eq!(results.sight_words, strings(&["said"]));
        assert_eq!(results.remaining_words, strings(&["12", "things"]));
        assert_eq!(results.numbers(), strings(&["12"]));
        // the x2, cat, sat, cats, said
        assert_eq!(results.readable_words, 6);
        assert_eq!(results.total_words, 7);
    }

    #[test]
    fn buckets_are_sorted_longest_first() {
        let model = model(&["a", "b", "c"]);
        let known = strings(&["a", "b", "c"]);
        let check = StoryCheck {
            known_graphemes: &known,
            story_html: "ab abc a cab ba",
            ..StoryCheck::default()
        };
        let results = check_story(&model, &check);
        assert_eq!(results.possible_words, strings(&["abc", "cab", "ab", "ba", "a"]));
    }

    #[test]
    fn full_notation_skips_possible_pass() {
        let mut model = model(&["a", "b"]);
        model.use_full_gpc_notation = true;
        let known = strings(&["a", "b"]);
        let check = StoryCheck {
            known_graphemes: &known,
            story_html: "ab ba",
            ..StoryCheck::default()
        };
        let results = check_story(&model, &check);
        assert!(results.possible_words.is_empty());
        assert_eq!(results.remaining_words.len(), 2);
    }

    #[test]
    fn buckets_are_disjoint_and_complete() {
        let mut model = model(&["a", "e", "i", "o", "u", "b", "c", "d", "g", "h", "n", "s", "t", "sh"]);
        model.add_word(1, "dog", 1).unwrap();
        index::reindex(&mut model);
        let focus = strings(&["ship", "dog"]);
        let known = strings(&["a", "i", "o", "sh", "t", "n", "d", "g"]);
        let story = "The dog and the ship sat in a big tin. A dog! Then 3 ships, 4 hats, and a shed.";
        let check = StoryCheck {
            focus_words: &focus,
            cumulative_words: model.group(1).unwrap().words(),
            known_graphemes: &known,
            story_html: story,
            sight_words: "the a and",
        };
        let results = check_story(&model, &check);

        let buckets = all_buckets(&results);
        let distinct: HashSet<&String> = buckets.iter().copied().collect();
        assert_eq!(distinct.len(), buckets.len(), "a word landed in two buckets");

        let unique = words::unique_words(story, None);
        assert_eq!(distinct.len(), unique.len());
        assert!(unique.iter().all(|w| distinct.contains(w)));
    }

    #[test]
    fn classification_is_idempotent() {
        let model = model(&["a", "b", "ch", "d"]);
        let known = strings(&["a", "b", "d"]);
        let focus = strings(&["chad"]);
        let check = StoryCheck {
            focus_words: &focus,
            known_graphemes: &known,
            story_html: "<i>Chad</i> bad, dab. Had 2.",
            sight_words: "had",
            ..StoryCheck::default()
        };
        assert_eq!(check_story(&model, &check), check_story(&model, &check));
    }

    #[test]
    fn pattern_characters_are_escaped() {
        let model = model(&["a", "b", "(", "*", "+"]);
        let known = strings(&["a", "b", "(", "*", "+"]);
        let focus = strings(&["c++", "[x"]);
        let check = StoryCheck {
            focus_words: &focus,
            known_graphemes: &known,
            story_html: "a(b *a b) c++ [x a+b",
            sight_words: "(?:",
            ..StoryCheck::default()
        };
        let results = check_story(&model, &check);
        assert_eq!(results.focus_words, strings(&["c++"]));
        assert_eq!(results.possible_words, strings(&["a(b", "a+b", "*a", "b"]));
        assert_eq!(results.remaining_words, strings(&["x"]));
    }

    #[test]
    fn empty_story_has_empty_results() {
        let model = model(&["a"]);
        let results = check_story(&model, &StoryCheck::default());
        assert_eq!(results, StoryCheckResults::default());
    }
}
