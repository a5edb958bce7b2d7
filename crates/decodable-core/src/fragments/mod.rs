//! Sentence fragmenting for HTML-bearing text.
//!
//! Splits text into an ordered list of [`TextFragment`]s, each either a
//! sentence (or phrase) or the whitespace between sentences. Markup is kept
//! intact: concatenating the fragment texts gives back the input, except that
//! tags left open across a boundary are closed at the end of one fragment and
//! reopened at the start of the next.
//!
//! Boundaries are found on a buffer where every tag, line break and `&nbsp;`
//! has been replaced by a placeholder, so arbitrarily nested markup is
//! invisible to the boundary rules.

mod boundaries;
mod holders;

use std::cell::OnceCell;

use serde::Serialize;

use crate::punctuation::SentenceRules;
use crate::words;

use boundaries::{Chunk, ChunkKind};

/// One sentence or inter-sentence gap.
#[derive(Debug, Clone, Serialize)]
pub struct TextFragment {
    /// Original text with markup intact.
    pub text: String,
    /// `true` for sentence content, `false` for whitespace between sentences.
    pub is_sentence: bool,
    #[serde(skip)]
    words: OnceCell<Vec<String>>,
}

impl TextFragment {
    /// Create a fragment.
    pub fn new(text: impl Into<String>, is_sentence: bool) -> Self {
        Self {
            text: text.into(),
            is_sentence,
            words: OnceCell::new(),
        }
    }

    /// Words of this fragment, computed on first use.
    pub fn words(&self) -> &[String] {
        self.words.get_or_init(|| words::get_words(&self.text, None))
    }

    /// Number of words in this fragment.
    pub fn word_count(&self) -> usize {
        self.words().len()
    }
}

impl PartialEq for TextFragment {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.is_sentence == other.is_sentence
    }
}

impl Eq for TextFragment {}

/// Split text into fragments using the built-in sentence terminators.
pub fn split_into_fragments(html: &str) -> Vec<TextFragment> {
    split_with_rules(html, &SentenceRules::new())
}

/// Split text into fragments using the given terminators.
#[tracing::instrument(skip_all, fields(text_len = html.len()))]
pub fn split_with_rules(html: &str, rules: &SentenceRules) -> Vec<TextFragment> {
    let (pieces, markup) = holders::lift(html);
    let mut chunks = boundaries::chunk(&pieces, rules);
    boundaries::balance_tags(&mut chunks, &markup);

    let mut fragments: Vec<TextFragment> = Vec::with_capacity(chunks.len());
    let mut pending_markup = String::new();

    for Chunk { kind, pieces } in chunks {
        let text = markup.render(&pieces);
        if pieces.iter().all(|p| p.is_markup()) {
            // Nothing readable: attach the tags to a neighbour so none are lost.
            match fragments.last_mut() {
                Some(last) => last.text.push_str(&text),
                None => pending_markup.push_str(&text),
            }
            continue;
        }

        let text = if pending_markup.is_empty() {
            text
        } else {
            std::mem::take(&mut pending_markup) + &text
        };
        fragments.push(TextFragment::new(text, kind == ChunkKind::Sentence));
    }

    if !pending_markup.is_empty() {
        fragments.push(TextFragment::new(pending_markup, false));
    }

    tracing::debug!(fragments = fragments.len(), "split text into fragments");
    fragments
}

/// Only the sentence fragments.
pub fn sentences(fragments: &[TextFragment]) -> impl Iterator<Item = &TextFragment> {
    fragments.iter().filter(|f| f.is_sentence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(fragments: &[TextFragment]) -> Vec<bool> {
        fragments.iter().map(|f| f.is_sentence).collect()
    }

    #[test]
    fn two_sentences_with_quotes() {
        let fragments = split_into_fragments("This is sentence 1. \"This is 'sentence 2.'\"");
        let sentences: Vec<&TextFragment> = sentences(&fragments).collect();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "This is sentence 1.");
        assert_eq!(sentences[1].text, "\"This is 'sentence 2.'\"");
        assert_eq!(sentences[0].word_count(), 4);
        assert_eq!(sentences[1].word_count(), 4);
        assert_eq!(kinds(&fragments), vec![true, false, true]);
    }

    #[test]
    fn crlf_is_a_single_break() {
        let fragments = split_into_fragments("This is\r\na block of\r\ntext to test.");
        assert_eq!(kinds(&fragments), vec![true, false, true, false, true]);
        assert_eq!(fragments[1].text, "\r\n");
        assert_eq!(fragments[3].text, "\r\n");
        assert_eq!(sentences(&fragments).count(), 3);
    }

    #[test]
    fn numeric_nbsp_separates_sentences() {
        for gap in ["&#160;", "&#xA0;"] {
            let fragments = split_into_fragments(&format!("One.{gap}Two."));
            let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
            assert_eq!(texts, vec!["One.", gap, "Two."]);
        }
    }

    #[test]
    fn initials_do_not_split() {
        let fragments = split_into_fragments("This is test sentence U.S.A.");
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].is_sentence);
    }

    #[test]
    fn markup_is_preserved() {
        let html = "<p>One <i>two</i>. Three<br/>four&nbsp;five.</p>";
        let fragments = split_into_fragments(html);
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "<p>One <i>two</i>.</p>",
                "<p> </p>",
                "<p>Three</p>",
                "<p><br/></p>",
                "<p>four&nbsp;five.</p>",
            ]
        );
        assert_eq!(kinds(&fragments), vec![true, false, true, false, true]);
        assert_eq!(fragments[4].word_count(), 2);
    }

    #[test]
    fn unbalanced_markup_keeps_plain_text() {
        let html = "<b>Bold start. Plain end.";
        let fragments = split_into_fragments(html);
        assert_eq!(fragments[0].text, "<b>Bold start.</b>");
        assert_eq!(fragments[2].text, "<b>Plain end.</b>");
    }

    #[test]
    fn markup_only_input_is_not_lost() {
        let fragments = split_into_fragments("<p></p>");
        assert_eq!(fragments.len(), 1);
        assert!(!fragments[0].is_sentence);
        assert_eq!(fragments[0].text, "<p></p>");
    }

    #[test]
    fn empty_input_has_no_fragments() {
        assert!(split_into_fragments("").is_empty());
    }

    #[test]
    fn plain_text_round_trips() {
        let text = "First one. Second one!  Third?\nFourth line";
        let joined: String = split_into_fragments(text)
            .iter()
            .map(|f| f.text.as_str())
            .collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = "A cat. A dog! <b>A hen?</b> The end.";
        assert_eq!(split_into_fragments(text), split_into_fragments(text));
    }

    #[test]
    fn phrase_delimiter_followed_by_space() {
        let fragments = split_into_fragments("I see | a cat.");
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["I see ", " ", "a cat."]);
        assert_eq!(kinds(&fragments), vec![true, false, true]);
    }
}
