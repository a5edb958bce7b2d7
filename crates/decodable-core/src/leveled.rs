//! Leveled-reader length checks.
//!
//! A leveled reader caps how many words a sentence, and the whole story, may
//! have. Sentences come from the fragmenter, so markup and phrase
//! delimiters are honored the same way as everywhere else.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::fragments;
use crate::punctuation::SentenceRules;

/// A sentence over the per-sentence limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LongSentence {
    /// 1-based position among the story's sentences.
    pub sentence_num: usize,
    /// Words in the sentence.
    pub word_count: usize,
    /// The sentence, markup included.
    pub text: String,
}

/// Result of a leveled-reader check.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LeveledReport {
    /// Number of sentences.
    pub sentences: usize,
    /// Number of words.
    pub words: usize,
    /// Words in the longest sentence.
    pub longest: usize,
    /// Average words per sentence, one decimal.
    pub avg_length: f64,
    /// Per-sentence limit, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_words_per_sentence: Option<usize>,
    /// Whole-story limit, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_words: Option<usize>,
    /// Sentences over the per-sentence limit.
    pub long_sentences: Vec<LongSentence>,
    /// Whether the story is over the whole-story limit.
    pub over_max_words: bool,
}

impl LeveledReport {
    /// Whether every limit is met.
    pub fn passes(&self) -> bool {
        self.long_sentences.is_empty() && !self.over_max_words
    }
}

/// Count words per sentence and compare against the limits.
///
/// # Errors
///
/// [`AnalysisError::EmptyInput`] when the text has no words.
#[tracing::instrument(skip(html, rules), fields(text_len = html.len()))]
pub fn check_leveled(
    html: &str,
    rules: &SentenceRules,
    max_words_per_sentence: Option<usize>,
    max_words: Option<usize>,
) -> AnalysisResult<LeveledReport> {
    let fragments = fragments::split_with_rules(html, rules);
    let lengths: Vec<(usize, &str)> = fragments::sentences(&fragments)
        .map(|f| (f.word_count(), f.text.as_str()))
        .filter(|(count, _)| *count > 0)
        .collect();

    let words: usize = lengths.iter().map(|(count, _)| count).sum();
    if words == 0 {
        return Err(AnalysisError::EmptyInput);
    }

    let sentences = lengths.len();
    let longest = lengths.iter().map(|(count, _)| *count).max().unwrap_or(0);
    let avg_length = round1(words as f64 / sentences as f64);

    let long_sentences = match max_words_per_sentence {
        Some(max) => lengths
            .iter()
            .enumerate()
            .filter(|(_, (count, _))| *count > max)
            .map(|(idx, (count, text))| LongSentence {
                sentence_num: idx + 1,
                word_count: *count,
                text: (*text).to_string(),
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(LeveledReport {
        sentences,
        words,
        longest,
        avg_length,
        max_words_per_sentence,
        max_words,
        long_sentences,
        over_max_words: max_words.is_some_and(|max| words > max),
    })
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
