//! The grapheme and vocabulary model of one language.
//!
//! A [`LanguageData`] holds the grapheme catalog and up to [`MAX_GROUPS`]
//! vocabulary groups. Derived per-word fields and the group indexes are
//! filled by [`crate::index::reindex`]; call it after adding words.

pub mod parse;
pub mod store;

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{LanguageDataError, LanguageDataResult};
use crate::gpc;
use crate::index::IndexKey;
use crate::words;

/// Number of parallel vocabulary groups a model can hold.
pub const MAX_GROUPS: usize = 6;

/// Broad phonetic class of a grapheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum GraphemeCategory {
    /// Vowel sound; syllable estimation counts runs of these.
    Vowel,
    /// Consonant sound.
    Consonant,
    /// Anything else (tone marks, punctuation used as a letter, ...).
    #[default]
    Other,
}

impl GraphemeCategory {
    /// Parse the loose category names found in language files.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "vowel" | "v" => Self::Vowel,
            "consonant" | "c" => Self::Consonant,
            _ => Self::Other,
        }
    }

    /// Lowercase name, as serialized.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vowel => "vowel",
            Self::Consonant => "consonant",
            Self::Other => "other",
        }
    }
}

/// One taught grapheme/phoneme correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GraphemeUnit {
    /// The spelling, lowercase.
    pub grapheme: String,
    /// The uppercase spelling.
    pub upper: String,
    /// The sound it stands for, if recorded.
    pub phoneme: String,
    /// Vowel, consonant or other.
    pub category: GraphemeCategory,
    /// Whether the grapheme combines with the previous character.
    pub combining: bool,
    /// Number of known words containing the grapheme.
    pub frequency: u32,
    /// Number of grapheme occurrences across known words, weighted by count.
    pub token_frequency: u32,
    /// Alternate spellings of the same sound.
    pub alternates: Vec<String>,
}

impl GraphemeUnit {
    /// A grapheme with default attributes.
    pub fn new(grapheme: impl Into<String>) -> Self {
        let grapheme = grapheme.into();
        Self {
            upper: grapheme.to_uppercase(),
            grapheme,
            phoneme: String::new(),
            category: GraphemeCategory::Other,
            combining: false,
            frequency: 0,
            token_frequency: 0,
            alternates: Vec::new(),
        }
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: GraphemeCategory) -> Self {
        self.category = category;
        self
    }
}

/// One known word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct WordEntry {
    /// Canonical lowercase spelling.
    pub name: String,
    /// Occurrences seen.
    pub count: u32,
    /// Vocabulary group, `1..=MAX_GROUPS`.
    pub group: usize,
    /// Part-of-speech tag, empty when unknown.
    pub part_of_speech: String,
    /// Syllable count; zero until estimated.
    pub syllables: u32,
    /// Ordered grapheme units covering the word.
    pub gpc_form: Vec<String>,
    /// `gpc_form` without duplicates, in first-occurrence order.
    pub unique_gpcs: Vec<String>,
    /// Length of `unique_gpcs`.
    pub gpc_count: usize,
    /// Plain graphemes in reverse order, concatenated.
    pub reverse: String,
}

impl WordEntry {
    /// A word with no derived fields yet.
    pub fn new(name: &str, group: usize) -> Self {
        Self {
            name: name.to_lowercase(),
            count: 1,
            group,
            part_of_speech: String::new(),
            syllables: 0,
            gpc_form: Vec::new(),
            unique_gpcs: Vec::new(),
            gpc_count: 0,
            reverse: String::new(),
        }
    }
}

/// One vocabulary bank: the ordered words plus their lookup index.
#[derive(Debug, Clone, Default)]
pub struct VocabularyGroup {
    pub(crate) words: Vec<WordEntry>,
    pub(crate) index: HashMap<IndexKey, Vec<usize>>,
}

impl VocabularyGroup {
    /// Words in insertion order.
    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    /// Look up a word by its lowercase name.
    pub fn get(&self, name: &str) -> Option<&WordEntry> {
        self.words.iter().find(|w| w.name == name)
    }

    /// Words filed under `key` by the last reindex.
    pub fn lookup(&self, key: &IndexKey) -> impl Iterator<Item = &WordEntry> {
        self.index
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.words.get(i))
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the group has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Everything known about one language.
#[derive(Debug, Clone)]
pub struct LanguageData {
    /// Display name.
    pub name: String,
    /// Language tag.
    pub id: String,
    /// Grapheme ordering for display.
    pub sort_order: Vec<String>,
    /// Suggested teaching order of graphemes.
    pub productivity_sequence: Vec<String>,
    /// Digits of the language's numeral system.
    pub numbers: Vec<String>,
    /// The grapheme catalog.
    pub graphemes: Vec<GraphemeUnit>,
    /// Symbols every word may contain without being taught.
    pub always_match: Vec<String>,
    /// Whether GPC forms use `grapheme_pronunciation` tokens.
    pub use_full_gpc_notation: bool,
    pub(crate) groups: Vec<VocabularyGroup>,
    pub(crate) generation: u64,
}

impl Default for LanguageData {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl LanguageData {
    /// An empty model with [`MAX_GROUPS`] empty groups.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            sort_order: Vec::new(),
            productivity_sequence: Vec::new(),
            numbers: Vec::new(),
            graphemes: Vec::new(),
            always_match: Vec::new(),
            use_full_gpc_notation: false,
            groups: vec![VocabularyGroup::default(); MAX_GROUPS],
            generation: 0,
        }
    }

    /// Changes on every reindex; lets caches tell models apart.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Catalog entry for `grapheme`.
    pub fn grapheme(&self, grapheme: &str) -> Option<&GraphemeUnit> {
        self.graphemes.iter().find(|g| g.grapheme == grapheme)
    }

    /// Catalog graphemes, longest first, ready for [`gpc::segment`].
    pub fn graphemes_desc(&self) -> Vec<String> {
        gpc::sort_by_length_desc(
            &self
                .graphemes
                .iter()
                .map(|g| g.grapheme.as_str())
                .collect::<Vec<_>>(),
        )
    }

    /// Add a grapheme to the catalog. Returns `false` if it was already there.
    pub fn add_grapheme(&mut self, unit: GraphemeUnit) -> bool {
        if unit.grapheme.is_empty() || self.grapheme(&unit.grapheme).is_some() {
            return false;
        }
        self.graphemes.push(unit);
        true
    }

    /// Vocabulary group `number` (1-based).
    pub fn group(&self, number: usize) -> Option<&VocabularyGroup> {
        number.checked_sub(1).and_then(|i| self.groups.get(i))
    }

    /// All groups with their 1-based numbers.
    pub fn groups(&self) -> impl Iterator<Item = (usize, &VocabularyGroup)> {
        self.groups.iter().enumerate().map(|(i, g)| (i + 1, g))
    }

    /// Every word of every group, group order then insertion order.
    pub fn all_words(&self) -> impl Iterator<Item = &WordEntry> {
        self.groups.iter().flat_map(|g| g.words.iter())
    }

    pub(crate) fn group_mut(&mut self, number: usize) -> LanguageDataResult<&mut VocabularyGroup> {
        number
            .checked_sub(1)
            .and_then(|i| self.groups.get_mut(i))
            .ok_or(LanguageDataError::GroupOutOfRange(number))
    }

    /// Add `count` occurrences of a word to a group, merging with an
    /// existing entry of the same name.
    pub fn add_word(&mut self, group: usize, name: &str, count: u32) -> LanguageDataResult<()> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Ok(());
        }
        let bank = self.group_mut(group)?;
        match bank.words.iter_mut().find(|w| w.name == name) {
            Some(existing) => existing.count = existing.count.saturating_add(count),
            None => {
                let mut entry = WordEntry::new(&name, group);
                entry.count = count;
                bank.words.push(entry);
            }
        }
        Ok(())
    }

    /// Insert a fully formed entry, merging counts with an existing one.
    pub(crate) fn push_entry(&mut self, entry: WordEntry) -> LanguageDataResult<()> {
        let bank = self.group_mut(entry.group)?;
        match bank.words.iter_mut().find(|w| w.name == entry.name) {
            Some(existing) => existing.count = existing.count.saturating_add(entry.count),
            None => bank.words.push(entry),
        }
        Ok(())
    }

    /// Tokenize `text` and add every non-numeric word to a group.
    ///
    /// Returns the number of words that were new to the group.
    pub fn add_words_from_text(&mut self, group: usize, text: &str) -> LanguageDataResult<usize> {
        let letters = self.letters();
        let tokens = words::get_words(text, Some(&letters));
        let before = self.group_mut(group)?.len();
        for token in tokens.iter().filter(|t| !words::is_numeric(t)) {
            self.add_word(group, token, 1)?;
        }
        Ok(self.group_mut(group)?.len() - before)
    }

    /// Catalog characters that Unicode might otherwise call punctuation.
    ///
    /// Passed to the tokenizer so that, for example, an apostrophe taught as
    /// a letter is kept inside words.
    pub fn letters(&self) -> String {
        let mut seen = HashSet::new();
        self.graphemes
            .iter()
            .flat_map(|g| g.grapheme.chars().chain(g.upper.chars()))
            .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

impl FromStr for LanguageData {
    type Err = LanguageDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_language_data(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_model_has_all_groups() {
        let model = LanguageData::new("English", "en");
        assert_eq!(model.groups().count(), MAX_GROUPS);
        assert!(model.group(0).is_none());
        assert!(model.group(MAX_GROUPS).is_some());
        assert!(model.group(MAX_GROUPS + 1).is_none());
    }

    #[test]
    fn add_word_merges_counts() {
        let mut model = LanguageData::default();
        model.add_word(1, "Cat", 2).unwrap();
        model.add_word(1, "cat", 3).unwrap();
        model.add_word(2, "cat", 1).unwrap();
        let entry = model.group(1).unwrap().get("cat").unwrap();
        assert_eq!(entry.count, 5);
        assert_eq!(model.group(1).unwrap().len(), 1);
        assert_eq!(model.group(2).unwrap().len(), 1);
    }

    #[test]
    fn add_word_rejects_bad_group() {
        let mut model = LanguageData::default();
        let err = model.add_word(7, "cat", 1).unwrap_err();
        assert!(matches!(err, LanguageDataError::GroupOutOfRange(7)));
        assert!(model.add_word(0, "cat", 1).is_err());
    }

    #[test]
    fn add_words_from_text_skips_numbers() {
        let mut model = LanguageData::default();
        let added = model
            .add_words_from_text(1, "The cat sat. The <b>cat</b> had 3 hats!")
            .unwrap();
        assert_eq!(added, 5);
        assert_eq!(model.group(1).unwrap().get("the").unwrap().count, 2);
        assert!(model.group(1).unwrap().get("3").is_none());
    }

    #[test]
    fn add_grapheme_ignores_duplicates() {
        let mut model = LanguageData::default();
        assert!(model.add_grapheme(GraphemeUnit::new("ch")));
        assert!(!model.add_grapheme(GraphemeUnit::new("ch")));
        assert!(!model.add_grapheme(GraphemeUnit::new("")));
        assert_eq!(model.grapheme("ch").unwrap().upper, "CH");
    }

    #[test]
    fn letters_keep_only_non_alphanumerics() {
        let mut model = LanguageData::default();
        for g in ["a", "'", "k'", "b"] {
            model.add_grapheme(GraphemeUnit::new(g));
        }
        assert_eq!(model.letters(), "'");
    }

    #[test]
    fn graphemes_desc_orders_longest_first() {
        let mut model = LanguageData::default();
        for g in ["a", "igh", "ch"] {
            model.add_grapheme(GraphemeUnit::new(g));
        }
        assert_eq!(model.graphemes_desc(), vec!["igh", "ch", "a"]);
    }

    #[test]
    fn category_labels() {
        assert_eq!(GraphemeCategory::from_label("Vowel"), GraphemeCategory::Vowel);
        assert_eq!(GraphemeCategory::from_label("c"), GraphemeCategory::Consonant);
        assert_eq!(GraphemeCategory::from_label("tone"), GraphemeCategory::Other);
    }
}
