//! Vocabulary indexing and candidate word selection.
//!
//! [`reindex`] derives each word's grapheme set and files the word under
//! every `(grapheme, syllables)` pair it contains. [`select_candidates`]
//! answers "words of these lengths containing any of these graphemes,
//! optionally made only of these graphemes" from that index, memoizing the
//! last answer in a single-slot [`WordCache`].

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use crate::error::{IndexError, IndexResult};
use crate::gpc;
use crate::language::{GraphemeCategory, LanguageData, MAX_GROUPS, WordEntry};

static GENERATION: AtomicU64 = AtomicU64::new(1);

static WORD_CACHE: LazyLock<WordCache> = LazyLock::new(WordCache::default);

/// Key of a vocabulary group's lookup index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    grapheme: String,
    syllables: u32,
}

impl IndexKey {
    /// Key for words of `syllables` syllables containing `grapheme`.
    pub fn new(grapheme: impl Into<String>, syllables: u32) -> Self {
        Self {
            grapheme: grapheme.into(),
            syllables,
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}", self.grapheme, self.syllables)
    }
}

/// Recompute every word's derived fields, the group indexes and the
/// grapheme frequencies.
///
/// Missing GPC forms are segmented against the catalog; missing syllable
/// counts are estimated from runs of vowel graphemes.
#[tracing::instrument(skip_all, fields(language = %model.name))]
pub fn reindex(model: &mut LanguageData) {
    let catalog = model.graphemes_desc();
    let vowels: HashSet<String> = model
        .graphemes
        .iter()
        .filter(|g| g.category == GraphemeCategory::Vowel)
        .map(|g| g.grapheme.clone())
        .collect();
    let full_notation = model.use_full_gpc_notation;

    let mut frequencies: HashMap<String, (u32, u32)> = HashMap::new();
    let mut indexed = 0usize;

    for group in &mut model.groups {
        group.index.clear();
        for (position, word) in group.words.iter_mut().enumerate() {
            if word.gpc_form.is_empty() {
                word.gpc_form = gpc::segment(&word.name, &catalog);
            }

            let plain = if full_notation {
                gpc::full_gpcs_to_graphemes(&word.gpc_form)
            } else {
                word.gpc_form.clone()
            };
            word.reverse = plain.iter().rev().map(String::as_str).collect();

            let mut seen = HashSet::new();
            word.unique_gpcs = word
                .gpc_form
                .iter()
                .filter(|g| seen.insert(g.as_str()))
                .cloned()
                .collect();
            word.gpc_count = word.unique_gpcs.len();

            if word.syllables == 0 {
                word.syllables = estimate_syllables(&word.gpc_form, &vowels);
            }

            for unit in &word.unique_gpcs {
                group
                    .index
                    .entry(IndexKey::new(unit.as_str(), word.syllables))
                    .or_default()
                    .push(position);

                let occurrences = word.gpc_form.iter().filter(|g| *g == unit).count();
                let entry = frequencies.entry(unit.clone()).or_default();
                entry.0 += 1;
                entry.1 = entry.1.saturating_add(
                    u32::try_from(occurrences)
                        .unwrap_or(u32::MAX)
                        .saturating_mul(word.count),
                );
            }
            indexed += 1;
        }
    }

    for unit in &mut model.graphemes {
        let (frequency, token_frequency) = frequencies.get(&unit.grapheme).copied().unwrap_or_default();
        unit.frequency = frequency;
        unit.token_frequency = token_frequency;
    }

    model.generation = GENERATION.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(words = indexed, generation = model.generation, "reindexed vocabulary");
}

/// Count runs of vowel units; every word has at least one syllable.
fn estimate_syllables(units: &[String], vowels: &HashSet<String>) -> u32 {
    let mut runs = 0u32;
    let mut in_vowel = false;
    for unit in units {
        let is_vowel = vowels.contains(unit);
        if is_vowel && !in_vowel {
            runs += 1;
        }
        in_vowel = is_vowel;
    }
    runs.max(1)
}

/// Parameters of a candidate word query.
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery<'a> {
    /// Words must contain at least one of these graphemes.
    pub desired: &'a [String],
    /// Graphemes the reader knows.
    pub known: &'a [String],
    /// Keep only words made entirely of known graphemes.
    pub restrict_to_known: bool,
    /// Count uppercase variants of known graphemes as known.
    pub allow_upper_case: bool,
    /// Syllable counts to include; must not be empty.
    pub syllable_lengths: &'a [u32],
    /// Vocabulary groups to search (1-based); empty means all.
    pub groups: &'a [usize],
    /// Allowed part-of-speech tags; empty means any.
    pub parts_of_speech: &'a [String],
}

/// Owned, order-insensitive form of a query, compared by value.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueryKey {
    generation: u64,
    desired: BTreeSet<String>,
    known: BTreeSet<String>,
    restrict_to_known: bool,
    allow_upper_case: bool,
    syllable_lengths: BTreeSet<u32>,
    groups: BTreeSet<usize>,
    parts_of_speech: BTreeSet<String>,
}

impl QueryKey {
    fn new(model: &LanguageData, query: &CandidateQuery<'_>) -> Self {
        Self {
            generation: model.generation,
            desired: query.desired.iter().cloned().collect(),
            known: query.known.iter().cloned().collect(),
            restrict_to_known: query.restrict_to_known,
            allow_upper_case: query.allow_upper_case,
            syllable_lengths: query.syllable_lengths.iter().copied().collect(),
            groups: query.groups.iter().copied().collect(),
            parts_of_speech: query.parts_of_speech.iter().cloned().collect(),
        }
    }
}

/// Memo of the most recent candidate query. Holds at most one entry.
#[derive(Debug, Default)]
pub struct WordCache {
    slot: Mutex<Option<(QueryKey, Arc<Vec<WordEntry>>)>>,
}

impl WordCache {
    /// Drop the cached entry.
    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn get(&self, key: &QueryKey) -> Option<Arc<Vec<WordEntry>>> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|(cached, _)| cached == key)
            .map(|(_, words)| Arc::clone(words))
    }

    fn put(&self, key: QueryKey, words: Arc<Vec<WordEntry>>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some((key, words));
    }
}

/// Drop the process-wide cached candidates.
pub fn clear_word_cache() {
    WORD_CACHE.clear();
}

/// Select candidate words using the process-wide cache.
pub fn select_candidates(
    model: &LanguageData,
    query: &CandidateQuery<'_>,
) -> IndexResult<Arc<Vec<WordEntry>>> {
    select_candidates_with_cache(model, query, &WORD_CACHE)
}

/// Select candidate words, memoized in `cache`.
///
/// # Errors
///
/// [`IndexError::NoSyllableLengths`] when no syllable length is given, and
/// [`IndexError::GroupOutOfRange`] for a group outside `1..=MAX_GROUPS`.
#[tracing::instrument(skip_all, fields(desired = query.desired.len(), known = query.known.len()))]
pub fn select_candidates_with_cache(
    model: &LanguageData,
    query: &CandidateQuery<'_>,
    cache: &WordCache,
) -> IndexResult<Arc<Vec<WordEntry>>> {
    if query.syllable_lengths.is_empty() {
        return Err(IndexError::NoSyllableLengths);
    }
    if let Some(&bad) = query.groups.iter().find(|g| !(1..=MAX_GROUPS).contains(*g)) {
        return Err(IndexError::GroupOutOfRange(bad));
    }

    let key = QueryKey::new(model, query);
    if let Some(words) = cache.get(&key) {
        tracing::trace!("word cache hit");
        return Ok(words);
    }

    let words = Arc::new(collect_candidates(model, query));
    tracing::debug!(candidates = words.len(), "selected candidate words");
    cache.put(key, Arc::clone(&words));
    Ok(words)
}

fn collect_candidates(model: &LanguageData, query: &CandidateQuery<'_>) -> Vec<WordEntry> {
    let groups: Vec<usize> = if query.groups.is_empty() {
        (1..=MAX_GROUPS).collect()
    } else {
        query.groups.to_vec()
    };

    let mut seen = HashSet::new();
    let mut found: Vec<&WordEntry> = Vec::new();
    for group in groups.iter().filter_map(|&n| model.group(n)) {
        for desired in query.desired {
            for &syllables in query.syllable_lengths {
                for entry in group.lookup(&IndexKey::new(desired.as_str(), syllables)) {
                    if seen.insert(entry.name.as_str()) {
                        found.push(entry);
                    }
                }
            }
        }
    }

    if !query.restrict_to_known {
        return found.into_iter().cloned().collect();
    }

    let allowed = allowed_graphemes(model, query);
    let parts_of_speech: HashSet<&str> = query.parts_of_speech.iter().map(String::as_str).collect();

    found
        .into_iter()
        .filter(|entry| entry.unique_gpcs.iter().all(|g| allowed.contains(g.as_str())))
        .filter(|entry| {
            parts_of_speech.is_empty() || parts_of_speech.contains(entry.part_of_speech.as_str())
        })
        .cloned()
        .collect()
}

/// Known graphemes plus their uppercase forms (when asked) and the model's
/// always-match symbols.
fn allowed_graphemes(model: &LanguageData, query: &CandidateQuery<'_>) -> HashSet<String> {
    let mut allowed: HashSet<String> = query.known.iter().cloned().collect();
    if query.allow_upper_case {
        for known in query.known {
            let upper = model
                .grapheme(known)
                .map_or_else(|| known.to_uppercase(), |g| g.upper.clone());
            allowed.insert(upper);
        }
    }
    allowed.extend(model.always_match.iter().cloned());
    allowed
}
