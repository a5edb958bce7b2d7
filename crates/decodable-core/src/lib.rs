//! Core library for decodable.
//!
//! This crate holds the reading-decodability engine used by the `decodable`
//! CLI and its MCP server: word tokenizing, sentence fragmenting, grapheme
//! segmentation, the vocabulary model with its index, and the five-bucket
//! classifier.
//!
//! # Modules
//!
//! - [`words`] - Word tokenizing of HTML-bearing text
//! - [`fragments`] - Sentence and inter-sentence fragments, markup preserved
//! - [`gpc`] - Grapheme segmentation of words
//! - [`language`] - The grapheme catalog and vocabulary groups, plus loading
//! - [`index`] - Derived word fields and candidate word selection
//! - [`classify`] - Decodability classification of a story
//! - [`markup`] - Highlighting classified words in HTML
//! - [`leveled`] - Leveled-reader sentence and story length checks
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```no_run
//! use decodable_core::classify::{StoryCheck, check_story};
//! use decodable_core::language::parse::parse_language_data;
//!
//! let lang = std::fs::read_to_string("en.json").unwrap();
//! let model = parse_language_data(&lang).expect("valid language data");
//! let known: Vec<String> = ["c", "a", "t", "s"].map(String::from).to_vec();
//! let results = check_story(
//!     &model,
//!     &StoryCheck {
//!         known_graphemes: &known,
//!         story_html: "<p>The cat sat.</p>",
//!         sight_words: "the",
//!         ..StoryCheck::default()
//!     },
//! );
//! println!("{} of {} words readable", results.readable_words, results.total_words);
//! ```
#![deny(unsafe_code)]

pub mod classify;
pub mod config;
pub mod error;
pub mod fragments;
pub mod gpc;
pub mod index;
pub mod language;
pub mod leveled;
pub mod markup;
pub mod pattern;
pub mod punctuation;
pub mod words;

/// Default input size limit for files and tool payloads (5 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;

pub use classify::{StoryCheck, StoryCheckResults, check_story};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use error::{
    AnalysisError, AnalysisResult, ConfigError, ConfigResult, IndexError, IndexResult,
    LanguageDataError, LanguageDataResult,
};
pub use fragments::{TextFragment, split_into_fragments};
pub use index::{CandidateQuery, IndexKey, WordCache, select_candidates};
pub use language::{GraphemeCategory, GraphemeUnit, LanguageData, WordEntry};
pub use punctuation::SentenceRules;
