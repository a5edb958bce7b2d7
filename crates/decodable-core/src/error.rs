//! Error types for decodable-core.

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while ingesting language data.
///
/// Parsing is all-or-nothing: any of these means no model was produced.
#[derive(Error, Debug)]
pub enum LanguageDataError {
    /// The text is not valid (loose) JSON after normalization.
    #[error("malformed language data at line {line}, column {column}: {message}")]
    Syntax {
        /// 1-based line of the failure in the normalized text.
        line: usize,
        /// 1-based column of the failure in the normalized text.
        column: usize,
        /// Parser message.
        message: String,
    },

    /// The top level is valid JSON but not an object.
    #[error("language data must be a JSON object, found {found}")]
    NotAnObject {
        /// JSON type name that was found instead.
        found: &'static str,
    },

    /// A field has the wrong shape.
    #[error("invalid language data field `{field}`: {message}")]
    InvalidField {
        /// Name of the offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A vocabulary group number outside `1..=6`.
    #[error("vocabulary group {0} is out of range (1-{max})", max = crate::language::MAX_GROUPS)]
    GroupOutOfRange(usize),
}

/// Result type alias using [`LanguageDataError`].
pub type LanguageDataResult<T> = Result<T, LanguageDataError>;

/// Errors raised by vocabulary index queries.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    /// A candidate query was made without any syllable lengths.
    #[error("no syllable lengths selected; index keys need at least one")]
    NoSyllableLengths,

    /// A requested vocabulary group does not exist in the model.
    #[error("vocabulary group {0} is out of range (1-{max})", max = crate::language::MAX_GROUPS)]
    GroupOutOfRange(usize),
}

/// Result type alias using [`IndexError`].
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur during text analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The input text is empty or has no countable words.
    #[error("no words in input")]
    EmptyInput,
}

/// Result type alias using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;
