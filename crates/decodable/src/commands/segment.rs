//! Segment command: split words into graphemes of a language.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use decodable_core::gpc;
use decodable_core::language::LanguageData;

use super::load_language;

/// Arguments for the `segment` subcommand.
#[derive(Args, Debug)]
pub struct SegmentArgs {
    /// Words to segment.
    #[arg(required = true)]
    pub words: Vec<String>,

    /// Language data file (defaults to `language_data` from the config).
    #[arg(long, value_name = "FILE")]
    pub lang: Option<Utf8PathBuf>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Segmented {
    word: String,
    graphemes: Vec<String>,
    /// Units not found in the catalog.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unknown: Vec<String>,
}

fn segment_words(model: &LanguageData, words: &[String]) -> Vec<Segmented> {
    let catalog = model.graphemes_desc();
    words
        .iter()
        .map(|word| {
            let word = word.to_lowercase();
            let graphemes = gpc::segment(&word, &catalog);
            let unknown = graphemes
                .iter()
                .filter(|g| model.grapheme(g).is_none())
                .cloned()
                .collect();
            Segmented {
                word,
                graphemes,
                unknown,
            }
        })
        .collect()
}

/// Print the grapheme segmentation of each word.
#[instrument(name = "cmd_segment", skip_all, fields(words = args.words.len()))]
pub fn cmd_segment(
    args: SegmentArgs,
    global_json: bool,
    default_lang: Option<&Utf8Path>,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(words = ?args.words, "executing segment command");

    let model = load_language(args.lang.as_deref(), default_lang, max_input_bytes)?;
    let segmented = segment_words(&model, &args.words);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&segmented)?);
        return Ok(());
    }

    for item in &segmented {
        let units: Vec<String> = item
            .graphemes
            .iter()
            .map(|g| {
                if item.unknown.contains(g) {
                    g.yellow().to_string()
                } else {
                    g.to_string()
                }
            })
            .collect();
        println!("{}: {}", item.word.bold(), units.join(" · "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::SAMPLE_LANGUAGE;
    use super::*;
    use decodable_core::language::parse::parse_language_data;

    #[test]
    fn digraphs_and_unknown_units() {
        let model = parse_language_data(SAMPLE_LANGUAGE).unwrap();
        let out = segment_words(&model, &["Chats".to_string(), "cab".to_string()]);
        assert_eq!(out[0].word, "chats");
        assert_eq!(out[0].graphemes, ["ch", "a", "t", "s"]);
        assert!(out[0].unknown.is_empty());
        assert_eq!(out[1].graphemes, ["c", "a", "b"]);
        assert_eq!(out[1].unknown, ["b"]);
    }
}
