//! Graphemes command: show a language's grapheme catalog.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use decodable_core::language::{GraphemeCategory, GraphemeUnit, LanguageData};

use super::load_language;

/// Arguments for the `graphemes` subcommand.
#[derive(Args, Debug)]
pub struct GraphemesArgs {
    /// Language data file (defaults to `language_data` from the config).
    #[arg(long, value_name = "FILE")]
    pub lang: Option<Utf8PathBuf>,

    /// Only list graphemes of this category.
    #[arg(long, value_enum)]
    pub category: Option<GraphemeCategory>,
}

fn select(model: &LanguageData, category: Option<GraphemeCategory>) -> Vec<&GraphemeUnit> {
    model
        .graphemes
        .iter()
        .filter(|g| category.is_none_or(|c| g.category == c))
        .collect()
}

/// List the grapheme catalog with word frequencies.
#[instrument(name = "cmd_graphemes", skip_all)]
pub fn cmd_graphemes(
    args: GraphemesArgs,
    global_json: bool,
    default_lang: Option<&Utf8Path>,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(category = ?args.category, "executing graphemes command");

    let model = load_language(args.lang.as_deref(), default_lang, max_input_bytes)?;
    let units = select(&model, args.category);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&units)?);
        return Ok(());
    }

    println!("{} {}", model.name.bold(), format!("({})", model.id).dimmed());
    for unit in units {
        let phoneme = if unit.phoneme.is_empty() {
            String::new()
        } else {
            format!(" /{}/", unit.phoneme)
        };
        println!(
            "{:<6}{} {} {}",
            unit.grapheme,
            phoneme,
            unit.category.as_str().dimmed(),
            format!("words: {}", unit.frequency).dimmed()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::SAMPLE_LANGUAGE;
    use super::*;
    use decodable_core::language::parse::parse_language_data;

    #[test]
    fn category_filter() {
        let model = parse_language_data(SAMPLE_LANGUAGE).unwrap();
        let vowels = select(&model, Some(GraphemeCategory::Vowel));
        assert_eq!(vowels.len(), 1);
        assert_eq!(vowels[0].grapheme, "a");
        assert_eq!(select(&model, None).len(), 6);
    }
}
