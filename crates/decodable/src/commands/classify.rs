//! Classify command: sort a story's words into decodability buckets.

use anyhow::bail;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use decodable_core::classify::{StoryCheck, StoryCheckResults, check_story};
use decodable_core::language::{LanguageData, WordEntry};
use decodable_core::markup;

use super::{load_language, read_input_file};

/// Arguments for the `classify` subcommand.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Story file (plain text or HTML).
    pub file: Utf8PathBuf,

    /// Language data file (defaults to `language_data` from the config).
    #[arg(long, value_name = "FILE")]
    pub lang: Option<Utf8PathBuf>,

    /// Words being taught now (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub focus: Vec<String>,

    /// Graphemes the reader knows (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub known: Vec<String>,

    /// Sight words as free text (defaults to `sight_words` from the config).
    #[arg(long)]
    pub sight: Option<String>,

    /// Vocabulary groups whose words count as already taught (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub cumulative_groups: Vec<usize>,

    /// Print the story with classified words wrapped in marker spans.
    #[arg(long)]
    pub highlight: bool,
}

#[derive(Serialize)]
struct ClassifyOutput<'a> {
    #[serde(flatten)]
    results: &'a StoryCheckResults,
    numbers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    highlighted: Option<String>,
}

/// Words of the given groups, in group order.
pub(crate) fn cumulative_words(
    model: &LanguageData,
    groups: &[usize],
) -> anyhow::Result<Vec<WordEntry>> {
    let mut words = Vec::new();
    for &number in groups {
        let Some(group) = model.group(number) else {
            bail!("vocabulary group {number} does not exist");
        };
        words.extend(group.words().iter().cloned());
    }
    Ok(words)
}

/// Classify the words of a story file.
#[instrument(name = "cmd_classify", skip_all, fields(file = %args.file))]
pub fn cmd_classify(
    args: ClassifyArgs,
    global_json: bool,
    default_lang: Option<&Utf8Path>,
    config_sight_words: Option<&str>,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(
        file = %args.file,
        focus = args.focus.len(),
        known = args.known.len(),
        "executing classify command"
    );

    let model = load_language(args.lang.as_deref(), default_lang, max_input_bytes)?;
    let story = read_input_file(&args.file, max_input_bytes)?;
    let cumulative = cumulative_words(&model, &args.cumulative_groups)?;
    let sight = args.sight.as_deref().or(config_sight_words).unwrap_or("");

    let results = check_story(
        &model,
        &StoryCheck {
            focus_words: &args.focus,
            cumulative_words: &cumulative,
            known_graphemes: &args.known,
            story_html: &story,
            sight_words: sight,
        },
    );
    let highlighted = args.highlight.then(|| markup::highlight(&story, &results));

    if global_json {
        let output = ClassifyOutput {
            results: &results,
            numbers: results.numbers(),
            highlighted,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if let Some(html) = highlighted {
        println!("{html}");
        return Ok(());
    }

    print_bucket("Focus", &results.focus_words);
    print_bucket("Cumulative", &results.cumulative_words);
    print_bucket("Possible", &results.possible_words);
    print_bucket("Sight", &results.sight_words);
    print_bucket("Numbers", &results.numbers());
    let unreadable = results.unreadable_words();
    if unreadable.is_empty() {
        println!("{}: {}", "Not decodable".dimmed(), "(none)".green());
    } else {
        println!("{}: {}", "Not decodable".dimmed(), unreadable.join(", ").red());
    }

    println!();
    let percent = if results.total_words == 0 {
        100.0
    } else {
        results.readable_words as f64 * 100.0 / results.total_words as f64
    };
    let summary = format!(
        "{} of {} words decodable ({percent:.1}%)",
        results.readable_words, results.total_words
    );
    if unreadable.is_empty() {
        println!("{} {summary}", "PASS:".green());
    } else {
        println!("{summary}");
    }

    Ok(())
}

fn print_bucket(label: &str, words: &[String]) {
    if words.is_empty() {
        println!("{}: {}", label.dimmed(), "(none)".dimmed());
    } else {
        println!("{}: {}", label.dimmed(), words.join(", "));
    }
}
