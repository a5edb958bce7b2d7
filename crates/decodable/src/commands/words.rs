//! Words command: find vocabulary that practices given graphemes.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use decodable_core::index::{CandidateQuery, select_candidates};

use super::load_language;

/// Arguments for the `words` subcommand.
#[derive(Args, Debug)]
pub struct WordsArgs {
    /// Language data file (defaults to `language_data` from the config).
    #[arg(long, value_name = "FILE")]
    pub lang: Option<Utf8PathBuf>,

    /// Words must contain at least one of these graphemes (comma-separated).
    #[arg(long, value_delimiter = ',', required = true)]
    pub desired: Vec<String>,

    /// Graphemes the reader knows (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub known: Vec<String>,

    /// Syllable counts to include (comma-separated).
    #[arg(long, value_delimiter = ',', default_values_t = [1, 2, 3])]
    pub syllables: Vec<u32>,

    /// Vocabulary groups to search (comma-separated; all when omitted).
    #[arg(long, value_delimiter = ',')]
    pub groups: Vec<usize>,

    /// Parts of speech to keep (comma-separated; only with --restrict).
    #[arg(long, value_delimiter = ',')]
    pub pos: Vec<String>,

    /// Keep only words made entirely of known graphemes.
    #[arg(long)]
    pub restrict: bool,

    /// Count uppercase forms of known graphemes as known.
    #[arg(long)]
    pub upper_case: bool,
}

/// List candidate words for a lesson.
#[instrument(name = "cmd_words", skip_all, fields(desired = args.desired.len()))]
pub fn cmd_words(
    args: WordsArgs,
    global_json: bool,
    default_lang: Option<&Utf8Path>,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(
        desired = ?args.desired,
        known = ?args.known,
        restrict = args.restrict,
        "executing words command"
    );

    let model = load_language(args.lang.as_deref(), default_lang, max_input_bytes)?;
    let query = CandidateQuery {
        desired: &args.desired,
        known: &args.known,
        restrict_to_known: args.restrict,
        allow_upper_case: args.upper_case,
        syllable_lengths: &args.syllables,
        groups: &args.groups,
        parts_of_speech: &args.pos,
    };
    let candidates = select_candidates(&model, &query)?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(candidates.as_slice())?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("{}", "no matching words".yellow());
        return Ok(());
    }
    for entry in candidates.iter() {
        println!(
            "{} {}",
            entry.name,
            format!("(group {}, {} syl, {}×)", entry.group, entry.syllables, entry.count).dimmed()
        );
    }

    Ok(())
}
