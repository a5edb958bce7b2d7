//! Fragments command: split a story into sentences.

use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use decodable_core::fragments::{TextFragment, split_with_rules};
use decodable_core::punctuation::SentenceRules;

use super::read_input_file;

/// Arguments for the `fragments` subcommand.
#[derive(Args, Debug)]
pub struct FragmentsArgs {
    /// File to split.
    pub file: Utf8PathBuf,

    /// Extra sentence-ending characters (a space makes space a terminator).
    #[arg(long, value_name = "CHARS")]
    pub extra_punctuation: Option<String>,

    /// Also list the whitespace between sentences.
    #[arg(long)]
    pub all: bool,
}

#[derive(Serialize)]
struct FragmentRow<'a> {
    #[serde(flatten)]
    fragment: &'a TextFragment,
    word_count: usize,
}

/// Split a file into sentence fragments.
#[instrument(name = "cmd_fragments", skip_all, fields(file = %args.file))]
pub fn cmd_fragments(
    args: FragmentsArgs,
    global_json: bool,
    config_rules: SentenceRules,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, all = args.all, "executing fragments command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let rules = match &args.extra_punctuation {
        Some(extra) => SentenceRules::new().with_extra_punctuation(extra),
        None => config_rules,
    };

    let fragments = split_with_rules(&content, &rules);
    let shown: Vec<&TextFragment> = fragments
        .iter()
        .filter(|f| args.all || f.is_sentence)
        .collect();

    if global_json {
        let rows: Vec<FragmentRow<'_>> = shown
            .iter()
            .map(|f| FragmentRow {
                fragment: f,
                word_count: f.word_count(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut sentence_num = 0;
    for fragment in shown {
        if fragment.is_sentence {
            sentence_num += 1;
            println!(
                "{:>3} {} {}",
                sentence_num.to_string().bold(),
                format!("[{}]", fragment.word_count()).dimmed(),
                fragment.text
            );
        } else {
            println!("    {} {:?}", "space".dimmed(), fragment.text);
        }
    }

    Ok(())
}
