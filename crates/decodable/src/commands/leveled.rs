//! Leveled command: check sentence and story length limits.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use decodable_core::leveled;
use decodable_core::punctuation::SentenceRules;

use super::read_input_file;

/// Arguments for the `leveled` subcommand.
#[derive(Args, Debug)]
pub struct LeveledArgs {
    /// Story file to check.
    pub file: Utf8PathBuf,

    /// Maximum words in any one sentence.
    #[arg(long)]
    pub max_words_per_sentence: Option<usize>,

    /// Maximum words in the whole story.
    #[arg(long)]
    pub max_words: Option<usize>,
}

/// Check a story against leveled-reader length limits.
#[instrument(name = "cmd_leveled", skip_all, fields(file = %args.file))]
pub fn cmd_leveled(
    args: LeveledArgs,
    global_json: bool,
    rules: &SentenceRules,
    config_max_words_per_sentence: Option<usize>,
    config_max_words: Option<usize>,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(
        file = %args.file,
        max_words_per_sentence = ?args.max_words_per_sentence,
        max_words = ?args.max_words,
        "executing leveled command"
    );

    let content = read_input_file(&args.file, max_input_bytes)?;
    let per_sentence = args.max_words_per_sentence.or(config_max_words_per_sentence);
    let story_max = args.max_words.or(config_max_words);

    let report = leveled::check_leveled(&content, rules, per_sentence, story_max)
        .with_context(|| format!("failed to check {}", args.file))?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{}: {} sentences, {} words, longest {}, average {:.1}",
        args.file, report.sentences, report.words, report.longest, report.avg_length
    );
    for long in &report.long_sentences {
        println!(
            "  {} sentence {} has {} words: {}",
            "LONG:".yellow(),
            long.sentence_num,
            long.word_count,
            long.text.trim()
        );
    }

    if !report.passes() {
        let mut problems = Vec::new();
        if let Some(max) = report.max_words_per_sentence
            && !report.long_sentences.is_empty()
        {
            problems.push(format!(
                "{} sentence(s) over {max} words",
                report.long_sentences.len()
            ));
        }
        if report.over_max_words
            && let Some(max) = report.max_words
        {
            problems.push(format!("{} words (max: {max})", report.words));
        }
        bail!("{} is too long for its level: {}", args.file, problems.join("; "));
    }
    if per_sentence.is_some() || story_max.is_some() {
        println!("{} {}", "PASS:".green(), args.file);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::write_temp;
    use super::*;

    #[test]
    fn passes_within_limits() {
        let (_dir, path) = write_temp("story.txt", "The cat sat. The cat ran.");
        let args = LeveledArgs {
            file: path,
            max_words_per_sentence: Some(3),
            max_words: None,
        };
        assert!(cmd_leveled(args, false, &SentenceRules::new(), None, Some(10), None).is_ok());
    }

    #[test]
    fn config_limit_applies_when_flag_absent() {
        let (_dir, path) = write_temp("story.txt", "The big fat cat sat on the mat.");
        let args = LeveledArgs {
            file: path,
            max_words_per_sentence: None,
            max_words: None,
        };
        let err = cmd_leveled(args, false, &SentenceRules::new(), Some(5), None, None).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn empty_story_fails() {
        let (_dir, path) = write_temp("story.txt", "   ");
        let args = LeveledArgs {
            file: path,
            max_words_per_sentence: None,
            max_words: None,
        };
        assert!(cmd_leveled(args, true, &SentenceRules::new(), None, None, None).is_err());
    }
}
