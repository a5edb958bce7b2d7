//! Tokenize command: list the words of a story.

use camino::Utf8PathBuf;
use clap::Args;
use tracing::{debug, instrument};

use decodable_core::words;

use super::read_input_file;

/// Arguments for the `tokenize` subcommand.
#[derive(Args, Debug)]
pub struct TokenizeArgs {
    /// File to tokenize.
    pub file: Utf8PathBuf,

    /// List each word once, in order of first appearance.
    #[arg(long)]
    pub unique: bool,

    /// Characters that are letters, never punctuation (e.g. `'`).
    #[arg(long, value_name = "CHARS")]
    pub letters: Option<String>,
}

/// Print the words of a file, one per line.
#[instrument(name = "cmd_tokenize", skip_all, fields(file = %args.file))]
pub fn cmd_tokenize(
    args: TokenizeArgs,
    global_json: bool,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, unique = args.unique, "executing tokenize command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let letters = args.letters.as_deref().filter(|l| !l.is_empty());
    let tokens = if args.unique {
        words::unique_words(&content, letters)
    } else {
        words::get_words(&content, letters)
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{token}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::write_temp;
    use super::*;

    #[test]
    fn tokenize_succeeds() {
        let (_dir, path) = write_temp("story.txt", "Don't stop. Don't!");
        let args = TokenizeArgs {
            file: path,
            unique: true,
            letters: Some("'".into()),
        };
        assert!(cmd_tokenize(args, true, None).is_ok());
    }
}
