//! decodable CLI
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use decodable::{Cli, Commands, commands};
use decodable_core::config::ConfigLoader;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    if cli.version_only {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // arg_required_else_help ensures we have --version-only or a subcommand
    let Some(command) = cli.command else {
        return Ok(());
    };

    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = camino::Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;
    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if let Some(ref config_path) = cli.config {
        let config_path = camino::Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(&config_path);
    }
    let (config, config_sources) = loader.load().context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig::from_env_with_overrides(
        config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
    );
    let env_filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    let _guard = observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize logging/tracing")?;

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        chdir = ?cli.chdir,
        "CLI initialized"
    );

    let max_input = config.input_limit();
    let default_lang = config.language_data_path(config_sources.primary_dir());
    let default_lang = default_lang.as_deref();

    // Execute command
    let result = match command {
        Commands::Classify(args) => commands::classify::cmd_classify(
            args,
            cli.json,
            default_lang,
            config.sight_words.as_deref(),
            max_input,
        ),
        Commands::Fragments(args) => {
            commands::fragments::cmd_fragments(args, cli.json, config.sentence_rules(), max_input)
        }
        Commands::Tokenize(args) => commands::tokenize::cmd_tokenize(args, cli.json, max_input),
        Commands::Segment(args) => {
            commands::segment::cmd_segment(args, cli.json, default_lang, max_input)
        }
        Commands::Words(args) => commands::words::cmd_words(args, cli.json, default_lang, max_input),
        Commands::Graphemes(args) => {
            commands::graphemes::cmd_graphemes(args, cli.json, default_lang, max_input)
        }
        Commands::Leveled(args) => commands::leveled::cmd_leveled(
            args,
            cli.json,
            &config.sentence_rules(),
            config.max_words_per_sentence,
            config.max_words,
            max_input,
        ),
        Commands::Info(args) => commands::info::cmd_info(args, cli.json, &config, &config_sources),
        #[cfg(feature = "mcp")]
        Commands::Serve(args) => {
            let rt = tokio::runtime::Runtime::new()
                .context("failed to create async runtime for MCP server")?;
            rt.block_on(commands::serve::cmd_serve(
                args,
                max_input,
                config,
                default_lang,
            ))
        }
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
