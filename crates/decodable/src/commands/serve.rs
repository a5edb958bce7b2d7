//! Serve command: run the MCP server on stdio.

use anyhow::Context;
use camino::Utf8Path;
use clap::Args;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing::{info, instrument};

use decodable_core::config::Config;
use decodable_core::language::store;

use super::load_language;
use crate::server::DecodableServer;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {}

/// Start the MCP server, preloading the configured language if any.
#[instrument(name = "cmd_serve", skip_all)]
pub async fn cmd_serve(
    _args: ServeArgs,
    max_input_bytes: Option<usize>,
    config: Config,
    default_lang: Option<&Utf8Path>,
) -> anyhow::Result<()> {
    if let Some(path) = default_lang {
        let model = load_language(Some(path), None, max_input_bytes)?;
        store::install(model);
    }

    let server = DecodableServer::new(max_input_bytes, config.sentence_rules());
    info!("starting MCP server on stdio");
    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await.context("MCP server terminated abnormally")?;
    info!("MCP server stopped");
    Ok(())
}
