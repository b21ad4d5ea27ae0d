//! CLI module for Lorebot
//!
//! Subcommands:
//! - `serve`: HTTP API and chat event endpoint
//! - `ask`: answer one question from the terminal
//! - `ingest`: load a text file or an inbox directory into the knowledge index

pub mod ask;
pub mod ingest;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Lorebot - knowledge retrieval and answer orchestration
#[derive(Parser)]
#[command(name = "lorebot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Answer a single question
    Ask(ask::AskArgs),

    /// Ingest a text file or every `.txt` file in a directory
    Ingest(ingest::IngestArgs),
}

/// Load `.env`, the layered configuration and the log subscriber
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}
