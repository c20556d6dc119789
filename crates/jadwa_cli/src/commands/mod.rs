//! Command dispatch.

pub mod config;
pub mod leads;
pub mod parse;
pub mod prompt;
pub mod study;

use anyhow::Result;

use crate::cli::{Cli, Command};

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Study {
            input,
            export,
            markdown,
        } => study::handle(input, export, markdown).await,
        Command::Prompt { input } => prompt::handle(input),
        Command::Parse { mode, file } => parse::handle(mode, file),
        Command::Leads { action } => leads::handle(action),
        Command::Config { action } => config::handle(action),
    }
}
