//! Kingside - terminal chess against a remote rules engine.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use kingside::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    kingside::tui::run(cli).await
}
