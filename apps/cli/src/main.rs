//! pageforge CLI: turn Word-exported review documents into finished pages.
//!
//! Converts single files from the command line or serves the upload
//! endpoint over HTTP.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
