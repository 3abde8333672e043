//! docmux CLI: search several offline docsets at once.
//!
//! Merges the symbol indexes of the given docsets, lets the user pick an
//! entry interactively, and prints the document path of the pick.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
