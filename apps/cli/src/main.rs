//! docbundle CLI: aggregates markdown documentation into single-file
//! artifacts (`llms-full.txt` and per-language single-page manuals).

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
