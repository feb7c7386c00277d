mod cli;
mod commands;
mod logging;

use std::process;

use clap::Parser;

use cli::{Cli, Commands};
use commands::{enrich, extend_grid, model};

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Enrich(args) => enrich::run(cli, args),
        Commands::Model(args) => model::run(cli, args),
        Commands::ExtendGrid(args) => extend_grid::run(cli, args),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
