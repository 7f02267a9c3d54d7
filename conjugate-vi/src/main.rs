mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{run_gmm, run_ugm, Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Gmm(args) => {
            run_gmm(args)?;
        }
        Commands::Ugm(args) => {
            run_ugm(args)?;
        }
    }

    Ok(())
}
