//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

/// Run a spell combat scenario many times and summarize the results
#[derive(Parser, Debug)]
#[command(name = "spell_sim")]
#[command(about = "Monte-Carlo spell combat simulator")]
#[command(version)]
pub struct Args {
    /// Scenario TOML file
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// Override the scenario's iteration count
    #[arg(short, long)]
    pub iterations: Option<u32>,

    /// Override the scenario's base seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Combat constants TOML file, replacing the scenario's constants
    #[arg(long, value_name = "CONSTANTS_FILE")]
    pub constants: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
