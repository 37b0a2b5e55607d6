use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "ovnet")]
#[command(about = "ovnet manages overlay network endpoints and their addresses.")]
pub struct CLI {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate a config and list its networks.
    Check(CheckArgs),
    /// Apply a config's endpoint operations and show the result.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Path to the JSON config.
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the JSON config.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Threads used for consecutive create operations.
    #[arg(short, long, default_value_t = 1, value_parser(parse_workers))]
    pub workers: usize,
}

fn parse_workers(input: &str) -> Result<usize, String> {
    match input.trim().parse::<usize>() {
        Ok(0) => Err("workers must be at least 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
