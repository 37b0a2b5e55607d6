use std::env;
use std::process::exit;

use clap::Parser;
use log::error;

use ovnet::front::{check, run, Commands, CLI};

fn main() {
    let cli = CLI::parse();

    if env::var_os("RUST_LOG").is_none() {
        let level = if cli.verbose { "debug" } else { "info" };
        env::set_var("RUST_LOG", level);
    }
    env_logger::init();

    let result = match cli.command {
        Commands::Check(args) => check(args),
        Commands::Run(args) => run(args),
    };

    if let Err(e) = result {
        error!("{e:#}");
        exit(-1);
    }
}
