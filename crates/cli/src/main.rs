use std::process::ExitCode;

use clap::Parser;

mod commands;
mod printer;

use commands::{Cli, Command};
use sttree_runtime::logging;

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Index(args) => commands::index::run(args),
        Command::Preview(args) => commands::preview::run(args),
        Command::Cache(args) => commands::cache::run(args),
    }
}
