// scenescribe-cli/src/main.rs
//
// Binary entry point: parses arguments, configures logging, and dispatches
// to the subcommand implementations in the library portion of the crate.

use clap::Parser;
use console::style;
use scenescribe_cli::{run_info, run_process, Cli, Commands};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Process(args) => run_process(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(e) = result {
        eprintln!("{} {e}", style("Error:").red().bold());
        process::exit(1);
    }
}
