use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use bvdb::cli;
use bvdb::commands;
use bvdb::logging;

fn main() -> Result<()> {
    logging::init_subscriber();
    let args = cli::Cli::parse();
    let log = Arc::new(logging::Logger::new(args.verbose));

    match args.command {
        cli::Command::Provision(opts) => commands::provision::run(&args.global, &opts, log),
        cli::Command::Version => {
            let version = option_env!("BVDB_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            #[allow(clippy::print_stdout)]
            {
                println!("bvdb {version}");
            }
            Ok(())
        }
    }
}
