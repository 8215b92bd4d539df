use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the site provisioning tool.
#[derive(Parser, Debug)]
#[command(
    name = "bvdb",
    about = "Provision a web project from a remote setup bundle",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the project root directory (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the setup bundle and provision the project
    Provision(ProvisionOpts),
    /// Print version information
    Version,
}

/// Options for the `provision` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ProvisionOpts {
    /// Path to the provisioning config, relative to the project root
    #[arg(short, long, default_value = "provision.toml")]
    pub config: std::path::PathBuf,

    /// Answer every prompt with its default instead of asking
    #[arg(long)]
    pub defaults: bool,
}
