//! sdrflow CLI - feed captured or synthetic I/Q through a spectrum flowgraph.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdrflow")]
#[command(author, version, about = "sdrflow spectrum flowgraph CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream samples through a flowgraph and report the spectrum
    Run(commands::run::RunArgs),

    /// Generate interleaved i8 I/Q test captures
    Generate(commands::generate::GenerateArgs),

    /// List block parameters or print the default configuration
    Params(commands::params::ParamsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Params(args) => commands::params::run(args),
    }
}
