use anyhow::Result;
use clap::{Parser, Subcommand};

mod address;
mod inscribe;
mod input;
mod network;
mod tx;

use network::NetworkArg;

#[derive(Parser)]
#[command(name = "wasm-doginals-cli")]
#[command(about = "Build doginals inscriptions and inspect legacy transactions", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build signed commit and reveal transactions from a JSON request
    Inscribe {
        /// Path to the request file (use '-' to read from stdin)
        path: std::path::PathBuf,
        /// Network of the addresses in the request
        #[arg(short, long, value_enum, default_value = "doge")]
        network: NetworkArg,
    },
    /// Address encoding and decoding
    Address {
        #[command(subcommand)]
        command: address::AddressCommand,
    },
    /// Transaction inspection
    Tx {
        #[command(subcommand)]
        command: tx::TxCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Inscribe { path, network } => inscribe::handle_inscribe_command(path, network),
        Commands::Address { command } => address::handle_command(command),
        Commands::Tx { command } => tx::handle_command(command),
    }
}
