use anyhow::Result;
use clap::Subcommand;

use crate::network::NetworkArg;

mod decode;

#[derive(Subcommand)]
pub enum TxCommand {
    /// Decode a legacy transaction (hex or raw) and display its contents
    Decode {
        /// Path to the transaction file (use '-' to read from stdin)
        path: std::path::PathBuf,
        /// Network for address formatting
        #[arg(long, short, value_enum, default_value = "doge")]
        network: NetworkArg,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

pub fn handle_command(command: TxCommand) -> Result<()> {
    match command {
        TxCommand::Decode {
            path,
            no_color,
            network,
        } => decode::handle_decode_command(path, no_color, network.into()),
    }
}
