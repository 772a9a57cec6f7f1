use anyhow::{Context, Result};
use clap::Subcommand;
use wasm_doginals::address::{from_output_script, to_output_script};
use wasm_doginals::bitcoin::Script;
use wasm_doginals::Network;

use crate::network::NetworkArg;

#[derive(Subcommand)]
pub enum AddressCommand {
    /// Decode an address to its output script (hex)
    Decode {
        /// The address to decode
        address: String,
        /// Network (btc, ltc, doge, etc.)
        #[arg(short, long, value_enum, default_value = "doge")]
        network: NetworkArg,
    },
    /// Encode an output script (hex) to an address
    Encode {
        /// Output script as hex
        script: String,
        /// Network (btc, ltc, doge, etc.)
        #[arg(short, long, value_enum, default_value = "doge")]
        network: NetworkArg,
    },
}

pub fn handle_command(command: AddressCommand) -> Result<()> {
    match command {
        AddressCommand::Decode { address, network } => {
            let network: Network = network.into();
            let script = to_output_script(&address, &network.chain_params())
                .context("Failed to decode address")?;
            println!("{}", hex::encode(script.as_bytes()));
            Ok(())
        }
        AddressCommand::Encode { script, network } => {
            let network: Network = network.into();
            let script_bytes =
                hex::decode(&script).context("Invalid hex string for output script")?;
            let script_obj = Script::from_bytes(&script_bytes);
            let address = from_output_script(script_obj, &network.chain_params())
                .context("Failed to encode output script to address")?;
            println!("{}", address);
            Ok(())
        }
    }
}
