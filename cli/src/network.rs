//! Network argument type for CLI commands

use clap::ValueEnum;
use wasm_doginals::Network;

/// CLI argument type for network selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NetworkArg {
    Btc,
    Tbtc,
    Ltc,
    Tltc,
    Doge,
    Tdoge,
}

impl From<NetworkArg> for Network {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Btc => Network::Bitcoin,
            NetworkArg::Tbtc => Network::BitcoinTestnet3,
            NetworkArg::Ltc => Network::Litecoin,
            NetworkArg::Tltc => Network::LitecoinTestnet,
            NetworkArg::Doge => Network::Dogecoin,
            NetworkArg::Tdoge => Network::DogecoinTestnet,
        }
    }
}
