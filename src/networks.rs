//! Chain parameters for the base58, non-segwit networks the inscription
//! builder supports.

/// Version bytes needed to encode addresses and interpret keys.
///
/// Passed explicitly into every builder; there is no process-wide network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainParams {
    pub pub_key_hash: u8,
    pub script_hash: u8,
    pub wif: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Bitcoin,
    BitcoinTestnet3,
    Litecoin,
    LitecoinTestnet,
    Dogecoin,
    DogecoinTestnet,
}

impl Network {
    pub fn all() -> &'static [Network] {
        &[
            Network::Bitcoin,
            Network::BitcoinTestnet3,
            Network::Litecoin,
            Network::LitecoinTestnet,
            Network::Dogecoin,
            Network::DogecoinTestnet,
        ]
    }

    pub fn chain_params(&self) -> ChainParams {
        match self {
            Network::Bitcoin => ChainParams {
                pub_key_hash: 0x00,
                script_hash: 0x05,
                wif: 0x80,
            },
            Network::BitcoinTestnet3 => ChainParams {
                pub_key_hash: 0x6f,
                script_hash: 0xc4,
                wif: 0xef,
            },
            Network::Litecoin => ChainParams {
                pub_key_hash: 0x30,
                script_hash: 0x32,
                wif: 0xb0,
            },
            Network::LitecoinTestnet => ChainParams {
                pub_key_hash: 0x6f,
                script_hash: 0x3a,
                wif: 0xef,
            },
            Network::Dogecoin => ChainParams {
                pub_key_hash: 0x1e,
                script_hash: 0x16,
                wif: 0x9e,
            },
            Network::DogecoinTestnet => ChainParams {
                pub_key_hash: 0x71,
                script_hash: 0xc4,
                wif: 0xf1,
            },
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(
            self,
            Network::BitcoinTestnet3 | Network::LitecoinTestnet | Network::DogecoinTestnet
        )
    }

    pub fn from_coin_name(name: &str) -> Option<Network> {
        match name {
            "btc" => Some(Network::Bitcoin),
            "tbtc" => Some(Network::BitcoinTestnet3),
            "ltc" => Some(Network::Litecoin),
            "tltc" => Some(Network::LitecoinTestnet),
            "doge" => Some(Network::Dogecoin),
            "tdoge" => Some(Network::DogecoinTestnet),
            _ => None,
        }
    }

    pub fn from_utxolib_name(name: &str) -> Option<Network> {
        match name {
            "bitcoin" => Some(Network::Bitcoin),
            "testnet" => Some(Network::BitcoinTestnet3),
            "litecoin" => Some(Network::Litecoin),
            "litecoinTest" => Some(Network::LitecoinTestnet),
            "dogecoin" => Some(Network::Dogecoin),
            "dogecoinTest" => Some(Network::DogecoinTestnet),
            _ => None,
        }
    }
}
