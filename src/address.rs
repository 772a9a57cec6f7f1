//! Base58 address and WIF helpers

use crate::error::InscriptionError;
use crate::networks::{ChainParams, Network};
use miniscript::bitcoin::base58;
use miniscript::bitcoin::hashes::{hash160, Hash};
use miniscript::bitcoin::secp256k1::SecretKey;
use miniscript::bitcoin::{NetworkKind, PrivateKey, PubkeyHash, Script, ScriptBuf, ScriptHash};

/// Decode a base58check address into its output script.
///
/// Only P2PKH and P2SH are representable; the version byte must belong to
/// `params`.
pub fn to_output_script(address: &str, params: &ChainParams) -> Result<ScriptBuf, InscriptionError> {
    let payload = base58::decode_check(address)
        .map_err(|e| InscriptionError::invalid_address(address, e))?;
    if payload.len() != 21 {
        return Err(InscriptionError::invalid_address(
            address,
            format!("expected 21 byte payload, got {}", payload.len()),
        ));
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);

    match payload[0] {
        v if v == params.pub_key_hash => {
            Ok(ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(hash)))
        }
        v if v == params.script_hash => Ok(ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(hash))),
        v => Err(InscriptionError::invalid_address(
            address,
            format!("unexpected version byte 0x{:02x}", v),
        )),
    }
}

/// Encode a P2PKH or P2SH output script as a base58check address.
pub fn from_output_script(script: &Script, params: &ChainParams) -> Result<String, InscriptionError> {
    let bytes = script.as_bytes();
    let (version, hash) = if script.is_p2pkh() {
        (params.pub_key_hash, &bytes[3..23])
    } else if script.is_p2sh() {
        (params.script_hash, &bytes[2..22])
    } else {
        return Err(InscriptionError::invalid_address(
            &hex::encode(bytes),
            "output script has no base58 address form",
        ));
    };
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(hash);
    Ok(base58::encode_check(&payload))
}

/// Address paying to the hash of `redeem_script`.
pub fn p2sh_address(redeem_script: &Script, params: &ChainParams) -> String {
    let hash = hash160::Hash::hash(redeem_script.as_bytes());
    let mut payload = Vec::with_capacity(21);
    payload.push(params.script_hash);
    payload.extend_from_slice(hash.as_byte_array());
    base58::encode_check(&payload)
}

/// Decode a WIF private key.
///
/// The version byte is not checked against a network: funding keys are
/// routinely exported from wallets using another chain's prefix, and the
/// key material is the same on every chain.
pub fn decode_wif(wif: &str) -> Result<PrivateKey, InscriptionError> {
    let data = base58::decode_check(wif)
        .map_err(|e| InscriptionError::InvalidKey(format!("bad WIF encoding: {}", e)))?;

    let compressed = match data.len() {
        33 => false,
        34 if data[33] == 0x01 => true,
        34 => {
            return Err(InscriptionError::InvalidKey(format!(
                "bad compression flag 0x{:02x}",
                data[33]
            )))
        }
        n => {
            return Err(InscriptionError::InvalidKey(format!(
                "unexpected WIF payload length {}",
                n
            )))
        }
    };

    let inner = SecretKey::from_slice(&data[1..33])
        .map_err(|e| InscriptionError::InvalidKey(e.to_string()))?;

    let is_test = Network::all()
        .iter()
        .any(|n| n.is_testnet() && n.chain_params().wif == data[0]);
    let network = if is_test {
        NetworkKind::Test
    } else {
        NetworkKind::Main
    };

    Ok(PrivateKey {
        compressed,
        network,
        inner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniscript::bitcoin::secp256k1::Secp256k1;

    const DOGE_ADDRESS: &str = "DFuDR3Vn22KMnrnVCxh6YavMAJP8TCPeA2";

    #[test]
    fn test_p2pkh_address_round_trip() {
        let params = Network::Dogecoin.chain_params();
        let script = to_output_script(DOGE_ADDRESS, &params).unwrap();
        assert!(script.is_p2pkh());
        assert_eq!(
            hex::encode(script.as_bytes()),
            "76a91476094cb45e019a8942a4861c02f4fd766bb662e588ac"
        );
        assert_eq!(from_output_script(&script, &params).unwrap(), DOGE_ADDRESS);
    }

    #[test]
    fn test_address_from_other_network_is_rejected() {
        let params = Network::Bitcoin.chain_params();
        let err = to_output_script(DOGE_ADDRESS, &params).unwrap_err();
        assert!(matches!(err, InscriptionError::InvalidAddress { .. }));
    }

    #[test]
    fn test_bad_checksum_is_rejected() {
        let params = Network::Dogecoin.chain_params();
        assert!(to_output_script("DFuDR3Vn22KMnrnVCxh6YavMAJP8TCPeA3", &params).is_err());
    }

    #[test]
    fn test_p2sh_address_round_trip() {
        let params = Network::Dogecoin.chain_params();
        let redeem = ScriptBuf::from_bytes(vec![0x51]);
        let address = p2sh_address(&redeem, &params);
        let script = to_output_script(&address, &params).unwrap();
        assert_eq!(script, redeem.to_p2sh());
        assert!(address.starts_with('9') || address.starts_with('A'));
    }

    #[test]
    fn test_decode_wif_accepts_foreign_prefix() {
        let key = decode_wif("cPnvkvUYyHcSSS26iD1dkrJdV7k1RoUqJLhn3CYxpo398PdLVE22").unwrap();
        assert!(key.compressed);
        assert_eq!(key.network, NetworkKind::Test);

        let secp = Secp256k1::new();
        assert_eq!(
            key.public_key(&secp).to_string(),
            "0357bbb2d4a9cb8a2357633f201b9c518c2795ded682b7913c6beef3fe23bd6d2f"
        );
    }

    #[test]
    fn test_decode_wif_rejects_garbage() {
        assert!(matches!(
            decode_wif("not-a-key"),
            Err(InscriptionError::InvalidKey(_))
        ));
    }
}
