use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::input::{decode_input, read_input_bytes};
use wasm_doginals::address::from_output_script;
use wasm_doginals::bitcoin::consensus::encode::deserialize;
use wasm_doginals::bitcoin::Transaction;
use wasm_doginals::inscriptions::INSCRIPTION_MARKER;
use wasm_doginals::script::Script;
use wasm_doginals::{ChainParams, Network};

/// Short description of an unlock script that reveals part of an envelope
fn describe_envelope(script_sig: &[u8]) -> Option<String> {
    let script = Script::decode(script_sig).ok()?;
    let chunks = script.chunks();
    // the partial is followed by the signature and the redeem script
    let revealed = chunks.len().checked_sub(2)?;
    if revealed == 0 {
        return None;
    }
    if chunks[0].data() == Some(INSCRIPTION_MARKER) {
        let content_type = chunks
            .get(2)
            .and_then(|c| c.data())
            .map(|d| String::from_utf8_lossy(d).into_owned())
            .unwrap_or_default();
        Some(format!(
            "inscription start ({}), {} chunks",
            content_type, revealed
        ))
    } else if revealed % 2 == 0 && chunks.get(revealed + 1)?.len() > 33 {
        Some(format!("inscription continuation, {} chunks", revealed))
    } else {
        None
    }
}

fn format_lines(tx: &Transaction, params: &ChainParams) -> Vec<(String, String)> {
    let mut lines = vec![
        ("txid".to_string(), tx.compute_txid().to_string()),
        ("version".to_string(), tx.version.0.to_string()),
        (
            "locktime".to_string(),
            tx.lock_time.to_consensus_u32().to_string(),
        ),
    ];
    for (i, input) in tx.input.iter().enumerate() {
        lines.push((
            format!("input {}", i),
            format!(
                "{} sequence 0x{:08x}",
                input.previous_output, input.sequence.0
            ),
        ));
        if let Some(envelope) = describe_envelope(input.script_sig.as_bytes()) {
            lines.push((format!("input {} reveals", i), envelope));
        }
    }
    for (i, output) in tx.output.iter().enumerate() {
        let destination = from_output_script(&output.script_pubkey, params)
            .unwrap_or_else(|_| output.script_pubkey.to_hex_string());
        lines.push((
            format!("output {}", i),
            format!("{} -> {}", output.value.to_sat(), destination),
        ));
    }
    lines
}

pub fn handle_decode_command(path: PathBuf, no_color: bool, network: Network) -> Result<()> {
    let raw_bytes = read_input_bytes(&path, "transaction")?;
    let bytes = decode_input(&raw_bytes);
    let tx: Transaction = deserialize(&bytes).context("Failed to decode transaction")?;

    if no_color {
        colored::control::set_override(false);
    }
    for (label, value) in format_lines(&tx, &network.chain_params()) {
        println!("{:>18}: {}", label.bold(), value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_txs() -> (Transaction, Transaction) {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../test/fixtures/doge_drc20_mint.json");
        let fixture: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        let commit = hex::decode(fixture["expected"]["commitTx"].as_str().unwrap()).unwrap();
        let reveal = hex::decode(fixture["expected"]["revealTxs"][0].as_str().unwrap()).unwrap();
        (deserialize(&commit).unwrap(), deserialize(&reveal).unwrap())
    }

    #[test]
    fn test_commit_outputs_are_named() {
        let (commit, _) = fixture_txs();
        let lines = format_lines(&commit, &Network::Dogecoin.chain_params());
        let outputs: Vec<_> = lines
            .iter()
            .filter(|(label, _)| label.starts_with("output"))
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(
            outputs,
            vec![
                "100000 -> 9teShYqmoo2J4sXEqrHVmcyLatnMwZUcE9",
                "46600000 -> DFuDR3Vn22KMnrnVCxh6YavMAJP8TCPeA2",
                "241350000 -> DFuDR3Vn22KMnrnVCxh6YavMAJP8TCPeA2",
            ]
        );
    }

    #[test]
    fn test_reveal_input_is_described() {
        let (_, reveal) = fixture_txs();
        assert_eq!(
            describe_envelope(reveal.input[0].script_sig.as_bytes()).as_deref(),
            Some("inscription start (text/plain;charset=utf8), 5 chunks")
        );
        assert_eq!(describe_envelope(reveal.input[1].script_sig.as_bytes()), None);
    }

    #[test]
    fn test_decode_input_accepts_hex() {
        assert_eq!(decode_input(b"  0a0b\n"), vec![0x0a, 0x0b]);
        assert_eq!(decode_input(&[0x01, 0xff]), vec![0x01, 0xff]);
    }
}
