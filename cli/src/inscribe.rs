use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::input::read_input_bytes;
use crate::network::NetworkArg;
use wasm_doginals::inscriptions::{InscriptionData, PrevOutput};
use wasm_doginals::{inscribe, InscriptionRequest, InscriptionResult, Network};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrevOutputJson {
    tx_id: String,
    v_out: u32,
    amount: u64,
    address: String,
    private_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InscriptionDataJson {
    content_type: String,
    /// UTF-8 body
    #[serde(default)]
    body: Option<String>,
    /// Binary body as hex, takes precedence over `body`
    #[serde(default)]
    body_hex: Option<String>,
    reveal_addr: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InscriptionRequestJson {
    commit_tx_prev_output_list: Vec<PrevOutputJson>,
    commit_fee_rate: u64,
    reveal_fee_rate: u64,
    #[serde(default)]
    reveal_out_value: u64,
    inscription_data: InscriptionDataJson,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    dust_min_value: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InscriptionResultJson {
    commit_tx: String,
    reveal_txs: Vec<String>,
    commit_tx_fee: u64,
    reveal_tx_fees: Vec<u64>,
    commit_addrs: Vec<String>,
}

impl TryFrom<InscriptionRequestJson> for InscriptionRequest {
    type Error = anyhow::Error;

    fn try_from(json: InscriptionRequestJson) -> Result<Self> {
        let data = json.inscription_data;
        let body = match (data.body_hex, data.body) {
            (Some(hex_body), _) => hex::decode(hex_body).context("Invalid bodyHex")?,
            (None, Some(text)) => text.into_bytes(),
            (None, None) => bail!("inscriptionData needs body or bodyHex"),
        };
        Ok(InscriptionRequest {
            commit_tx_prev_outputs: json
                .commit_tx_prev_output_list
                .into_iter()
                .map(|p| PrevOutput {
                    txid: p.tx_id,
                    vout: p.v_out,
                    amount: p.amount,
                    address: p.address,
                    private_key: p.private_key,
                })
                .collect(),
            commit_fee_rate: json.commit_fee_rate,
            reveal_fee_rate: json.reveal_fee_rate,
            reveal_out_value: json.reveal_out_value,
            inscription_data: InscriptionData {
                content_type: data.content_type,
                body,
                reveal_address: data.reveal_addr,
            },
            change_address: json.address,
            min_change_value: json.dust_min_value,
        })
    }
}

impl From<InscriptionResult> for InscriptionResultJson {
    fn from(result: InscriptionResult) -> Self {
        InscriptionResultJson {
            commit_tx: result.commit_tx,
            reveal_txs: result.reveal_txs,
            commit_tx_fee: result.commit_tx_fee,
            reveal_tx_fees: result.reveal_tx_fees,
            commit_addrs: result.commit_addrs,
        }
    }
}

fn parse_request(bytes: &[u8]) -> Result<InscriptionRequest> {
    let json: InscriptionRequestJson =
        serde_json::from_slice(bytes).context("Failed to parse inscription request")?;
    json.try_into()
}

fn run_request(request: &InscriptionRequest, network: Network) -> Result<InscriptionResult> {
    let outcome = inscribe(network.chain_params(), request)?;
    if !outcome.is_success() {
        log::warn!("insufficient balance, the result only carries the fee schedule");
    }
    Ok(outcome.into_result())
}

pub fn handle_inscribe_command(path: PathBuf, network: NetworkArg) -> Result<()> {
    let bytes = read_input_bytes(&path, "inscription request")?;
    let request = parse_request(&bytes)?;
    let result = run_request(&request, network.into())?;
    println!(
        "{}",
        serde_json::to_string_pretty(&InscriptionResultJson::from(result))?
    );
    Ok(())
}
