use std::collections::HashSet;
use std::str::FromStr;

use crate::address::{decode_wif, to_output_script};
use crate::error::InscriptionError;
use crate::networks::ChainParams;
use log::debug;
use miniscript::bitcoin::{Amount, OutPoint, PrivateKey, ScriptBuf, TxOut, Txid};

use super::commit::{fund_commit_tx, CommitFunding, CommitTemplate};
use super::envelope::{build_inscription_contexts, PartialContext};
use super::reveal::{estimate_reveal_chain, link_and_sign_reveal_chain, new_input};
use super::signer::PrevOutputs;
use super::types::{InscriptionData, InscriptionOutcome, InscriptionRequest, InscriptionTxs};

/// Value of each reveal output when the request leaves it at 0
pub const DEFAULT_REVEAL_OUT_VALUE: u64 = 100_000;

/// Smallest commit change kept as an output when the request sets none
pub const DEFAULT_MIN_CHANGE_VALUE: u64 = 100_000;

/// A validated inscription request, ready to be built.
///
/// Every key, address and txid is decoded up front so a bad request fails
/// before anything is signed.
#[derive(Debug)]
pub struct DogeInscriptionTool {
    params: ChainParams,
    commit_fee_rate: u64,
    reveal_fee_rate: u64,
    reveal_out_value: u64,
    min_change_value: u64,
    inputs: Vec<OutPoint>,
    keys: Vec<PrivateKey>,
    prev_outputs: PrevOutputs,
    sender_script: ScriptBuf,
    change_script: ScriptBuf,
    inscription_data: InscriptionData,
}

impl DogeInscriptionTool {
    pub fn new(params: ChainParams, request: &InscriptionRequest) -> Result<Self, InscriptionError> {
        if request.commit_fee_rate == 0 || request.reveal_fee_rate == 0 {
            return Err(InscriptionError::InvalidRequest(
                "fee rates must be positive".to_string(),
            ));
        }
        let first = request.commit_tx_prev_outputs.first().ok_or_else(|| {
            InscriptionError::InvalidRequest("no outputs to fund the commit transaction".to_string())
        })?;

        let mut inputs = Vec::with_capacity(request.commit_tx_prev_outputs.len());
        let mut keys = Vec::with_capacity(request.commit_tx_prev_outputs.len());
        let mut prev_outputs = PrevOutputs::new();
        let mut seen = HashSet::new();

        for prev in &request.commit_tx_prev_outputs {
            let outpoint = OutPoint {
                txid: Txid::from_str(&prev.txid)
                    .map_err(|_| InscriptionError::InvalidTxid(prev.txid.clone()))?,
                vout: prev.vout,
            };
            if !seen.insert(outpoint) {
                return Err(InscriptionError::InvalidRequest(format!(
                    "output {} is listed twice",
                    outpoint
                )));
            }
            prev_outputs.add(
                outpoint,
                TxOut {
                    value: Amount::from_sat(prev.amount),
                    script_pubkey: to_output_script(&prev.address, &params)?,
                },
            );
            keys.push(decode_wif(&prev.private_key)?);
            inputs.push(outpoint);
        }

        let sender_script = to_output_script(&first.address, &params)?;
        // every reveal spends the sender output with a P2PKH unlock
        if !sender_script.is_p2pkh() {
            return Err(InscriptionError::invalid_address(
                &first.address,
                "the first funding output must be pay-to-pubkey-hash",
            ));
        }
        let change_script = match &request.change_address {
            Some(address) if !address.is_empty() => to_output_script(address, &params)?,
            _ => sender_script.clone(),
        };
        // fail on a bad destination before any signing happens
        to_output_script(&request.inscription_data.reveal_address, &params)?;

        let reveal_out_value = match request.reveal_out_value {
            0 => DEFAULT_REVEAL_OUT_VALUE,
            v => v,
        };
        let min_change_value = match request.min_change_value {
            None | Some(0) => DEFAULT_MIN_CHANGE_VALUE,
            Some(v) => v,
        };

        Ok(DogeInscriptionTool {
            params,
            commit_fee_rate: request.commit_fee_rate,
            reveal_fee_rate: request.reveal_fee_rate,
            reveal_out_value,
            min_change_value,
            inputs,
            keys,
            prev_outputs,
            sender_script,
            change_script,
            inscription_data: request.inscription_data.clone(),
        })
    }

    /// Key of the first funding output. Signs every reveal input.
    fn funding_key(&self) -> &PrivateKey {
        &self.keys[0]
    }

    fn contexts(&self) -> Result<Vec<PartialContext>, InscriptionError> {
        build_inscription_contexts(
            &self.params,
            self.funding_key(),
            &self.inscription_data,
            self.reveal_out_value,
        )
    }

    /// Build and sign the commit transaction and the reveal chain.
    ///
    /// Reported fees are what each signed transaction actually leaves to
    /// miners: inputs minus outputs.
    pub fn run(mut self) -> Result<InscriptionOutcome, InscriptionError> {
        let contexts = self.contexts()?;
        let estimate = estimate_reveal_chain(&contexts, &self.sender_script, self.reveal_fee_rate)?;
        debug!(
            "inscription of {} bytes split into {} partial scripts",
            self.inscription_data.body.len(),
            contexts.len()
        );

        let template = CommitTemplate {
            inputs: self.inputs.iter().copied().map(new_input).collect(),
            reveal_output: contexts[0].commit_output.clone(),
            funding_output: TxOut {
                value: Amount::from_sat(estimate.total_funding),
                script_pubkey: self.sender_script.clone(),
            },
            change_script: self.change_script.clone(),
        };

        let commit_tx = match fund_commit_tx(
            template,
            &self.keys,
            &self.prev_outputs,
            self.commit_fee_rate,
            self.min_change_value,
        )? {
            CommitFunding::Funded { tx, .. } => tx,
            CommitFunding::Insufficient { fee } => {
                debug!("insufficient balance, commit fee would be {}", fee);
                return Ok(InscriptionOutcome::InsufficientFunds {
                    commit_tx_fee: fee,
                    reveal_tx_fees: estimate.fees,
                    commit_addrs: estimate.commit_addrs,
                });
            }
        };

        let mut reveal_txs = estimate.txs;
        let funding_key = *self.funding_key();
        link_and_sign_reveal_chain(
            &commit_tx,
            &mut reveal_txs,
            &contexts,
            &funding_key,
            &self.sender_script,
            &mut self.prev_outputs,
        )?;

        let commit_tx_fee = self.prev_outputs.fee(&commit_tx)?;
        let reveal_tx_fees = reveal_txs
            .iter()
            .map(|tx| self.prev_outputs.fee(tx))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "commit {} fee {}, reveal fees {:?}",
            commit_tx.compute_txid(),
            commit_tx_fee,
            reveal_tx_fees
        );

        Ok(InscriptionOutcome::Success(InscriptionTxs {
            commit_tx,
            reveal_txs,
            commit_tx_fee,
            reveal_tx_fees,
            commit_addrs: estimate.commit_addrs,
        }))
    }
}

/// Validate `request` and build its commit and reveal transactions.
pub fn inscribe(
    params: ChainParams,
    request: &InscriptionRequest,
) -> Result<InscriptionOutcome, InscriptionError> {
    DogeInscriptionTool::new(params, request)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inscriptions::envelope::{build_inscription_script, reassemble_envelope};
    use crate::inscriptions::types::PrevOutput;
    use crate::networks::Network;
    use crate::script::Script;
    use miniscript::bitcoin::consensus::encode::deserialize;
    use miniscript::bitcoin::Transaction;
    use serde::Deserialize;

    const WIF: &str = "cPnvkvUYyHcSSS26iD1dkrJdV7k1RoUqJLhn3CYxpo398PdLVE22";
    const ADDRESS: &str = "DFuDR3Vn22KMnrnVCxh6YavMAJP8TCPeA2";
    const TXID: &str = "adc5edd29f3b1c7e45a08d62b1f4c9e7a3d5602b8c1e4f7a9d3b6e20531c4fae";
    const DRC20_MINT: &[u8] = br#"{"p":"drc-20","op":"mint","tick":"tril","amt":"100"}"#;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct FixturePrevOutput {
        tx_id: String,
        v_out: u32,
        amount: u64,
        address: String,
        private_key: String,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct FixtureInscriptionData {
        content_type: String,
        body: String,
        reveal_addr: String,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct FixtureRequest {
        commit_tx_prev_output_list: Vec<FixturePrevOutput>,
        commit_fee_rate: u64,
        reveal_fee_rate: u64,
        reveal_out_value: u64,
        inscription_data: FixtureInscriptionData,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct FixtureResult {
        commit_tx: String,
        reveal_txs: Vec<String>,
        commit_tx_fee: u64,
        reveal_tx_fees: Vec<u64>,
        commit_addrs: Vec<String>,
    }

    #[derive(Deserialize)]
    struct Fixture {
        network: String,
        request: FixtureRequest,
        expected: FixtureResult,
    }

    fn load_fixture(name: &str) -> Fixture {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("test/fixtures")
            .join(name);
        let contents = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
        serde_json::from_str(&contents).expect("invalid fixture")
    }

    impl From<FixtureRequest> for InscriptionRequest {
        fn from(request: FixtureRequest) -> Self {
            InscriptionRequest {
                commit_tx_prev_outputs: request
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
                commit_fee_rate: request.commit_fee_rate,
                reveal_fee_rate: request.reveal_fee_rate,
                reveal_out_value: request.reveal_out_value,
                inscription_data: InscriptionData {
                    content_type: request.inscription_data.content_type,
                    body: request.inscription_data.body.into_bytes(),
                    reveal_address: request.inscription_data.reveal_addr,
                },
                change_address: None,
                min_change_value: None,
            }
        }
    }

    fn prev_output(txid: &str, vout: u32, amount: u64) -> PrevOutput {
        PrevOutput {
            txid: txid.to_string(),
            vout,
            amount,
            address: ADDRESS.to_string(),
            private_key: WIF.to_string(),
        }
    }

    fn request(prev_outputs: Vec<PrevOutput>, content_type: &str, body: &[u8]) -> InscriptionRequest {
        InscriptionRequest {
            commit_tx_prev_outputs: prev_outputs,
            commit_fee_rate: 100_000,
            reveal_fee_rate: 100_000,
            reveal_out_value: 100_000,
            inscription_data: InscriptionData {
                content_type: content_type.to_string(),
                body: body.to_vec(),
                reveal_address: ADDRESS.to_string(),
            },
            change_address: None,
            min_change_value: None,
        }
    }

    fn doge() -> ChainParams {
        Network::Dogecoin.chain_params()
    }

    fn large_body() -> Vec<u8> {
        (0..=255u8).cycle().take(3072).collect()
    }

    fn expect_success(outcome: InscriptionOutcome) -> InscriptionTxs {
        match outcome {
            InscriptionOutcome::Success(txs) => txs,
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_drc20_mint_fixture() {
        let fixture = load_fixture("doge_drc20_mint.json");
        let network = Network::from_coin_name(&fixture.network).unwrap();
        let request: InscriptionRequest = fixture.request.into();

        let result = inscribe(network.chain_params(), &request).unwrap().into_result();
        assert_eq!(result.commit_tx, fixture.expected.commit_tx);
        assert_eq!(result.reveal_txs, fixture.expected.reveal_txs);
        assert_eq!(result.commit_tx_fee, fixture.expected.commit_tx_fee);
        assert_eq!(result.reveal_tx_fees, fixture.expected.reveal_tx_fees);
        assert_eq!(result.commit_addrs, fixture.expected.commit_addrs);
    }

    #[test]
    fn test_drc20_mint_structure() {
        let outcome = inscribe(
            doge(),
            &request(
                vec![prev_output(TXID, 2, 317_250_000)],
                "text/plain;charset=utf8",
                DRC20_MINT,
            ),
        )
        .unwrap();
        let txs = expect_success(outcome);

        assert_eq!(txs.commit_tx.output.len(), 3);
        assert_eq!(txs.commit_tx.output[0].value, Amount::from_sat(100_000));
        assert_eq!(txs.commit_tx.output[1].value, Amount::from_sat(46_600_000));
        assert_eq!(txs.commit_tx.output[2].value, Amount::from_sat(241_350_000));
        assert_eq!(txs.commit_tx_fee, 29_200_000);
        assert_eq!(txs.reveal_tx_fees, vec![46_600_000]);

        let reveal = &txs.reveal_txs[0];
        assert_eq!(reveal.input[0].previous_output.txid, txs.commit_tx.compute_txid());
        assert_eq!(reveal.output.len(), 1);
        assert_eq!(
            reveal.output[0].script_pubkey,
            to_output_script(ADDRESS, &doge()).unwrap()
        );
    }

    #[test]
    fn test_insufficient_funds_reports_fees() {
        let outcome = inscribe(
            doge(),
            &request(
                vec![prev_output(TXID, 2, 50_000_000)],
                "text/plain;charset=utf8",
                DRC20_MINT,
            ),
        )
        .unwrap();
        assert!(!outcome.is_success());

        let result = outcome.into_result();
        assert_eq!(result.commit_tx, "");
        assert!(result.reveal_txs.is_empty());
        assert_eq!(result.commit_tx_fee, 29_200_000);
        assert_eq!(result.reveal_tx_fees, vec![46_600_000]);
        assert_eq!(
            result.commit_addrs,
            vec!["9teShYqmoo2J4sXEqrHVmcyLatnMwZUcE9".to_string()]
        );
    }

    #[test]
    fn test_small_change_goes_to_fee() {
        let amount = 100_000 + 46_600_000 + 29_200_000 + 50_000;
        let txs = expect_success(
            inscribe(
                doge(),
                &request(
                    vec![prev_output(TXID, 2, amount)],
                    "text/plain;charset=utf8",
                    DRC20_MINT,
                ),
            )
            .unwrap(),
        );
        assert_eq!(txs.commit_tx.output.len(), 2);
        assert_eq!(txs.commit_tx_fee, 29_250_000);
    }

    #[test]
    fn test_min_change_value_override() {
        let amount = 100_000 + 46_600_000 + 29_200_000 + 50_000;
        let mut req = request(
            vec![prev_output(TXID, 2, amount)],
            "text/plain;charset=utf8",
            DRC20_MINT,
        );
        req.min_change_value = Some(10_000);
        let txs = expect_success(inscribe(doge(), &req).unwrap());
        assert_eq!(txs.commit_tx.output.len(), 3);
        assert_eq!(txs.commit_tx.output[2].value, Amount::from_sat(50_000));
        assert_eq!(txs.commit_tx_fee, 29_200_000);
    }

    #[test]
    fn test_change_address_override() {
        let change = "DDXZ8y3AhpaLYLo4HskDcEwuTuPumYLHwr";
        let mut req = request(
            vec![prev_output(TXID, 2, 317_250_000)],
            "text/plain;charset=utf8",
            DRC20_MINT,
        );
        req.change_address = Some(change.to_string());
        let txs = expect_success(inscribe(doge(), &req).unwrap());
        assert_eq!(
            txs.commit_tx.output[2].script_pubkey,
            to_output_script(change, &doge()).unwrap()
        );
        // the reveal funding stays with the sender
        assert_eq!(
            txs.commit_tx.output[1].script_pubkey,
            to_output_script(ADDRESS, &doge()).unwrap()
        );
    }

    #[test]
    fn test_multi_partial_chain() {
        let txs = expect_success(
            inscribe(
                doge(),
                &request(
                    vec![
                        prev_output(TXID, 2, 317_250_000),
                        prev_output(&"11".repeat(32), 0, 500_000_000),
                    ],
                    "image/png",
                    &large_body(),
                ),
            )
            .unwrap(),
        );

        assert_eq!(txs.reveal_txs.len(), 3);
        assert_eq!(txs.commit_tx.input.len(), 2);
        assert_eq!(txs.commit_tx_fee, 43_800_000);
        assert_eq!(txs.reveal_tx_fees, vec![190_000_000, 188_200_000, 57_700_000]);
        assert_eq!(
            txs.commit_addrs,
            vec![
                "9zGDJb622jzwyPtA5s2WBrWsJabNPQ2n8D",
                "9zo7qtk4Mv2yFWz1bAyCG9qysNaURW7pds",
                "9y9FBwpvsmZN3bNxkb4cUNRrzDpMSTVFj3",
            ]
        );

        // each reveal spends outputs 0 and 1 of its predecessor
        let mut prev = &txs.commit_tx;
        for reveal in &txs.reveal_txs {
            let prev_txid = prev.compute_txid();
            assert_eq!(reveal.input.len(), 2);
            assert_eq!(reveal.input[0].previous_output, OutPoint { txid: prev_txid, vout: 0 });
            assert_eq!(reveal.input[1].previous_output, OutPoint { txid: prev_txid, vout: 1 });
            prev = reveal;
        }

        // the revealed partial scripts concatenate back into the envelope
        let partials: Vec<Script> = txs
            .reveal_txs
            .iter()
            .map(|tx| {
                let unlock = Script::decode(tx.input[0].script_sig.as_bytes()).unwrap();
                let chunks = unlock.chunks();
                chunks[..chunks.len() - 2].iter().cloned().collect()
            })
            .collect();
        assert_eq!(
            reassemble_envelope(&partials),
            build_inscription_script("image/png", &large_body()).unwrap()
        );

        // nothing is lost between inputs, outputs and fees
        let total_in: u64 = 317_250_000 + 500_000_000;
        let change = txs.commit_tx.output[2].value.to_sat();
        let inscribed = txs.reveal_txs[2].output[0].value.to_sat();
        let fees: u64 = txs.commit_tx_fee + txs.reveal_tx_fees.iter().sum::<u64>();
        assert_eq!(total_in, change + inscribed + fees);
    }

    #[test]
    fn test_hex_output_round_trips() {
        let result = inscribe(
            doge(),
            &request(
                vec![prev_output(TXID, 2, 317_250_000)],
                "text/plain;charset=utf8",
                DRC20_MINT,
            ),
        )
        .unwrap()
        .into_result();
        let commit: Transaction = deserialize(&hex::decode(&result.commit_tx).unwrap()).unwrap();
        let reveal: Transaction = deserialize(&hex::decode(&result.reveal_txs[0]).unwrap()).unwrap();
        assert_eq!(reveal.input[0].previous_output.txid, commit.compute_txid());
        assert_eq!(
            commit.compute_txid().to_string(),
            "4ab12b25effc55bfaf6c8259d1bee811b789c7ff33bf4281ae2c73ea5234d544"
        );
    }

    #[test]
    fn test_invalid_requests() {
        let base = request(
            vec![prev_output(TXID, 2, 317_250_000)],
            "text/plain",
            b"hi",
        );

        let mut req = base.clone();
        req.commit_fee_rate = 0;
        assert!(matches!(
            inscribe(doge(), &req),
            Err(InscriptionError::InvalidRequest(_))
        ));

        let mut req = base.clone();
        req.commit_tx_prev_outputs.clear();
        assert!(matches!(
            inscribe(doge(), &req),
            Err(InscriptionError::InvalidRequest(_))
        ));

        let mut req = base.clone();
        req.commit_tx_prev_outputs[0].txid = "abcd".to_string();
        assert!(matches!(
            inscribe(doge(), &req),
            Err(InscriptionError::InvalidTxid(_))
        ));

        let mut req = base.clone();
        req.commit_tx_prev_outputs[0].private_key = "bogus".to_string();
        assert!(matches!(
            inscribe(doge(), &req),
            Err(InscriptionError::InvalidKey(_))
        ));

        let mut req = base.clone();
        req.inscription_data.reveal_address = "bogus".to_string();
        assert!(matches!(
            inscribe(doge(), &req),
            Err(InscriptionError::InvalidAddress { .. })
        ));

        let mut req = base.clone();
        req.commit_tx_prev_outputs.push(prev_output(TXID, 2, 1));
        assert!(matches!(
            inscribe(doge(), &req),
            Err(InscriptionError::InvalidRequest(_))
        ));

        assert!(matches!(
            inscribe(Network::Bitcoin.chain_params(), &base),
            Err(InscriptionError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_script_hash_sender_is_rejected() {
        let key = decode_wif(WIF).unwrap();
        let public_key = key.public_key(&miniscript::bitcoin::secp256k1::Secp256k1::signing_only());
        let mut redeem = Script::new();
        redeem.push_data(&public_key.to_bytes()).unwrap();
        redeem.push_opcode(miniscript::bitcoin::opcodes::all::OP_CHECKSIG);
        let p2sh_address = crate::address::p2sh_address(&redeem.to_script_buf(), &doge());

        let mut req = request(
            vec![prev_output(TXID, 2, 317_250_000)],
            "text/plain;charset=utf8",
            DRC20_MINT,
        );
        req.commit_tx_prev_outputs[0].address = p2sh_address.clone();
        assert_eq!(
            inscribe(doge(), &req).unwrap_err(),
            InscriptionError::InvalidAddress {
                address: p2sh_address,
                reason: "the first funding output must be pay-to-pubkey-hash".to_string(),
            }
        );

        // a P2SH output is still fine as an additional funding input
        let mut req = request(
            vec![
                prev_output(TXID, 2, 317_250_000),
                prev_output(&"11".repeat(32), 0, 500_000),
            ],
            "text/plain;charset=utf8",
            DRC20_MINT,
        );
        req.commit_tx_prev_outputs[1].address = crate::address::p2sh_address(
            &redeem.to_script_buf(),
            &doge(),
        );
        assert!(inscribe(doge(), &req).unwrap().is_success());
    }

    #[test]
    fn test_default_reveal_out_value() {
        let mut req = request(
            vec![prev_output(TXID, 2, 317_250_000)],
            "text/plain;charset=utf8",
            DRC20_MINT,
        );
        req.reveal_out_value = 0;
        let txs = expect_success(inscribe(doge(), &req).unwrap());
        assert_eq!(
            txs.reveal_txs[0].output[0].value,
            Amount::from_sat(DEFAULT_REVEAL_OUT_VALUE)
        );
    }
}
