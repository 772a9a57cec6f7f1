//! Legacy (pre-segwit) transaction signing
//!
//! All signatures are SIGHASH_ALL over the legacy sighash algorithm. Nonces
//! come from RFC6979 so identical inputs always produce identical bytes.

use std::collections::HashMap;

use crate::error::InscriptionError;
use crate::script::Script;
use miniscript::bitcoin::ecdsa;
use miniscript::bitcoin::hashes::Hash;
use miniscript::bitcoin::opcodes::all::OP_CHECKSIG;
use miniscript::bitcoin::secp256k1::{Message, Secp256k1};
use miniscript::bitcoin::sighash::{EcdsaSighashType, SighashCache};
use miniscript::bitcoin::{OutPoint, PrivateKey, Script as BitcoinScript, Transaction, TxOut};

use super::envelope::PartialContext;

/// Lookup of the outputs spent by the transactions being built.
#[derive(Debug, Clone, Default)]
pub struct PrevOutputs {
    outputs: HashMap<OutPoint, TxOut>,
}

impl PrevOutputs {
    pub fn new() -> Self {
        PrevOutputs::default()
    }

    pub fn add(&mut self, outpoint: OutPoint, output: TxOut) {
        self.outputs.insert(outpoint, output);
    }

    /// Register every output of `tx` so transactions spending it can be signed.
    pub fn add_transaction_outputs(&mut self, tx: &Transaction) {
        let txid = tx.compute_txid();
        for (vout, output) in tx.output.iter().enumerate() {
            self.add(
                OutPoint {
                    txid,
                    vout: vout as u32,
                },
                output.clone(),
            );
        }
    }

    pub fn fetch(&self, outpoint: &OutPoint) -> Result<&TxOut, InscriptionError> {
        self.outputs
            .get(outpoint)
            .ok_or_else(|| InscriptionError::MissingPrevOutput(outpoint.to_string()))
    }

    /// Sum of the values spent by `tx`.
    pub fn input_value(&self, tx: &Transaction) -> Result<u64, InscriptionError> {
        tx.input.iter().try_fold(0u64, |total, input| {
            let value = self.fetch(&input.previous_output)?.value.to_sat();
            total
                .checked_add(value)
                .ok_or_else(|| InscriptionError::InvalidRequest("input value overflow".to_string()))
        })
    }

    /// Inputs minus outputs of `tx`, as paid to miners.
    pub fn fee(&self, tx: &Transaction) -> Result<u64, InscriptionError> {
        let inputs = self.input_value(tx)?;
        let outputs: u64 = tx.output.iter().map(|o| o.value.to_sat()).sum();
        inputs.checked_sub(outputs).ok_or_else(|| {
            InscriptionError::InvalidRequest(format!(
                "transaction spends {} but creates {}",
                inputs, outputs
            ))
        })
    }
}

/// Output script classes the generic signer can unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    PubKeyHash,
    ScriptHash,
    PubKey,
}

impl ScriptClass {
    pub fn classify(script: &BitcoinScript) -> Option<ScriptClass> {
        if script.is_p2pkh() {
            Some(ScriptClass::PubKeyHash)
        } else if script.is_p2sh() {
            Some(ScriptClass::ScriptHash)
        } else if script.is_p2pk() {
            Some(ScriptClass::PubKey)
        } else {
            None
        }
    }
}

/// DER signature plus sighash byte for input `index` against `script_code`.
fn sign_input_digest(
    tx: &Transaction,
    index: usize,
    script_code: &BitcoinScript,
    private_key: &PrivateKey,
) -> Result<Vec<u8>, InscriptionError> {
    let sighash = SighashCache::new(tx)
        .legacy_signature_hash(index, script_code, EcdsaSighashType::All.to_u32())
        .map_err(|e| InscriptionError::Sighash(e.to_string()))?;

    let secp = Secp256k1::signing_only();
    let message = Message::from_digest(sighash.to_byte_array());
    let signature = secp.sign_ecdsa(&message, &private_key.inner);
    Ok(ecdsa::Signature::sighash_all(signature).to_vec())
}

/// `<pubkey> OP_CHECKSIG`, the redeem script of a single-key P2SH output.
fn single_key_redeem_script(private_key: &PrivateKey) -> Result<Script, InscriptionError> {
    let public_key = private_key.public_key(&Secp256k1::signing_only());
    let mut redeem = Script::new();
    redeem.push_data(&public_key.to_bytes())?;
    redeem.push_opcode(OP_CHECKSIG);
    Ok(redeem)
}

/// Sign every input of `tx`.
///
/// `private_keys[i]` signs input `i`; keys are never matched against
/// addresses. Fails on the first input whose previous output is not P2PKH,
/// P2SH (single key) or bare pubkey.
pub fn sign_transaction(
    tx: &mut Transaction,
    private_keys: &[PrivateKey],
    prev_outputs: &PrevOutputs,
) -> Result<(), InscriptionError> {
    if private_keys.len() != tx.input.len() {
        return Err(InscriptionError::KeyCountMismatch {
            inputs: tx.input.len(),
            keys: private_keys.len(),
        });
    }

    let secp = Secp256k1::signing_only();
    for (index, private_key) in private_keys.iter().enumerate() {
        let prev_script = prev_outputs
            .fetch(&tx.input[index].previous_output)?
            .script_pubkey
            .clone();

        let mut unlock = Script::new();
        match ScriptClass::classify(&prev_script) {
            Some(ScriptClass::PubKeyHash) => {
                let signature = sign_input_digest(tx, index, &prev_script, private_key)?;
                unlock.push_data(&signature)?;
                unlock.push_data(&private_key.public_key(&secp).to_bytes())?;
            }
            Some(ScriptClass::PubKey) => {
                let signature = sign_input_digest(tx, index, &prev_script, private_key)?;
                unlock.push_data(&signature)?;
            }
            Some(ScriptClass::ScriptHash) => {
                let redeem = single_key_redeem_script(private_key)?.to_script_buf();
                if redeem.to_p2sh() != prev_script {
                    return Err(InscriptionError::UnsupportedScript {
                        index,
                        script: format!("{} (redeem script unknown)", prev_script.to_hex_string()),
                    });
                }
                let signature = sign_input_digest(tx, index, &redeem, private_key)?;
                unlock.push_data(&signature)?;
                unlock.push_data(redeem.as_bytes())?;
            }
            None => {
                return Err(InscriptionError::UnsupportedScript {
                    index,
                    script: prev_script.to_hex_string(),
                })
            }
        }
        tx.input[index].script_sig = unlock.to_script_buf();
    }
    Ok(())
}

/// Sign input `index` as a P2PKH spend of `script_pubkey`.
pub fn sign_p2pkh_input(
    tx: &mut Transaction,
    index: usize,
    private_key: &PrivateKey,
    script_pubkey: &BitcoinScript,
) -> Result<(), InscriptionError> {
    let signature = sign_input_digest(tx, index, script_pubkey, private_key)?;
    let public_key = private_key.public_key(&Secp256k1::signing_only());

    let mut unlock = Script::new();
    unlock.push_data(&signature)?;
    unlock.push_data(&public_key.to_bytes())?;
    tx.input[index].script_sig = unlock.to_script_buf();
    Ok(())
}

/// Unlock script revealing `context`: `<partial script> <signature> <redeem script>`.
pub fn envelope_unlock_script(context: &PartialContext, signature: &[u8]) -> Result<Script, InscriptionError> {
    let mut unlock = context.inscription_script.clone();
    unlock.push_data(signature)?;
    unlock.push_data(context.redeem_script.as_bytes())?;
    Ok(unlock)
}

/// Sign input `index` as the spend of the P2SH output committing to `context`.
///
/// The signature commits to the redeem script, which is the script code of a
/// P2SH spend.
pub fn sign_envelope_input(
    tx: &mut Transaction,
    index: usize,
    context: &PartialContext,
) -> Result<(), InscriptionError> {
    let signature = sign_input_digest(tx, index, &context.redeem_script, &context.private_key)?;
    tx.input[index].script_sig = envelope_unlock_script(context, &signature)?.to_script_buf();
    Ok(())
}
