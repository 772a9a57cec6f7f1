//! Reveal chain construction
//!
//! Reveal transaction `i` spends two outputs of its predecessor (the commit
//! transaction for `i == 0`):
//!
//! - input 0: the P2SH output committing to partial `i`
//! - input 1: the sender output carrying the fees of reveals `i..n`
//!
//! Output 0 is the next partial's P2SH output, or the destination for the
//! last reveal. Non-terminal reveals pass the remaining fees on in output 1.

use crate::error::InscriptionError;
use log::{debug, trace};
use miniscript::bitcoin::absolute::LockTime;
use miniscript::bitcoin::consensus::encode::serialize;
use miniscript::bitcoin::hashes::Hash;
use miniscript::bitcoin::transaction::Version;
use miniscript::bitcoin::{
    Amount, OutPoint, PrivateKey, Script as BitcoinScript, ScriptBuf, Sequence, Transaction, TxIn,
    TxOut, Txid, Witness,
};

use super::envelope::PartialContext;
use super::signer::{envelope_unlock_script, sign_envelope_input, sign_p2pkh_input, PrevOutputs};

/// nSequence of every input built here
pub const DEFAULT_SEQUENCE: u32 = 0xfffffff5;

/// Size reserved for a DER signature plus sighash byte while estimating
pub const DUMMY_SIGNATURE_LEN: usize = 73;

/// Size reserved for a P2PKH unlock script while estimating
pub const P2PKH_UNLOCK_PLACEHOLDER_LEN: usize = 107;

/// Added to every measured size before multiplying by the fee rate
pub const CHANGE_OUTPUT_OVERHEAD: usize = 34;

pub(crate) fn new_transaction(input: Vec<TxIn>, output: Vec<TxOut>) -> Transaction {
    Transaction {
        version: Version::ONE,
        lock_time: LockTime::ZERO,
        input,
        output,
    }
}

pub(crate) fn new_input(previous_output: OutPoint) -> TxIn {
    TxIn {
        previous_output,
        script_sig: ScriptBuf::new(),
        sequence: Sequence(DEFAULT_SEQUENCE),
        witness: Witness::new(),
    }
}

pub(crate) fn serialized_len(tx: &Transaction) -> usize {
    serialize(tx).len()
}

/// `(size + CHANGE_OUTPUT_OVERHEAD) * fee_rate`
pub(crate) fn fee_for_size(size: usize, fee_rate: u64) -> Result<u64, InscriptionError> {
    ((size + CHANGE_OUTPUT_OVERHEAD) as u64)
        .checked_mul(fee_rate)
        .ok_or_else(|| InscriptionError::InvalidRequest(format!("fee rate {} overflows", fee_rate)))
}

/// Unsigned reveal chain together with its fee schedule.
#[derive(Debug, Clone)]
pub struct RevealEstimate {
    /// Reveal transactions with placeholder inputs and final outputs
    pub txs: Vec<Transaction>,
    pub fees: Vec<u64>,
    pub commit_addrs: Vec<String>,
    /// Value the commit transaction must lock in the sender output: the sum of
    /// all reveal fees
    pub total_funding: u64,
}

/// Size every reveal transaction with placeholder signatures and derive its fee.
///
/// Walks the chain from the terminal reveal backwards so each transaction
/// knows how much it must carry forward for its successors.
pub fn estimate_reveal_chain(
    contexts: &[PartialContext],
    sender_script: &BitcoinScript,
    reveal_fee_rate: u64,
) -> Result<RevealEstimate, InscriptionError> {
    if contexts.is_empty() {
        return Err(InscriptionError::Envelope("no partial scripts".to_string()));
    }

    let n = contexts.len();
    let mut txs = Vec::with_capacity(n);
    let mut fees = Vec::with_capacity(n);
    let mut carried: u64 = 0;

    for (i, context) in contexts.iter().enumerate().rev() {
        let dummy_signature = [0u8; DUMMY_SIGNATURE_LEN];
        let mut envelope_input = new_input(OutPoint {
            txid: Txid::all_zeros(),
            vout: 0,
        });
        envelope_input.script_sig = envelope_unlock_script(context, &dummy_signature)?.to_script_buf();

        let mut funding_input = new_input(OutPoint {
            txid: Txid::all_zeros(),
            vout: 1,
        });
        funding_input.script_sig = ScriptBuf::from_bytes(vec![0u8; P2PKH_UNLOCK_PLACEHOLDER_LEN]);

        let mut output = vec![context.reveal_output.clone()];
        if i != n - 1 {
            output.push(TxOut {
                value: Amount::from_sat(carried),
                script_pubkey: sender_script.to_owned(),
            });
        }

        let tx = new_transaction(vec![envelope_input, funding_input], output);
        let size = serialized_len(&tx);
        let fee = fee_for_size(size, reveal_fee_rate)?;
        trace!("reveal {} estimated at {} bytes, fee {}", i, size, fee);

        carried = carried
            .checked_add(fee)
            .ok_or_else(|| InscriptionError::InvalidRequest("reveal fees overflow".to_string()))?;
        fees.push(fee);
        txs.push(tx);
    }
    txs.reverse();
    fees.reverse();

    debug!("reveal chain of {} transactions needs {}", n, carried);

    Ok(RevealEstimate {
        txs,
        fees,
        commit_addrs: contexts.iter().map(|c| c.commit_address.clone()).collect(),
        total_funding: carried,
    })
}

/// Point every reveal at its predecessor and sign it.
///
/// Reveals are linked one at a time: the txid of reveal `i` is only known once
/// it is signed, and reveal `i + 1` spends it. Every transaction handled is
/// recorded in `prev_outputs`.
pub fn link_and_sign_reveal_chain(
    commit_tx: &Transaction,
    reveal_txs: &mut [Transaction],
    contexts: &[PartialContext],
    funding_key: &PrivateKey,
    sender_script: &BitcoinScript,
    prev_outputs: &mut PrevOutputs,
) -> Result<(), InscriptionError> {
    if reveal_txs.len() != contexts.len() {
        return Err(InscriptionError::InvalidRequest(format!(
            "{} reveal transactions for {} partial scripts",
            reveal_txs.len(),
            contexts.len()
        )));
    }

    prev_outputs.add_transaction_outputs(commit_tx);
    let mut prev_txid = commit_tx.compute_txid();

    for (i, (tx, context)) in reveal_txs.iter_mut().zip(contexts).enumerate() {
        tx.input[0].previous_output = OutPoint {
            txid: prev_txid,
            vout: 0,
        };
        tx.input[1].previous_output = OutPoint {
            txid: prev_txid,
            vout: 1,
        };

        let spent = prev_outputs.fetch(&tx.input[0].previous_output)?;
        if spent.script_pubkey != context.commit_script {
            return Err(InscriptionError::InvalidRequest(format!(
                "reveal {} does not spend the commit output of its partial",
                i
            )));
        }

        sign_envelope_input(tx, 0, context)?;
        sign_p2pkh_input(tx, 1, funding_key, sender_script)?;

        prev_outputs.add_transaction_outputs(tx);
        prev_txid = tx.compute_txid();
        trace!("reveal {} signed as {}", i, prev_txid);
    }
    Ok(())
}
