//! Commit transaction funding
//!
//! The commit transaction spends the caller's outputs into
//!
//! 0. the P2SH output of the first partial script
//! 1. the sender output funding every reveal fee
//! 2. change, when it is worth keeping

use crate::error::InscriptionError;
use log::debug;
use miniscript::bitcoin::{Amount, PrivateKey, ScriptBuf, Transaction, TxIn, TxOut};

use super::reveal::{fee_for_size, new_transaction, serialized_len};
use super::signer::{sign_transaction, PrevOutputs};

/// Inputs and fixed outputs of a commit transaction, before fees are known.
#[derive(Debug, Clone)]
pub struct CommitTemplate {
    pub inputs: Vec<TxIn>,
    /// P2SH output locking the first partial script
    pub reveal_output: TxOut,
    /// Sender output carrying the reveal fees
    pub funding_output: TxOut,
    pub change_script: ScriptBuf,
}

#[derive(Debug, Clone)]
pub enum CommitFunding {
    /// Signed commit transaction and the fee it was sized for
    Funded { tx: Transaction, fee: u64 },
    /// The inputs do not cover outputs plus fee
    Insufficient { fee: u64 },
}

fn measure_fee(
    tx: &Transaction,
    keys: &[PrivateKey],
    prev_outputs: &PrevOutputs,
    fee_rate: u64,
) -> Result<u64, InscriptionError> {
    let mut sized = tx.clone();
    sign_transaction(&mut sized, keys, prev_outputs)?;
    fee_for_size(serialized_len(&sized), fee_rate)
}

/// Size, fund and sign the commit transaction.
///
/// The fee is measured on a fully signed copy. Change below `min_change_value`
/// is left to the miners: the change output is removed and the fee measured
/// again on the smaller transaction.
pub fn fund_commit_tx(
    template: CommitTemplate,
    keys: &[PrivateKey],
    prev_outputs: &PrevOutputs,
    commit_fee_rate: u64,
    min_change_value: u64,
) -> Result<CommitFunding, InscriptionError> {
    let CommitTemplate {
        inputs,
        reveal_output,
        funding_output,
        change_script,
    } = template;

    let required = reveal_output
        .value
        .to_sat()
        .checked_add(funding_output.value.to_sat())
        .ok_or_else(|| InscriptionError::InvalidRequest("output value overflow".to_string()))?;

    let mut tx = new_transaction(
        inputs,
        vec![
            reveal_output,
            funding_output,
            TxOut {
                value: Amount::ZERO,
                script_pubkey: change_script,
            },
        ],
    );
    let total_in = prev_outputs.input_value(&tx)?;

    let mut fee = measure_fee(&tx, keys, prev_outputs, commit_fee_rate)?;
    let spendable = match total_in.checked_sub(required) {
        Some(spendable) if spendable >= fee => spendable,
        _ => {
            debug!("commit inputs {} short of {} + fee {}", total_in, required, fee);
            return Ok(CommitFunding::Insufficient { fee });
        }
    };

    let change = spendable - fee;
    if change >= min_change_value {
        tx.output[2].value = Amount::from_sat(change);
    } else {
        debug!("dropping change output of {}", change);
        tx.output.truncate(2);
        fee = measure_fee(&tx, keys, prev_outputs, commit_fee_rate)?;
        if spendable < fee {
            return Ok(CommitFunding::Insufficient { fee });
        }
    }

    sign_transaction(&mut tx, keys, prev_outputs)?;
    Ok(CommitFunding::Funded { tx, fee })
}
