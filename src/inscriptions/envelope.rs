//! Inscription envelope builder
//!
//! Lays the inscription out as a chain of P2SH redeem scripts following the
//! doginals format:
//! ```text
//! "ord" <part count> <content_type> <n-1> <part_0> <n-2> <part_1> ... <0> <part_n-1>
//! ```
//! The logical script is cut into partial scripts of at most
//! [`MAX_PAYLOAD_LEN`] bytes. Each partial is revealed by spending a P2SH
//! output locked by
//! ```text
//! <pubkey> OP_CHECKSIGVERIFY OP_DROP * <chunks in partial> OP_TRUE
//! ```

use crate::address::{p2sh_address, to_output_script};
use crate::error::InscriptionError;
use crate::networks::ChainParams;
use crate::script::{number_to_chunk, Script};
use miniscript::bitcoin::opcodes::all::{OP_CHECKSIGVERIFY, OP_DROP};
use miniscript::bitcoin::opcodes::OP_TRUE;
use miniscript::bitcoin::secp256k1::Secp256k1;
use miniscript::bitcoin::{Amount, PrivateKey, PublicKey, ScriptBuf, TxOut};

use super::types::InscriptionData;

/// Protocol marker opening every envelope
pub const INSCRIPTION_MARKER: &[u8] = b"ord";

/// Maximum size of a single body part
pub const MAX_CHUNK_LEN: usize = 240;

/// Maximum encoded size of one partial script
pub const MAX_PAYLOAD_LEN: usize = 1500;

/// Part counters are pushed as positive script numbers of at most two bytes
pub const MAX_PARTS: usize = 0x7fff;

/// Everything needed to fund, spend and reveal one partial script.
#[derive(Debug, Clone)]
pub struct PartialContext {
    pub private_key: PrivateKey,
    /// Slice of the envelope revealed by this partial
    pub inscription_script: Script,
    pub redeem_script: ScriptBuf,
    pub commit_address: String,
    pub commit_script: ScriptBuf,
    /// The P2SH output the reveal transaction spends
    pub commit_output: TxOut,
    /// Output 0 of the reveal transaction: the next partial's commit output,
    /// or the destination for the last partial
    pub reveal_output: TxOut,
}

/// Split the body into parts of at most [`MAX_CHUNK_LEN`] bytes.
fn split_into_parts(body: &[u8]) -> Vec<&[u8]> {
    body.chunks(MAX_CHUNK_LEN).collect()
}

/// Build the logical (unsplit) envelope script.
pub fn build_inscription_script(content_type: &str, body: &[u8]) -> Result<Script, InscriptionError> {
    let parts = split_into_parts(body);
    if parts.len() > MAX_PARTS {
        return Err(InscriptionError::Envelope(format!(
            "body needs {} parts, at most {} are supported",
            parts.len(),
            MAX_PARTS
        )));
    }

    let mut script = Script::new();
    script.push_data(INSCRIPTION_MARKER)?;
    script.push(number_to_chunk(parts.len() as u16));
    script.push_data(content_type.as_bytes())?;

    // counters run down to 0 so an indexer knows when the last part arrived
    for (n, part) in parts.iter().enumerate() {
        script.push(number_to_chunk((parts.len() - n - 1) as u16));
        script.push_data(part)?;
    }

    Ok(script)
}

/// Cut the logical envelope into partial scripts.
///
/// The first partial takes the lone marker chunk; after that chunks move in
/// `(counter, data)` pairs so a partial never splits a pair. A pair that would
/// push a partial over [`MAX_PAYLOAD_LEN`] starts the next one.
pub fn split_into_partials(inscription: &Script) -> Result<Vec<Script>, InscriptionError> {
    let chunks = inscription.chunks();
    let mut partials = Vec::new();
    let mut pos = 0;

    while pos < chunks.len() {
        let mut partial = Script::new();
        if partials.is_empty() {
            partial.push(chunks[0].clone());
            pos = 1;
        }

        let mut pairs = 0;
        while pos < chunks.len() {
            let pair = &chunks[pos..(pos + 2).min(chunks.len())];
            let pair_len: usize = pair.iter().map(|c| c.encoded_len()).sum();
            if partial.encoded_len() + pair_len > MAX_PAYLOAD_LEN {
                break;
            }
            for chunk in pair {
                partial.push(chunk.clone());
            }
            pos += pair.len();
            pairs += 1;
        }

        if pairs == 0 && pos < chunks.len() {
            return Err(InscriptionError::Envelope(format!(
                "chunk pair at {} does not fit in {} bytes",
                pos, MAX_PAYLOAD_LEN
            )));
        }
        partials.push(partial);
    }

    Ok(partials)
}

/// `<pubkey> OP_CHECKSIGVERIFY OP_DROP * len(partial) OP_TRUE`
pub fn build_redeem_script(public_key: &PublicKey, partial: &Script) -> Result<Script, InscriptionError> {
    let mut lock = Script::new();
    lock.push_data(&public_key.to_bytes())?;
    lock.push_opcode(OP_CHECKSIGVERIFY);
    for _ in 0..partial.len() {
        lock.push_opcode(OP_DROP);
    }
    lock.push_opcode(OP_TRUE);
    Ok(lock)
}

/// Concatenate partial scripts back into the logical envelope.
pub fn reassemble_envelope<'a>(partials: impl IntoIterator<Item = &'a Script>) -> Script {
    let mut script = Script::new();
    for partial in partials {
        script.append(partial);
    }
    script
}

/// Build one [`PartialContext`] per partial script, in reveal order.
///
/// Context `i` is revealed by reveal transaction `i`; the last one pays the
/// destination.
pub fn build_inscription_contexts(
    params: &ChainParams,
    private_key: &PrivateKey,
    data: &InscriptionData,
    reveal_out_value: u64,
) -> Result<Vec<PartialContext>, InscriptionError> {
    let secp = Secp256k1::signing_only();
    let public_key = private_key.public_key(&secp);
    let destination = to_output_script(&data.reveal_address, params)?;

    let inscription = build_inscription_script(&data.content_type, &data.body)?;
    let partials = split_into_partials(&inscription)?;
    let value = Amount::from_sat(reveal_out_value);

    let mut contexts: Vec<PartialContext> = Vec::with_capacity(partials.len());
    for partial in partials {
        let redeem_script = build_redeem_script(&public_key, &partial)?.to_script_buf();
        let commit_script = redeem_script.to_p2sh();
        let commit_address = p2sh_address(&redeem_script, params);

        let commit_output = TxOut {
            value,
            script_pubkey: commit_script.clone(),
        };
        if let Some(previous) = contexts.last_mut() {
            previous.reveal_output = commit_output.clone();
        }

        contexts.push(PartialContext {
            private_key: *private_key,
            inscription_script: partial,
            redeem_script,
            commit_address,
            commit_script,
            commit_output,
            reveal_output: TxOut {
                value,
                script_pubkey: destination.clone(),
            },
        });
    }

    Ok(contexts)
}
