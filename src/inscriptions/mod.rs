//! Doginals inscriptions
//!
//! Builds the commit transaction and the chain of reveal transactions that
//! write an inscription onto a legacy (non-segwit) chain such as Dogecoin.
//!
//! The envelope is split across P2SH redeem scripts. The commit transaction
//! locks the first partial script and funds every reveal fee; each reveal
//! exposes one partial and locks the next, and the last one pays the
//! inscribed output to the destination.

mod commit;
mod envelope;
mod reveal;
mod signer;
mod tool;
mod types;

pub use commit::{fund_commit_tx, CommitFunding, CommitTemplate};
pub use envelope::{
    build_inscription_contexts, build_inscription_script, build_redeem_script,
    reassemble_envelope, split_into_partials, PartialContext, INSCRIPTION_MARKER, MAX_CHUNK_LEN,
    MAX_PARTS, MAX_PAYLOAD_LEN,
};
pub use reveal::{
    estimate_reveal_chain, link_and_sign_reveal_chain, RevealEstimate, CHANGE_OUTPUT_OVERHEAD,
    DEFAULT_SEQUENCE, DUMMY_SIGNATURE_LEN, P2PKH_UNLOCK_PLACEHOLDER_LEN,
};
pub use signer::{
    envelope_unlock_script, sign_envelope_input, sign_p2pkh_input, sign_transaction, PrevOutputs,
    ScriptClass,
};
pub use tool::{inscribe, DogeInscriptionTool, DEFAULT_MIN_CHANGE_VALUE, DEFAULT_REVEAL_OUT_VALUE};
pub use types::{
    InscriptionData, InscriptionOutcome, InscriptionRequest, InscriptionResult, InscriptionTxs,
    PrevOutput,
};
