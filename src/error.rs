use thiserror::Error;

use crate::script::ScriptError;

/// Errors that abort the construction of an inscription.
///
/// Running out of funds is not represented here: it is a regular outcome, see
/// [`crate::inscriptions::InscriptionOutcome::InsufficientFunds`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InscriptionError {
    /// A private key could not be decoded.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// An address is malformed or belongs to another network.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// A transaction id is not 32 bytes of hex.
    #[error("invalid txid '{0}'")]
    InvalidTxid(String),

    /// The request itself is unusable (zero fee rate, no inputs, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The payload cannot be laid out into partial scripts.
    #[error("envelope error: {0}")]
    Envelope(String),

    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The previous output of an input has a script class the signer cannot unlock.
    #[error("input {index}: unsupported script class for {script}")]
    UnsupportedScript { index: usize, script: String },

    /// A previous output referenced by a transaction input is unknown.
    #[error("missing previous output {0}")]
    MissingPrevOutput(String),

    /// The signer was handed a key list that does not line up with the inputs.
    #[error("expected {inputs} private keys, got {keys}")]
    KeyCountMismatch { inputs: usize, keys: usize },

    #[error("failed to compute sighash: {0}")]
    Sighash(String),
}

impl InscriptionError {
    pub(crate) fn invalid_address(address: &str, reason: impl ToString) -> Self {
        InscriptionError::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Error type handed across the wasm boundary
#[derive(Debug, Clone)]
pub struct WasmDoginalsError {
    message: String,
}

impl WasmDoginalsError {
    pub fn new(message: &str) -> Self {
        WasmDoginalsError {
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for WasmDoginalsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WasmDoginalsError {}

impl From<InscriptionError> for WasmDoginalsError {
    fn from(err: InscriptionError) -> Self {
        WasmDoginalsError::new(&err.to_string())
    }
}
