use miniscript::bitcoin::consensus::encode::serialize_hex;
use miniscript::bitcoin::Transaction;

/// A spendable output supplied by the caller to fund the commit transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrevOutput {
    /// Transaction id in the usual (byte-reversed) hex form
    pub txid: String,
    pub vout: u32,
    pub amount: u64,
    pub address: String,
    /// WIF encoded key able to spend this output
    pub private_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionData {
    pub content_type: String,
    pub body: Vec<u8>,
    /// Address receiving the inscribed output of the last reveal transaction
    pub reveal_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionRequest {
    /// Funding outputs. The first entry also supplies the inscription key and
    /// the sender address that carries the reveal funding along the chain.
    pub commit_tx_prev_outputs: Vec<PrevOutput>,
    pub commit_fee_rate: u64,
    pub reveal_fee_rate: u64,
    /// Value of each reveal output; 0 selects the default.
    pub reveal_out_value: u64,
    pub inscription_data: InscriptionData,
    /// Receives the commit change; defaults to the sender address.
    pub change_address: Option<String>,
    /// Smallest change worth an output; `None` or 0 selects the default.
    pub min_change_value: Option<u64>,
}

/// Fully signed commit and reveal transactions with their fees.
#[derive(Debug, Clone)]
pub struct InscriptionTxs {
    pub commit_tx: Transaction,
    pub reveal_txs: Vec<Transaction>,
    pub commit_tx_fee: u64,
    pub reveal_tx_fees: Vec<u64>,
    pub commit_addrs: Vec<String>,
}

impl InscriptionTxs {
    pub fn commit_tx_hex(&self) -> String {
        serialize_hex(&self.commit_tx)
    }

    pub fn reveal_tx_hexes(&self) -> Vec<String> {
        self.reveal_txs.iter().map(serialize_hex).collect()
    }
}

/// Result of an inscription request that did not hit a hard error.
#[derive(Debug, Clone)]
pub enum InscriptionOutcome {
    Success(InscriptionTxs),
    /// The funding outputs cannot pay for the reveal chain plus the commit
    /// fee. Carries the fee schedule so the caller can add funds and retry.
    InsufficientFunds {
        commit_tx_fee: u64,
        reveal_tx_fees: Vec<u64>,
        commit_addrs: Vec<String>,
    },
}

impl InscriptionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InscriptionOutcome::Success(_))
    }

    /// Flatten into the hex form handed to broadcasters. An insufficient
    /// balance shows up as an empty `commit_tx` and no reveal transactions.
    pub fn into_result(self) -> InscriptionResult {
        match self {
            InscriptionOutcome::Success(txs) => InscriptionResult {
                commit_tx: txs.commit_tx_hex(),
                reveal_txs: txs.reveal_tx_hexes(),
                commit_tx_fee: txs.commit_tx_fee,
                reveal_tx_fees: txs.reveal_tx_fees,
                commit_addrs: txs.commit_addrs,
            },
            InscriptionOutcome::InsufficientFunds {
                commit_tx_fee,
                reveal_tx_fees,
                commit_addrs,
            } => InscriptionResult {
                commit_tx: String::new(),
                reveal_txs: Vec::new(),
                commit_tx_fee,
                reveal_tx_fees,
                commit_addrs,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InscriptionResult {
    pub commit_tx: String,
    pub reveal_txs: Vec<String>,
    pub commit_tx_fee: u64,
    pub reveal_tx_fees: Vec<u64>,
    pub commit_addrs: Vec<String>,
}
