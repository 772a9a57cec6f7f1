pub mod address;
mod error;
pub mod inscriptions;
mod networks;
pub mod script;

// re-export bitcoin from the miniscript crate
pub use ::miniscript::bitcoin;

pub use error::{InscriptionError, WasmDoginalsError};
pub use inscriptions::{inscribe, InscriptionOutcome, InscriptionRequest, InscriptionResult};
pub use networks::{ChainParams, Network};

pub mod wasm;
pub use wasm::InscriptionsNamespace;
