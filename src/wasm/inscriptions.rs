//! WASM bindings for inscription functionality

use crate::error::WasmDoginalsError;
use crate::inscriptions::{
    build_inscription_script, inscribe as inscribe_impl, split_into_partials, InscriptionRequest,
};
use crate::networks::Network;
use wasm_bindgen::prelude::*;

use super::try_from_js_value::TryFromJsValue;
use super::try_into_js_value::TryIntoJsValue;

/// Namespace for inscription-related functions
#[wasm_bindgen]
pub struct InscriptionsNamespace;

#[wasm_bindgen]
impl InscriptionsNamespace {
    /// Build the signed commit and reveal transactions for an inscription
    ///
    /// # Arguments
    /// * `network` - utxolib name (e.g. "dogecoin") or coin name (e.g. "doge")
    /// * `request` - Object with `commitTxPrevOutputList`, `commitFeeRate`,
    ///   `revealFeeRate`, `revealOutValue`, `inscriptionData` and the optional
    ///   `address` (change) and `dustMinValue`
    ///
    /// # Returns
    /// An object containing:
    /// - `commitTx`: hex of the signed commit transaction, empty when the
    ///   inputs cannot cover the fees
    /// - `revealTxs`: hex of each signed reveal transaction, in broadcast order
    /// - `commitTxFee`, `revealTxFees`: fees in base units (bigint)
    /// - `commitAddrs`: P2SH address of each partial script
    pub fn inscribe(network: JsValue, request: JsValue) -> Result<JsValue, WasmDoginalsError> {
        let network = Network::try_from_js_value(&network)?;
        let request = InscriptionRequest::try_from_js_value(&request)?;

        let outcome = inscribe_impl(network.chain_params(), &request)?;
        outcome.into_result().try_to_js_value()
    }

    /// Encode an inscription envelope without building any transaction
    ///
    /// # Returns
    /// An object with the full envelope `script` and the `partials` it is
    /// split into, both as bytes
    pub fn build_envelope(content_type: &str, body: &[u8]) -> Result<JsValue, WasmDoginalsError> {
        let script = build_inscription_script(content_type, body)?;
        let partials: Vec<Vec<u8>> = split_into_partials(&script)?
            .iter()
            .map(|partial| partial.to_bytes())
            .collect();

        js_obj!(
            "script" => script.to_bytes(),
            "partials" => partials
        )
    }
}
