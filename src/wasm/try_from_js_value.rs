use crate::error::WasmDoginalsError;
use crate::inscriptions::{InscriptionData, InscriptionRequest, PrevOutput};
use crate::networks::Network;
use wasm_bindgen::{JsCast, JsValue};

// =============================================================================
// TryFromJsValue trait
// =============================================================================

/// Trait for converting JsValue to Rust types
pub(crate) trait TryFromJsValue: Sized {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError>;
}

// =============================================================================
// TryFromJsValue implementations for primitive types
// =============================================================================

impl TryFromJsValue for String {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        value
            .as_string()
            .ok_or_else(|| WasmDoginalsError::new("Expected a string"))
    }
}

/// Largest integer a JS number holds without rounding
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn non_negative_integer(value: &JsValue) -> Result<u64, WasmDoginalsError> {
    let n = value
        .as_f64()
        .ok_or_else(|| WasmDoginalsError::new("Expected a number"))?;
    if !(0.0..=MAX_SAFE_INTEGER).contains(&n) || n.fract() != 0.0 {
        return Err(WasmDoginalsError::new(&format!(
            "Expected a non-negative integer, got {}",
            n
        )));
    }
    Ok(n as u64)
}

impl TryFromJsValue for u32 {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        let n = non_negative_integer(value)?;
        u32::try_from(n).map_err(|_| WasmDoginalsError::new(&format!("{} does not fit in u32", n)))
    }
}

/// Amounts arrive either as a number or as a bigint
impl TryFromJsValue for u64 {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        if value.is_bigint() {
            let big: js_sys::BigInt = value.clone().unchecked_into();
            let digits: String = big
                .to_string(10)
                .map_err(|_| WasmDoginalsError::new("Failed to format bigint"))?
                .into();
            return digits
                .parse()
                .map_err(|_| WasmDoginalsError::new(&format!("{} does not fit in u64", digits)));
        }
        non_negative_integer(value)
    }
}

impl TryFromJsValue for Vec<u8> {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        if !value.is_instance_of::<js_sys::Uint8Array>() {
            return Err(WasmDoginalsError::new("Expected a Uint8Array"));
        }
        let buffer = js_sys::Uint8Array::new(value);
        let mut bytes = vec![0u8; buffer.length() as usize];
        buffer.copy_to(&mut bytes);
        Ok(bytes)
    }
}

impl<T: TryFromJsValue> TryFromJsValue for Option<T> {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        if value.is_undefined() || value.is_null() {
            Ok(None)
        } else {
            T::try_from_js_value(value).map(Some)
        }
    }
}

// =============================================================================
// Field access functions
// =============================================================================

/// Get a raw JsValue field from an object without conversion
fn get_raw_field(obj: &JsValue, key: &str) -> Result<JsValue, WasmDoginalsError> {
    js_sys::Reflect::get(obj, &JsValue::from_str(key))
        .map_err(|_| WasmDoginalsError::new(&format!("Failed to read {} from object", key)))
}

/// Get a field and convert it using TryFromJsValue
pub(crate) fn get_field<T: TryFromJsValue>(obj: &JsValue, key: &str) -> Result<T, WasmDoginalsError> {
    let field_value = get_raw_field(obj, key)?;
    T::try_from_js_value(&field_value)
        .map_err(|e| WasmDoginalsError::new(&format!("{} (field: {})", e, key)))
}

/// Convert every element of a JS array
fn array_from_js_value<T: TryFromJsValue>(value: &JsValue) -> Result<Vec<T>, WasmDoginalsError> {
    if !js_sys::Array::is_array(value) {
        return Err(WasmDoginalsError::new("Expected an array"));
    }
    js_sys::Array::from(value)
        .iter()
        .enumerate()
        .map(|(i, item)| {
            T::try_from_js_value(&item)
                .map_err(|e| WasmDoginalsError::new(&format!("{} (index: {})", e, i)))
        })
        .collect()
}

// =============================================================================
// TryFromJsValue implementations for domain types
// =============================================================================

impl TryFromJsValue for Network {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        let network_str = value
            .as_string()
            .ok_or_else(|| WasmDoginalsError::new("Expected a string for network parameter"))?;

        Network::from_utxolib_name(&network_str)
            .or_else(|| Network::from_coin_name(&network_str))
            .ok_or_else(|| {
                WasmDoginalsError::new(&format!(
                    "Unknown network '{}'. Expected a utxolib name (e.g., 'dogecoin', 'dogecoinTest') \
                     or coin name (e.g., 'doge', 'tdoge')",
                    network_str
                ))
            })
    }
}

impl TryFromJsValue for PrevOutput {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        Ok(PrevOutput {
            txid: get_field(value, "txId")?,
            vout: get_field(value, "vOut")?,
            amount: get_field(value, "amount")?,
            address: get_field(value, "address")?,
            private_key: get_field(value, "privateKey")?,
        })
    }
}

impl TryFromJsValue for Vec<PrevOutput> {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        array_from_js_value(value)
    }
}

/// Inscription body: raw bytes, or a string taken as UTF-8
struct Body(Vec<u8>);

impl TryFromJsValue for Body {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        match value.as_string() {
            Some(text) => Ok(Body(text.into_bytes())),
            None => Vec::<u8>::try_from_js_value(value)
                .map(Body)
                .map_err(|_| WasmDoginalsError::new("Expected a string or Uint8Array")),
        }
    }
}

impl TryFromJsValue for InscriptionData {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        let body: Body = get_field(value, "body")?;
        Ok(InscriptionData {
            content_type: get_field(value, "contentType")?,
            body: body.0,
            reveal_address: get_field(value, "revealAddr")?,
        })
    }
}

impl TryFromJsValue for InscriptionRequest {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmDoginalsError> {
        let reveal_out_value: Option<u64> = get_field(value, "revealOutValue")?;
        Ok(InscriptionRequest {
            commit_tx_prev_outputs: get_field(value, "commitTxPrevOutputList")?,
            commit_fee_rate: get_field(value, "commitFeeRate")?,
            reveal_fee_rate: get_field(value, "revealFeeRate")?,
            reveal_out_value: reveal_out_value.unwrap_or(0),
            inscription_data: get_field(value, "inscriptionData")?,
            change_address: get_field(value, "address")?,
            min_change_value: get_field(value, "dustMinValue")?,
        })
    }
}
