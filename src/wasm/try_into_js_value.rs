use crate::error::WasmDoginalsError;
use crate::inscriptions::InscriptionResult;
use js_sys::Array;
use wasm_bindgen::JsValue;

pub(crate) trait TryIntoJsValue {
    fn try_to_js_value(&self) -> Result<JsValue, WasmDoginalsError>;
}

macro_rules! js_obj {
    ( $( $key:expr => $value:expr ),* ) => {{
        let obj = js_sys::Object::new();
        $(
            js_sys::Reflect::set(&obj, &$key.into(), &$value.try_to_js_value()?.into())
                .map_err(|_| WasmDoginalsError::new("Failed to set object property"))?;
        )*
        Ok(Into::<JsValue>::into(obj)) as Result<JsValue, WasmDoginalsError>
    }};
}

impl From<WasmDoginalsError> for JsValue {
    fn from(err: WasmDoginalsError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

impl TryIntoJsValue for String {
    fn try_to_js_value(&self) -> Result<JsValue, WasmDoginalsError> {
        Ok(JsValue::from_str(self))
    }
}

// array of TryToJsValue
impl<T: TryIntoJsValue> TryIntoJsValue for Vec<T> {
    fn try_to_js_value(&self) -> Result<JsValue, WasmDoginalsError> {
        let arr = Array::new();
        for item in self.iter() {
            arr.push(&item.try_to_js_value()?);
        }
        Ok(arr.into())
    }
}

impl TryIntoJsValue for u64 {
    fn try_to_js_value(&self) -> Result<JsValue, WasmDoginalsError> {
        Ok(js_sys::BigInt::from(*self).into())
    }
}

impl TryIntoJsValue for Vec<u8> {
    fn try_to_js_value(&self) -> Result<JsValue, WasmDoginalsError> {
        Ok(js_sys::Uint8Array::from(&self[..]).into())
    }
}

impl TryIntoJsValue for InscriptionResult {
    fn try_to_js_value(&self) -> Result<JsValue, WasmDoginalsError> {
        js_obj!(
            "commitTx" => self.commit_tx,
            "revealTxs" => self.reveal_txs,
            "commitTxFee" => self.commit_tx_fee,
            "revealTxFees" => self.reveal_tx_fees,
            "commitAddrs" => self.commit_addrs
        )
    }
}
