#[macro_use]
mod try_into_js_value;
mod inscriptions;
mod try_from_js_value;

pub use inscriptions::InscriptionsNamespace;
