use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Read a file, or stdin when `path` is `-`
pub fn read_input_bytes(path: &Path, what: &str) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {} from stdin", what))?;
        return Ok(bytes);
    }
    std::fs::read(path).with_context(|| format!("Failed to read {} from {}", what, path.display()))
}

/// Accept raw bytes or a hex string (surrounding whitespace ignored)
pub fn decode_input(raw: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(raw).ok().map(str::trim) {
        Some(text) if !text.is_empty() => hex::decode(text).unwrap_or_else(|_| raw.to_vec()),
        _ => raw.to_vec(),
    }
}
