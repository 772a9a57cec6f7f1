//! Chunk-level script codec
//!
//! Inscription envelopes are assembled and split at the granularity of
//! individual pushes, so scripts are kept as a list of [`Chunk`]s until they
//! are serialized. The byte length of a script can be predicted from its
//! chunks without serializing it; both paths share the same push table.

use miniscript::bitcoin::opcodes::all::{
    OP_PUSHBYTES_0, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4, OP_PUSHNUM_1,
};
use miniscript::bitcoin::opcodes::Opcode;
use miniscript::bitcoin::ScriptBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("push of {0} bytes does not fit any push opcode")]
    PushTooLarge(usize),

    #[error("script truncated at offset {offset}: need {needed} more bytes")]
    Truncated { offset: usize, needed: usize },
}

/// How a data push is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    /// The opcode itself is the data length (0..=75).
    Direct,
    PushData1,
    PushData2,
    PushData4,
}

/// Largest data length each push kind can carry, smallest first.
pub const PUSH_STRATEGIES: [(usize, PushKind); 4] = [
    (0x4b, PushKind::Direct),
    (0xff, PushKind::PushData1),
    (0xffff, PushKind::PushData2),
    (0xffff_ffff, PushKind::PushData4),
];

impl PushKind {
    /// Pick the push kind for `len` data bytes from [`PUSH_STRATEGIES`].
    pub fn for_len(len: usize) -> Result<PushKind, ScriptError> {
        PUSH_STRATEGIES
            .iter()
            .find(|(max, _)| len <= *max)
            .map(|(_, kind)| *kind)
            .ok_or(ScriptError::PushTooLarge(len))
    }

    /// Recover the push kind from a push opcode. `None` for non-push opcodes.
    pub fn from_opcode(opcode: u8) -> Option<PushKind> {
        match opcode {
            0x01..=0x4b => Some(PushKind::Direct),
            op if op == OP_PUSHDATA1.to_u8() => Some(PushKind::PushData1),
            op if op == OP_PUSHDATA2.to_u8() => Some(PushKind::PushData2),
            op if op == OP_PUSHDATA4.to_u8() => Some(PushKind::PushData4),
            _ => None,
        }
    }

    /// Number of little-endian length bytes that follow the opcode.
    pub fn length_field_size(self) -> usize {
        match self {
            PushKind::Direct => 0,
            PushKind::PushData1 => 1,
            PushKind::PushData2 => 2,
            PushKind::PushData4 => 4,
        }
    }

    fn opcode(self, len: usize) -> u8 {
        match self {
            PushKind::Direct => len as u8,
            PushKind::PushData1 => OP_PUSHDATA1.to_u8(),
            PushKind::PushData2 => OP_PUSHDATA2.to_u8(),
            PushKind::PushData4 => OP_PUSHDATA4.to_u8(),
        }
    }
}

/// One push-data or bare-opcode unit of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    opcode: u8,
    buf: Option<Vec<u8>>,
}

impl Chunk {
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Pushed bytes, `None` for bare opcodes (including `OP_0`).
    pub fn data(&self) -> Option<&[u8]> {
        self.buf.as_deref()
    }

    /// Length of the pushed data (0 for bare opcodes).
    pub fn len(&self) -> usize {
        self.buf.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push_kind(&self) -> PushKind {
        PushKind::from_opcode(self.opcode).unwrap_or(PushKind::Direct)
    }

    /// Predicted serialized length of this chunk.
    pub fn encoded_len(&self) -> usize {
        match &self.buf {
            None => 1,
            Some(buf) => 1 + self.push_kind().length_field_size() + buf.len(),
        }
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.opcode);
        let Some(buf) = &self.buf else {
            return;
        };
        match self.push_kind() {
            PushKind::Direct => {}
            PushKind::PushData1 => out.push(buf.len() as u8),
            PushKind::PushData2 => out.extend_from_slice(&(buf.len() as u16).to_le_bytes()),
            PushKind::PushData4 => out.extend_from_slice(&(buf.len() as u32).to_le_bytes()),
        }
        out.extend_from_slice(buf);
    }
}

/// Encode a small non-negative number the way the envelope counters are encoded.
///
/// 0 becomes `OP_0`, 1..=16 become `OP_1`..`OP_16`, 17..=127 a one-byte push and
/// anything larger a two-byte little-endian push.
pub fn number_to_chunk(n: u16) -> Chunk {
    match n {
        0 => opcode_to_chunk(OP_PUSHBYTES_0),
        1..=16 => Chunk {
            opcode: OP_PUSHNUM_1.to_u8() + (n as u8) - 1,
            buf: None,
        },
        17..=127 => Chunk {
            opcode: 1,
            buf: Some(vec![n as u8]),
        },
        _ => Chunk {
            opcode: 2,
            buf: Some(n.to_le_bytes().to_vec()),
        },
    }
}

/// Push `data` with the smallest push kind able to carry it.
pub fn buffer_to_chunk(data: &[u8]) -> Result<Chunk, ScriptError> {
    let kind = PushKind::for_len(data.len())?;
    Ok(Chunk {
        opcode: kind.opcode(data.len()),
        buf: if data.is_empty() {
            None
        } else {
            Some(data.to_vec())
        },
    })
}

pub fn opcode_to_chunk(opcode: Opcode) -> Chunk {
    Chunk {
        opcode: opcode.to_u8(),
        buf: None,
    }
}

/// Ordered list of chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    chunks: Vec<Chunk>,
}

impl Script {
    pub fn new() -> Self {
        Script::default()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks (not bytes, see [`Script::encoded_len`]).
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    pub fn push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        self.chunks.push(buffer_to_chunk(data)?);
        Ok(())
    }

    pub fn push_opcode(&mut self, opcode: Opcode) {
        self.chunks.push(opcode_to_chunk(opcode));
    }

    pub fn append(&mut self, other: &Script) {
        self.chunks.extend(other.chunks.iter().cloned());
    }

    /// Predicted serialized length, without serializing.
    pub fn encoded_len(&self) -> usize {
        self.chunks.iter().map(Chunk::encoded_len).sum()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        for chunk in &self.chunks {
            chunk.write_to(&mut out);
        }
        out
    }

    pub fn to_script_buf(&self) -> ScriptBuf {
        ScriptBuf::from_bytes(self.to_bytes())
    }

    /// Parse raw script bytes into chunks.
    pub fn decode(bytes: &[u8]) -> Result<Script, ScriptError> {
        let mut chunks = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let opcode = bytes[pos];
            let Some(kind) = PushKind::from_opcode(opcode) else {
                chunks.push(Chunk { opcode, buf: None });
                pos += 1;
                continue;
            };

            let field_start = pos + 1;
            let field_size = kind.length_field_size();
            let field = take(bytes, field_start, field_size)?;
            let len = match kind {
                PushKind::Direct => opcode as usize,
                _ => field
                    .iter()
                    .rev()
                    .fold(0usize, |acc, b| (acc << 8) | *b as usize),
            };
            let data_start = field_start + field_size;
            let data = take(bytes, data_start, len)?;
            chunks.push(Chunk {
                opcode,
                buf: Some(data.to_vec()),
            });
            pos = data_start + len;
        }
        Ok(Script { chunks })
    }
}

fn take(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], ScriptError> {
    let end = offset.checked_add(len).ok_or(ScriptError::Truncated {
        offset,
        needed: usize::MAX,
    })?;
    bytes.get(offset..end).ok_or_else(|| ScriptError::Truncated {
        offset,
        needed: end - bytes.len(),
    })
}

impl From<Vec<Chunk>> for Script {
    fn from(chunks: Vec<Chunk>) -> Self {
        Script { chunks }
    }
}

impl FromIterator<Chunk> for Script {
    fn from_iter<I: IntoIterator<Item = Chunk>>(iter: I) -> Self {
        Script {
            chunks: iter.into_iter().collect(),
        }
    }
}
