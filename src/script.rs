//! Script decoding and serialization
//!
//! A [`Script`] owns its raw bytes and decodes them into [`Operation`]s on
//! first use. The decoded sequence is cached for the lifetime of the script.

use std::fmt;
use std::ops::Add;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{BitcoinError, Result};
use crate::num::encode_num;
use crate::opcodes::op_name;
use crate::serialize::{write_varint, Reader};
use crate::types::*;

/// One decoded script element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Data push, including OP_0, OP_1NEGATE and OP_1..OP_16
    PushBytes(ByteString),
    /// Any other opcode, dispatched at execution time
    OpCode(u8),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(with = "hex::serde")]
    raw: ByteString,
    #[serde(skip)]
    ops: OnceLock<Vec<Operation>>,
}

impl Script {
    pub fn new(raw: ByteString) -> Self {
        Script { raw, ops: OnceLock::new() }
    }

    /// Encodes operations using the shortest push form for each data item
    pub fn from_operations(ops: &[Operation]) -> Self {
        let mut raw = Vec::new();
        for op in ops {
            match op {
                Operation::OpCode(code) => raw.push(*code),
                Operation::PushBytes(data) => {
                    let len = data.len();
                    if len == 0 {
                        raw.push(OP_0);
                    } else if len < OP_PUSHDATA1 as usize {
                        raw.push(len as u8);
                    } else if len <= 0xff {
                        raw.push(OP_PUSHDATA1);
                        raw.push(len as u8);
                    } else if len <= 0xffff {
                        raw.push(OP_PUSHDATA2);
                        raw.extend_from_slice(&(len as u16).to_le_bytes());
                    } else {
                        raw.push(OP_PUSHDATA4);
                        raw.extend_from_slice(&(len as u32).to_le_bytes());
                    }
                    raw.extend_from_slice(data);
                }
            }
        }
        let script = Script::new(raw);
        let _ = script.ops.set(ops.to_vec());
        script
    }

    /// Reads a VarInt-prefixed script. The body is decoded lazily.
    pub fn parse(reader: &mut Reader) -> Result<Self> {
        let raw = reader.read_var_bytes()?;
        Ok(Script::new(raw.to_vec()))
    }

    /// `OP_DUP OP_HASH160 <h160> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn p2pkh(h160: &Hash160) -> Self {
        Script::from_operations(&[
            Operation::OpCode(OP_DUP),
            Operation::OpCode(OP_HASH160),
            Operation::PushBytes(h160.to_vec()),
            Operation::OpCode(OP_EQUALVERIFY),
            Operation::OpCode(OP_CHECKSIG),
        ])
    }

    /// `OP_HASH160 <h160> OP_EQUAL`
    pub fn p2sh(h160: &Hash160) -> Self {
        Script::from_operations(&[
            Operation::OpCode(OP_HASH160),
            Operation::PushBytes(h160.to_vec()),
            Operation::OpCode(OP_EQUAL),
        ])
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Script body without the length prefix
    pub fn raw_serialize(&self) -> ByteString {
        self.raw.clone()
    }

    /// VarInt length followed by the body
    pub fn serialize(&self) -> ByteString {
        let mut out = Vec::with_capacity(self.raw.len() + 9);
        write_varint(&mut out, self.raw.len() as u64);
        out.extend_from_slice(&self.raw);
        out
    }

    /// Decoded operations, computed once and cached.
    pub fn operations(&self) -> Result<&[Operation]> {
        if let Some(ops) = self.ops.get() {
            return Ok(ops);
        }
        let ops = decode_operations(&self.raw)?;
        // A concurrent caller may have won the race with an identical result
        Ok(self.ops.get_or_init(|| ops))
    }

    /// Exactly `OP_HASH160 <20 bytes> OP_EQUAL`
    pub fn is_p2sh(&self) -> bool {
        matches!(
            self.operations(),
            Ok([
                Operation::OpCode(OP_HASH160),
                Operation::PushBytes(h),
                Operation::OpCode(OP_EQUAL),
            ]) if h.len() == 20
        )
    }

    /// Exactly `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn is_p2pkh(&self) -> bool {
        matches!(
            self.operations(),
            Ok([
                Operation::OpCode(OP_DUP),
                Operation::OpCode(OP_HASH160),
                Operation::PushBytes(h),
                Operation::OpCode(OP_EQUALVERIFY),
                Operation::OpCode(OP_CHECKSIG),
            ]) if h.len() == 20
        )
    }

    /// True if every operation is a data push
    pub fn is_push_only(&self) -> bool {
        match self.operations() {
            Ok(ops) => ops.iter().all(|op| matches!(op, Operation::PushBytes(_))),
            Err(_) => false,
        }
    }
}

/// Decodes a raw script body into operations.
///
/// Fails if a push declares more bytes than remain.
pub fn decode_operations(raw: &[u8]) -> Result<Vec<Operation>> {
    let mut reader = Reader::new(raw);
    let mut ops = Vec::new();
    while !reader.is_finished() {
        let code = reader.read_u8()?;
        let op = match code {
            OP_0 => Operation::PushBytes(Vec::new()),
            0x01..=0x4b => Operation::PushBytes(read_push(&mut reader, code as usize)?),
            OP_PUSHDATA1 => {
                let len = reader.read_u8().map_err(truncated)? as usize;
                Operation::PushBytes(read_push(&mut reader, len)?)
            }
            OP_PUSHDATA2 => {
                let len = reader.read_u16_le().map_err(truncated)? as usize;
                Operation::PushBytes(read_push(&mut reader, len)?)
            }
            OP_PUSHDATA4 => {
                let len = reader.read_u32_le().map_err(truncated)? as usize;
                Operation::PushBytes(read_push(&mut reader, len)?)
            }
            OP_1NEGATE => Operation::PushBytes(encode_num(-1)),
            OP_1..=OP_16 => Operation::PushBytes(encode_num((code - 0x50) as i64)),
            _ => Operation::OpCode(code),
        };
        ops.push(op);
    }
    Ok(ops)
}

fn read_push(reader: &mut Reader, len: usize) -> Result<ByteString> {
    if len > reader.remaining() {
        return Err(BitcoinError::ScriptParse(format!(
            "push of {} bytes at offset {} exceeds remaining {}",
            len,
            reader.position(),
            reader.remaining()
        )));
    }
    Ok(reader.read_slice(len)?.to_vec())
}

fn truncated(e: BitcoinError) -> BitcoinError {
    BitcoinError::ScriptParse(format!("truncated push length: {}", e))
}

impl PartialEq for Script {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Script {}

impl Add for &Script {
    type Output = Script;

    fn add(self, other: &Script) -> Script {
        let mut raw = self.raw.clone();
        raw.extend_from_slice(&other.raw);
        Script::new(raw)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops = match self.operations() {
            Ok(ops) => ops,
            Err(_) => return write!(f, "<undecodable {}>", hex::encode(&self.raw)),
        };
        let rendered: Vec<String> = ops
            .iter()
            .map(|op| match op {
                Operation::PushBytes(data) if data.is_empty() => "OP_0".to_string(),
                Operation::PushBytes(data) => hex::encode(data),
                Operation::OpCode(code) => op_name(*code).to_string(),
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}
