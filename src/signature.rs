//! ECDSA signatures and their DER encoding

use std::fmt;

use num_bigint::BigUint;

use crate::error::{BitcoinError, Result};
use crate::field::from_bytes_be;
use crate::serialize::Reader;
use crate::types::*;

const DER_SEQUENCE: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub r: BigUint,
    pub s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Signature { r, s }
    }

    /// `30 ‖ len ‖ 02 ‖ rlen ‖ r ‖ 02 ‖ slen ‖ s`
    pub fn der(&self) -> ByteString {
        let r = der_integer(&self.r);
        let s = der_integer(&self.s);
        let mut out = Vec::with_capacity(6 + r.len() + s.len());
        out.push(DER_SEQUENCE);
        out.push((r.len() + s.len() + 4) as u8);
        out.push(DER_INTEGER);
        out.push(r.len() as u8);
        out.extend_from_slice(&r);
        out.push(DER_INTEGER);
        out.push(s.len() as u8);
        out.extend_from_slice(&s);
        out
    }

    pub fn parse_der(der: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(der);
        let marker = reader.read_u8().map_err(invalid)?;
        if marker != DER_SEQUENCE {
            return Err(BitcoinError::InvalidSignature(format!(
                "expected sequence tag 0x30, found 0x{:02x}",
                marker
            )));
        }
        let length = reader.read_u8().map_err(invalid)? as usize;
        if length != reader.remaining() {
            return Err(BitcoinError::InvalidSignature(format!(
                "sequence length {} does not match {} remaining bytes",
                length,
                reader.remaining()
            )));
        }
        let r = read_der_integer(&mut reader)?;
        let s = read_der_integer(&mut reader)?;
        if !reader.is_finished() {
            return Err(BitcoinError::InvalidSignature(
                "trailing bytes after s".to_string(),
            ));
        }
        Ok(Signature { r, s })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:x},{:x})", self.r, self.s)
    }
}

/// Minimal big-endian magnitude, with a 0x00 prefix when the high bit is set
fn der_integer(value: &BigUint) -> ByteString {
    let bytes = value.to_bytes_be();
    let mut out = Vec::with_capacity(bytes.len() + 1);
    if bytes[0] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(&bytes);
    out
}

fn read_der_integer(reader: &mut Reader) -> Result<BigUint> {
    let marker = reader.read_u8().map_err(invalid)?;
    if marker != DER_INTEGER {
        return Err(BitcoinError::InvalidSignature(format!(
            "expected integer tag 0x02, found 0x{:02x}",
            marker
        )));
    }
    let len = reader.read_u8().map_err(invalid)? as usize;
    if len == 0 {
        return Err(BitcoinError::InvalidSignature("zero-length integer".to_string()));
    }
    let bytes = reader.read_slice(len).map_err(invalid)?;
    Ok(from_bytes_be(bytes))
}

fn invalid(e: BitcoinError) -> BitcoinError {
    BitcoinError::InvalidSignature(e.to_string())
}
