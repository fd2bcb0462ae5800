//! Little-endian integer and VarInt encoding used by the wire formats

use crate::error::{BitcoinError, Result};
use crate::types::*;

/// Cursor over a borrowed byte slice.
///
/// Every read is bounds-checked and fails with `UnexpectedEnd` rather than
/// returning short data.
#[derive(Debug)]
pub struct Reader<'a> {
    buffer: &'a [u8],
    read: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Reader { buffer, read: 0 }
    }

    /// Number of bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.read
    }

    pub fn is_finished(&self) -> bool {
        self.read == self.buffer.len()
    }

    pub fn position(&self) -> usize {
        self.read
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(BitcoinError::UnexpectedEnd(format!(
                "wanted {} bytes at offset {}, {} available",
                len,
                self.read,
                self.remaining()
            )));
        }
        let result = &self.buffer[self.read..self.read + len];
        self.read += len;
        Ok(result)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a 32-byte hash stored little-endian on the wire and returns it
    /// in display (big-endian) order.
    pub fn read_hash_reversed(&mut self) -> Result<Hash> {
        let mut hash: Hash = self.read_array()?;
        hash.reverse();
        Ok(hash)
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        match self.read_u8()? {
            0xfd => Ok(self.read_u16_le()? as u64),
            0xfe => Ok(self.read_u32_le()? as u64),
            0xff => self.read_u64_le(),
            n => Ok(n as u64),
        }
    }

    /// Reads a VarInt length and checks it against the remaining buffer
    /// before anything is allocated for it.
    pub fn read_length(&mut self) -> Result<usize> {
        let len = self.read_varint()?;
        if len > self.remaining() as u64 {
            return Err(BitcoinError::UnexpectedEnd(format!(
                "declared length {} exceeds {} remaining bytes",
                len,
                self.remaining()
            )));
        }
        Ok(len as usize)
    }

    /// VarInt length followed by that many bytes
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_length()?;
        self.read_slice(len)
    }
}

/// Appends the VarInt encoding of `n`
pub fn write_varint(out: &mut ByteString, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x10000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

pub fn encode_varint(n: u64) -> ByteString {
    let mut out = Vec::with_capacity(9);
    write_varint(&mut out, n);
    out
}

/// Appends a hash in wire (little-endian) order
pub fn write_hash_reversed(out: &mut ByteString, hash: &Hash) {
    out.extend(hash.iter().rev());
}
