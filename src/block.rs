//! Block header: wire format, identity, version-bit signalling and
//! proof-of-work target

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{BitcoinError, Result};
use crate::hash::{hash256, hash256_reversed};
use crate::serialize::{write_hash_reversed, Reader};
use crate::types::*;

/// Exponent of the lowest-difficulty target (bits 0x1d00ffff)
const DIFFICULTY_ONE_EXPONENT: u32 = 0x1d;
const DIFFICULTY_ONE_COEFFICIENT: u32 = 0xffff;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    /// Display order
    #[serde(with = "hex::serde")]
    pub prev_block: Hash,
    /// Display order
    #[serde(with = "hex::serde")]
    pub merkle_root: Hash,
    pub timestamp: u32,
    #[serde(with = "hex::serde")]
    pub bits: [u8; 4],
    #[serde(with = "hex::serde")]
    pub nonce: [u8; 4],
}

impl BlockHeader {
    /// Parses exactly one 80-byte header
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != BLOCK_HEADER_SIZE {
            return Err(BitcoinError::Serialization(format!(
                "block header must be {} bytes, got {}",
                BLOCK_HEADER_SIZE,
                bytes.len()
            )));
        }
        Self::parse_from(&mut Reader::new(bytes))
    }

    pub fn parse_from(reader: &mut Reader) -> Result<Self> {
        Ok(BlockHeader {
            version: reader.read_u32_le()?,
            prev_block: reader.read_hash_reversed()?,
            merkle_root: reader.read_hash_reversed()?,
            timestamp: reader.read_u32_le()?,
            bits: reader.read_array()?,
            nonce: reader.read_array()?,
        })
    }

    pub fn serialize(&self) -> ByteString {
        let mut out = Vec::with_capacity(BLOCK_HEADER_SIZE);
        out.extend_from_slice(&self.version.to_le_bytes());
        write_hash_reversed(&mut out, &self.prev_block);
        write_hash_reversed(&mut out, &self.merkle_root);
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.bits);
        out.extend_from_slice(&self.nonce);
        out
    }

    /// Reversed double-SHA256 of the 80 header bytes
    pub fn hash(&self) -> Hash {
        hash256_reversed(&self.serialize())
    }

    pub fn id(&self) -> String {
        hex::encode(self.hash())
    }

    /// Top three version bits are 001
    pub fn bip9(&self) -> bool {
        self.version >> 29 == 0b001
    }

    /// Bit 4 (segwit2x signalling)
    pub fn bip91(&self) -> bool {
        (self.version >> 4) & 1 == 1
    }

    /// Bit 1 (segwit signalling)
    pub fn bip141(&self) -> bool {
        (self.version >> 1) & 1 == 1
    }

    /// Target encoded by `bits`: coefficient * 256^(exponent - 3)
    pub fn target(&self) -> BigUint {
        bits_to_target(&self.bits)
    }

    /// Ratio of the lowest-difficulty target to this header's target
    pub fn difficulty(&self) -> BigUint {
        let target = self.target();
        if target.is_zero() {
            return BigUint::zero();
        }
        let one = BigUint::from(DIFFICULTY_ONE_COEFFICIENT)
            * BigUint::from(256u32).pow(DIFFICULTY_ONE_EXPONENT - 3);
        one / target
    }

    /// Header hash, read as a little-endian integer, is below the target
    pub fn check_proof_of_work(&self) -> bool {
        let proof = BigUint::from_bytes_le(&hash256(&self.serialize()));
        proof < self.target()
    }
}

/// Expands compact `bits` (3-byte little-endian coefficient, 1-byte
/// exponent) into the full target.
pub fn bits_to_target(bits: &[u8; 4]) -> BigUint {
    let exponent = bits[3] as i32;
    let coefficient = BigUint::from_bytes_le(&bits[..3]);
    if exponent >= 3 {
        coefficient * BigUint::from(256u32).pow((exponent - 3) as u32)
    } else {
        coefficient >> (8 * (3 - exponent) as usize)
    }
}
