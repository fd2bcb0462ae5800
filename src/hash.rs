//! Digest functions used by scripts, addresses, transactions and merkle trees

use bitcoin_hashes::{sha1, sha256d, Hash as BitcoinHash};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::types::*;

pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Double SHA-256
pub fn hash256(data: &[u8]) -> Hash {
    sha256d::Hash::hash(data).into_inner()
}

pub fn ripemd160(data: &[u8]) -> Hash160 {
    Ripemd160::digest(data).into()
}

/// RIPEMD160 of SHA-256
pub fn hash160(data: &[u8]) -> Hash160 {
    ripemd160(&sha256(data))
}

pub fn sha1(data: &[u8]) -> [u8; 20] {
    sha1::Hash::hash(data).into_inner()
}

/// Double SHA-256 in display order (byte-reversed), as used for
/// transaction and block identifiers
pub fn hash256_reversed(data: &[u8]) -> Hash {
    let mut hash = hash256(data);
    hash.reverse();
    hash
}
