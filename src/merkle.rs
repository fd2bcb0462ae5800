//! Merkle trees: full-root computation and partial-tree reconstruction
//! for merkle block proofs
//!
//! Hashes handled here are in internal (wire) byte order. `MerkleBlock`
//! stores display order, like `BlockHeader`, and converts before walking.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::block::BlockHeader;
use crate::constants::MAX_MERKLE_BLOCK_TRANSACTIONS;
use crate::error::{BitcoinError, Result};
use crate::hash::hash256;
use crate::serialize::Reader;
use crate::types::*;

/// Double-SHA256 of the two children concatenated
pub fn merkle_parent(left: &Hash, right: &Hash) -> Hash {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left);
    data[32..].copy_from_slice(right);
    hash256(&data)
}

/// Pairs up one level; an odd last hash is paired with itself.
pub fn merkle_parent_level(hashes: &[Hash]) -> Vec<Hash> {
    hashes
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => merkle_parent(left, right),
            _ => merkle_parent(&pair[0], &pair[0]),
        })
        .collect()
}

/// Root of a full list of leaves, `None` for an empty list
pub fn merkle_root(hashes: &[Hash]) -> Option<Hash> {
    let mut level = hashes.to_vec();
    while level.len() > 1 {
        level = merkle_parent_level(&level);
    }
    level.first().copied()
}

/// Flag bits, least significant bit of each byte first
pub fn bytes_to_bit_field(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|byte| (0..8).map(move |i| (byte >> i) & 1 == 1))
        .collect()
}

/// Partially known merkle tree walked with a (depth, index) cursor.
///
/// Level 0 holds the root and level `max_depth` the leaves; level `d`
/// has `ceil(total / 2^(max_depth - d))` slots.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Option<Hash>>>,
    total: u32,
    max_depth: u32,
    current_depth: u32,
    current_index: usize,
}

impl MerkleTree {
    pub fn new(total: u32) -> Result<Self> {
        if total == 0 {
            return Err(BitcoinError::MalformedMerkleProof(
                "tree must have at least one leaf".to_string(),
            ));
        }
        if total > MAX_MERKLE_BLOCK_TRANSACTIONS {
            return Err(BitcoinError::MalformedMerkleProof(format!(
                "{} transactions exceeds the block limit of {}",
                total, MAX_MERKLE_BLOCK_TRANSACTIONS
            )));
        }
        let max_depth = ceil_log2(total);
        let levels = (0..=max_depth)
            .map(|depth| {
                let width = 1u64 << (max_depth - depth);
                let slots = (total as u64 + width - 1) / width;
                vec![None; slots as usize]
            })
            .collect();
        Ok(MerkleTree {
            levels,
            total,
            max_depth,
            current_depth: 0,
            current_index: 0,
        })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Slots of one level, `None` where the hash is not yet known
    pub fn level(&self, depth: u32) -> Option<&[Option<Hash>]> {
        self.levels.get(depth as usize).map(|l| l.as_slice())
    }

    pub fn up(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
        self.current_index /= 2;
    }

    pub fn left(&mut self) {
        self.current_depth += 1;
        self.current_index *= 2;
    }

    pub fn right(&mut self) {
        self.current_depth += 1;
        self.current_index = self.current_index * 2 + 1;
    }

    pub fn root(&self) -> Option<Hash> {
        self.levels[0][0]
    }

    pub fn set_current_node(&mut self, hash: Hash) {
        self.levels[self.current_depth as usize][self.current_index] = Some(hash);
    }

    pub fn get_current_node(&self) -> Option<Hash> {
        self.levels[self.current_depth as usize][self.current_index]
    }

    pub fn get_left_node(&self) -> Option<Hash> {
        self.child(self.current_index * 2)
    }

    pub fn get_right_node(&self) -> Option<Hash> {
        self.child(self.current_index * 2 + 1)
    }

    fn child(&self, index: usize) -> Option<Hash> {
        self.levels
            .get(self.current_depth as usize + 1)
            .and_then(|level| level.get(index))
            .copied()
            .flatten()
    }

    pub fn is_leaf(&self) -> bool {
        self.current_depth == self.max_depth
    }

    /// The current node has a right child slot (odd levels lack one at
    /// their end)
    pub fn right_exists(&self) -> bool {
        self.levels
            .get(self.current_depth as usize + 1)
            .map_or(false, |level| level.len() > self.current_index * 2 + 1)
    }

    /// Fills the tree from a depth-first flag/hash stream until the root
    /// is known.
    ///
    /// Every visited node consumes one flag bit. A leaf, or an interior
    /// node whose bit is 0, also consumes the next hash. All hashes must
    /// be used and any unused flag bits must be 0.
    pub fn populate(&mut self, flag_bits: &[bool], hashes: &[Hash]) -> Result<()> {
        if hashes.len() > self.total as usize {
            return Err(BitcoinError::MalformedMerkleProof(format!(
                "{} hashes for {} transactions",
                hashes.len(),
                self.total
            )));
        }
        if flag_bits.len() < hashes.len() {
            return Err(BitcoinError::MalformedMerkleProof(format!(
                "{} flag bits for {} hashes",
                flag_bits.len(),
                hashes.len()
            )));
        }
        let mut flags = flag_bits.iter();
        let mut hashes = hashes.iter();
        let mut next_flag = || {
            flags.next().copied().ok_or_else(|| {
                BitcoinError::MalformedMerkleProof("ran out of flag bits".to_string())
            })
        };

        while self.root().is_none() {
            if self.is_leaf() {
                next_flag()?;
                self.set_current_node(next_hash(&mut hashes)?);
                self.up();
                continue;
            }
            match self.get_left_node() {
                None => {
                    if next_flag()? {
                        self.left();
                    } else {
                        self.set_current_node(next_hash(&mut hashes)?);
                        self.up();
                    }
                }
                Some(left) if self.right_exists() => match self.get_right_node() {
                    None => self.right(),
                    Some(right) => {
                        self.set_current_node(merkle_parent(&left, &right));
                        self.up();
                    }
                },
                Some(left) => {
                    self.set_current_node(merkle_parent(&left, &left));
                    self.up();
                }
            }
        }

        let unused_hashes = hashes.count();
        if unused_hashes > 0 {
            return Err(BitcoinError::MalformedMerkleProof(format!(
                "{} hashes not consumed",
                unused_hashes
            )));
        }
        if flags.any(|bit| *bit) {
            return Err(BitcoinError::MalformedMerkleProof(
                "flag bits set after the root was reached".to_string(),
            ));
        }
        Ok(())
    }
}

fn next_hash<'a>(hashes: &mut impl Iterator<Item = &'a Hash>) -> Result<Hash> {
    hashes
        .next()
        .copied()
        .ok_or_else(|| BitcoinError::MalformedMerkleProof("ran out of hashes".to_string()))
}

fn ceil_log2(n: u32) -> u32 {
    if n <= 1 {
        0
    } else {
        32 - (n - 1).leading_zeros()
    }
}

/// Header plus a partial merkle tree proving membership of some of the
/// block's transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleBlock {
    pub header: BlockHeader,
    pub total: u32,
    /// Display order
    pub hashes: Vec<Hash>,
    #[serde(with = "hex::serde")]
    pub flags: ByteString,
}

impl MerkleBlock {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let header = BlockHeader::parse_from(&mut reader)?;
        let total = reader.read_u32_le()?;
        let hash_count = reader.read_varint()?;
        let mut hashes = Vec::new();
        for _ in 0..hash_count {
            hashes.push(reader.read_hash_reversed()?);
        }
        let flags = reader.read_var_bytes()?.to_vec();
        if !reader.is_finished() {
            return Err(BitcoinError::Serialization(format!(
                "{} trailing bytes after merkle block",
                reader.remaining()
            )));
        }
        Ok(MerkleBlock {
            header,
            total,
            hashes,
            flags,
        })
    }

    /// Rebuilds the partial tree and compares its root with the header.
    ///
    /// `Ok(false)` means a well-formed proof for a different root;
    /// malformed proofs are errors.
    pub fn is_valid(&self) -> Result<bool> {
        let hashes: Vec<Hash> = self
            .hashes
            .iter()
            .map(|h| {
                let mut wire = *h;
                wire.reverse();
                wire
            })
            .collect();
        let mut tree = MerkleTree::new(self.total)?;
        tree.populate(&bytes_to_bit_field(&self.flags), &hashes)?;
        let mut root = tree.root().ok_or_else(|| {
            BitcoinError::MalformedMerkleProof("root not reconstructed".to_string())
        })?;
        root.reverse();
        let valid = root == self.header.merkle_root;
        debug!(
            "merkle block {}: computed root {} valid={}",
            self.header.id(),
            hex::encode(root),
            valid
        );
        Ok(valid)
    }
}
