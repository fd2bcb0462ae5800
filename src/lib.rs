//! # Bitcoin-Verify
//!
//! Transaction and merkle-proof verification built from first principles.
//!
//! This crate implements the cryptographic and interpretive core needed to
//! decide whether a Bitcoin transaction is valid: secp256k1 arithmetic and
//! ECDSA over arbitrary-precision integers, the script decoder and stack
//! interpreter, the legacy signature hash, and partial merkle tree
//! reconstruction for merkle block proofs.
//!
//! ## Architecture
//!
//! The system is layered bottom-up:
//! - Field arithmetic, curve points, signatures and private keys
//! - Encodings (SEC, DER, WIF, Base58Check) and hashing
//! - Script decoding, the opcode table and the interpreter
//! - Transaction wire format, signature hash and input verification
//! - Block headers and merkle proofs
//!
//! Previous transactions are resolved through the [`TxProvider`] trait;
//! where they come from is up to the caller.
//!
//! ## Design Principles
//!
//! 1. **Explicit failures**: malformed input is an `Err`, a script that
//!    evaluates to false is a `ValidationResult::Invalid` with a reason
//! 2. **No panics on input**: every decoder is bounds-checked
//! 3. **Deterministic signing**: nonces follow RFC 6979
//!
//! ## Usage
//!
//! ```rust
//! use bitcoin_verify::PrivateKey;
//! use num_bigint::BigUint;
//!
//! let key = PrivateKey::new(BigUint::from(12345u32)).unwrap();
//! let z = BigUint::from(0xdeadbeefu32);
//! let sig = key.sign(&z).unwrap();
//! assert!(key.public_key().verify(&z, &sig));
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod serialize;
pub mod hash;
pub mod base58;
pub mod field;
pub mod curve;
pub mod point;
pub mod signature;
pub mod private_key;
pub mod stack;
pub mod num;
pub mod script;
pub mod opcodes;
pub mod interpreter;
pub mod transaction;
pub mod provider;
pub mod block;
pub mod merkle;

// Re-export commonly used types
pub use types::*;
pub use error::{BitcoinError, Result, ScriptFailure};
pub use point::Point;
pub use signature::Signature;
pub use private_key::PrivateKey;
pub use script::{Operation, Script};
pub use transaction::{Tx, TxIn, TxOut};
pub use provider::{CachingTxProvider, MemoryTxProvider, TxProvider};
pub use block::BlockHeader;
pub use merkle::{MerkleBlock, MerkleTree};

use num_bigint::BigUint;

/// Verification entry points bound to one transaction source and network
///
/// # Examples
///
/// ```
/// use bitcoin_verify::*;
///
/// let prev = Tx {
///     version: 1,
///     inputs: vec![],
///     outputs: vec![TxOut::new(1000, Script::new(vec![0x51]))], // OP_1
///     lock_time: 0,
///     network: Network::Mainnet,
/// };
/// let spend = Tx {
///     version: 1,
///     inputs: vec![TxIn::new(prev.hash(), 0)],
///     outputs: vec![TxOut::new(900, Script::new(vec![0x51]))],
///     lock_time: 0,
///     network: Network::Mainnet,
/// };
///
/// let mut provider = MemoryTxProvider::new();
/// provider.insert(prev);
/// let verifier = BitcoinVerify::new(provider, Network::Mainnet);
///
/// assert_eq!(verifier.fee(&spend).unwrap(), 100);
/// assert_eq!(verifier.verify_transaction(&spend).unwrap(), ValidationResult::Valid);
/// ```
#[derive(Debug)]
pub struct BitcoinVerify<P: TxProvider> {
    provider: P,
    network: Network,
}

impl<P: TxProvider> BitcoinVerify<P> {
    /// Create a verifier over `provider`
    ///
    /// # Examples
    ///
    /// ```
    /// use bitcoin_verify::{BitcoinVerify, MemoryTxProvider, Network};
    ///
    /// let verifier = BitcoinVerify::new(MemoryTxProvider::new(), Network::Testnet);
    /// assert!(verifier.network().is_testnet());
    /// ```
    pub fn new(provider: P, network: Network) -> Self {
        BitcoinVerify { provider, network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Parse a serialized transaction on this verifier's network
    pub fn parse_transaction(&self, bytes: &[u8]) -> Result<Tx> {
        Tx::parse(bytes, self.network)
    }

    /// Check the fee is non-negative and every input's scripts succeed
    pub fn verify_transaction(&self, tx: &Tx) -> Result<ValidationResult> {
        tx.verify(&self.provider)
    }

    /// Run the scripts of a single input
    pub fn verify_input(&self, tx: &Tx, input_index: usize) -> Result<ValidationResult> {
        tx.verify_input(input_index, &self.provider)
    }

    /// Inputs minus outputs, in satoshis
    pub fn fee(&self, tx: &Tx) -> Result<i64> {
        tx.fee(&self.provider)
    }

    /// Legacy SIGHASH_ALL hash of one input
    pub fn sig_hash(
        &self,
        tx: &Tx,
        input_index: usize,
        redeem_script: Option<&Script>,
    ) -> Result<BigUint> {
        tx.sig_hash(input_index, redeem_script, &self.provider)
    }

    /// Check a merkle block proof against its header's merkle root
    ///
    /// # Examples
    ///
    /// ```
    /// use bitcoin_verify::*;
    ///
    /// // A single-transaction block: the leaf is the root.
    /// let leaf = [0xab; 32];
    /// let block = MerkleBlock {
    ///     header: BlockHeader {
    ///         version: 1,
    ///         prev_block: [0; 32],
    ///         merkle_root: leaf,
    ///         timestamp: 0,
    ///         bits: [0xff, 0xff, 0x00, 0x1d],
    ///         nonce: [0; 4],
    ///     },
    ///     total: 1,
    ///     hashes: vec![leaf],
    ///     flags: vec![0x01],
    /// };
    ///
    /// let verifier = BitcoinVerify::new(MemoryTxProvider::new(), Network::Mainnet);
    /// assert!(verifier.validate_merkle_block(&block).unwrap());
    /// ```
    pub fn validate_merkle_block(&self, block: &MerkleBlock) -> Result<bool> {
        block.is_valid()
    }
}
