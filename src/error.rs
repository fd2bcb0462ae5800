//! Error types for decoding and verification

use thiserror::Error;

/// Failures that abort an operation: malformed input, bad encodings,
/// collaborator errors.
#[derive(Error, Debug)]
pub enum BitcoinError {
    #[error("Unexpected end of data: {0}")]
    UnexpectedEnd(String),

    #[error("Script parse failed: {0}")]
    ScriptParse(String),

    #[error("Invalid SEC public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid DER signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid curve point: {0}")]
    InvalidPoint(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Base58 decoding failed: {0}")]
    Base58(String),

    #[error("Malformed merkle proof: {0}")]
    MalformedMerkleProof(String),

    #[error("Input index out of range: {0}")]
    InputOutOfRange(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BitcoinError>;

/// Reason a script evaluated to false.
///
/// These are ordinary outcomes of evaluation rather than errors in the
/// input encoding, so the interpreter reports them as values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptFailure {
    #[error("Stack underflow in {0}")]
    StackUnderflow(&'static str),

    #[error("{name} failed")]
    OpcodeFailed { name: &'static str },

    #[error("Unsupported opcode 0x{0:02x}")]
    UnsupportedOpcode(u8),

    #[error("Unbalanced conditional")]
    UnbalancedConditional,

    #[error("Push exceeds maximum element size: {0} bytes")]
    PushTooLarge(usize),

    #[error("Stack size limit exceeded")]
    StackOverflow,

    #[error("Script finished with an empty stack")]
    EmptyStack,

    #[error("Script finished with a false top element")]
    FalseResult,

    #[error("Invalid redeem script: {0}")]
    InvalidRedeemScript(String),
}
