//! Core types shared across the crate

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// 160-bit hash (RIPEMD160 of SHA256)
pub type Hash160 = [u8; 20];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Network a transaction, key or address belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn is_testnet(self) -> bool {
        self == Network::Testnet
    }

    /// Version byte for pay-to-pubkey-hash addresses
    pub fn p2pkh_prefix(self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2PKH_PREFIX,
            Network::Testnet => TESTNET_P2PKH_PREFIX,
        }
    }

    /// Version byte for pay-to-script-hash addresses
    pub fn p2sh_prefix(self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2SH_PREFIX,
            Network::Testnet => TESTNET_P2SH_PREFIX,
        }
    }

    /// Version byte for Wallet Import Format keys
    pub fn wif_prefix(self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_WIF_PREFIX,
            Network::Testnet => TESTNET_WIF_PREFIX,
        }
    }
}
