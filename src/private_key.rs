//! Private keys: ECDSA signing and Wallet Import Format

use bitcoin_hashes::{hmac, sha256, Hash as BitcoinHash, HashEngine};
use num_bigint::BigUint;
use num_traits::Zero;

use crate::base58::{decode_base58_checksum, encode_base58_checksum};
use crate::constants::*;
use crate::curve::{order, secp256k1};
use crate::error::{BitcoinError, Result};
use crate::field::*;
use crate::point::{is_valid_scalar, Point};
use crate::signature::Signature;
use crate::types::*;

/// Compression flag appended to compressed-key WIF payloads
const WIF_COMPRESSED_FLAG: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: BigUint,
    point: Point,
}

impl PrivateKey {
    /// `secret` must lie in `[1, N-1]`
    pub fn new(secret: BigUint) -> Result<Self> {
        if !is_valid_scalar(&secret) {
            return Err(BitcoinError::InvalidPrivateKey(
                "secret outside [1, N-1]".to_string(),
            ));
        }
        let point = Point::generator().scalar_multiply(&secret);
        Ok(PrivateKey { secret, point })
    }

    pub fn secret(&self) -> &BigUint {
        &self.secret
    }

    /// Public key `secret·G`
    pub fn public_key(&self) -> &Point {
        &self.point
    }

    /// Signs message hash `z` with an RFC 6979 nonce.
    pub fn sign(&self, z: &BigUint) -> Result<Signature> {
        let k = self.deterministic_k(z);
        self.sign_with_nonce(z, &k)
    }

    /// Signs with a caller-chosen nonce. Reusing `k` across messages leaks
    /// the secret.
    pub fn sign_with_nonce(&self, z: &BigUint, k: &BigUint) -> Result<Signature> {
        let n = order();
        if !is_valid_scalar(k) {
            return Err(BitcoinError::InvalidPrivateKey("nonce outside [1, N-1]".to_string()));
        }
        let r = match Point::generator().scalar_multiply(k).x() {
            Some(x) => normalize(x, n),
            None => {
                return Err(BitcoinError::InvalidPrivateKey("nonce produced infinity".to_string()))
            }
        };
        if r.is_zero() {
            return Err(BitcoinError::InvalidPrivateKey("nonce produced r = 0".to_string()));
        }
        let k_inv = mod_inv(k, n);
        let mut s = mod_mul(&mod_add(z, &mod_mul(&r, &self.secret, n), n), &k_inv, n);
        if s.is_zero() {
            return Err(BitcoinError::InvalidPrivateKey("nonce produced s = 0".to_string()));
        }
        if s > secp256k1().half_n {
            s = n - s;
        }
        Ok(Signature::new(r, s))
    }

    /// RFC 6979 nonce generation with HMAC-SHA256
    pub fn deterministic_k(&self, z: &BigUint) -> BigUint {
        let n = order();
        let secret_bytes = to_bytes32(&self.secret);
        let z_bytes = to_bytes32(&normalize(z, n));

        let mut k = [0u8; 32];
        let mut v = [1u8; 32];
        k = hmac_sha256(&k, &[&v, &[0x00], &secret_bytes, &z_bytes]);
        v = hmac_sha256(&k, &[&v]);
        k = hmac_sha256(&k, &[&v, &[0x01], &secret_bytes, &z_bytes]);
        v = hmac_sha256(&k, &[&v]);
        loop {
            v = hmac_sha256(&k, &[&v]);
            let candidate = from_bytes_be(&v);
            if is_valid_scalar(&candidate) {
                return candidate;
            }
            k = hmac_sha256(&k, &[&v, &[0x00]]);
            v = hmac_sha256(&k, &[&v]);
        }
    }

    /// Wallet Import Format: `prefix ‖ secret(32) ‖ [01]`, Base58Check
    pub fn wif(&self, compressed: bool, network: Network) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(network.wif_prefix());
        payload.extend_from_slice(&to_bytes32(&self.secret));
        if compressed {
            payload.push(WIF_COMPRESSED_FLAG);
        }
        encode_base58_checksum(&payload)
    }

    /// Parses a WIF string, returning the key, its network and whether the
    /// public key is meant to be serialized compressed.
    pub fn from_wif(wif: &str) -> Result<(Self, Network, bool)> {
        let payload = decode_base58_checksum(wif)?;
        let network = match payload.first() {
            Some(&MAINNET_WIF_PREFIX) => Network::Mainnet,
            Some(&TESTNET_WIF_PREFIX) => Network::Testnet,
            _ => {
                return Err(BitcoinError::InvalidPrivateKey(
                    "unknown WIF prefix".to_string(),
                ))
            }
        };
        let compressed = match payload.len() {
            33 => false,
            34 if payload[33] == WIF_COMPRESSED_FLAG => true,
            len => {
                return Err(BitcoinError::InvalidPrivateKey(format!(
                    "WIF payload of {} bytes",
                    len
                )))
            }
        };
        let key = PrivateKey::new(from_bytes_be(&payload[1..33]))?;
        Ok((key, network, compressed))
    }
}

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut engine = hmac::HmacEngine::<sha256::Hash>::new(key);
    for part in parts {
        engine.input(part);
    }
    hmac::Hmac::<sha256::Hash>::from_engine(engine).into_inner()
}
