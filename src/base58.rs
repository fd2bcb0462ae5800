//! Base58Check encoding and legacy address construction

use crate::error::{BitcoinError, Result};
use crate::hash::hash256;
use crate::types::*;

/// Length of the double-SHA256 checksum suffix
const CHECKSUM_LEN: usize = 4;

/// Plain Base58; leading zero bytes become leading `1` characters
pub fn encode_base58(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn decode_base58(s: &str) -> Result<ByteString> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| BitcoinError::Base58(e.to_string()))
}

/// Base58 of `payload ‖ hash256(payload)[..4]`
pub fn encode_base58_checksum(payload: &[u8]) -> String {
    let mut data = payload.to_vec();
    data.extend_from_slice(&hash256(payload)[..CHECKSUM_LEN]);
    encode_base58(&data)
}

/// Decodes Base58Check and returns the payload with the checksum stripped
pub fn decode_base58_checksum(s: &str) -> Result<ByteString> {
    let mut data = decode_base58(s)?;
    if data.len() < CHECKSUM_LEN {
        return Err(BitcoinError::Base58(format!(
            "{} bytes is too short to carry a checksum",
            data.len()
        )));
    }
    let checksum = data.split_off(data.len() - CHECKSUM_LEN);
    if hash256(&data)[..CHECKSUM_LEN] != checksum[..] {
        return Err(BitcoinError::Base58(format!("bad checksum in {}", s)));
    }
    Ok(data)
}

pub fn h160_to_p2pkh_address(h160: &Hash160, network: Network) -> String {
    let mut payload = vec![network.p2pkh_prefix()];
    payload.extend_from_slice(h160);
    encode_base58_checksum(&payload)
}

pub fn h160_to_p2sh_address(h160: &Hash160, network: Network) -> String {
    let mut payload = vec![network.p2sh_prefix()];
    payload.extend_from_slice(h160);
    encode_base58_checksum(&payload)
}

/// Extracts the 20-byte hash from a P2PKH or P2SH address
pub fn decode_address(address: &str) -> Result<Hash160> {
    let payload = decode_base58_checksum(address)?;
    if payload.len() != 21 {
        return Err(BitcoinError::Base58(format!(
            "address payload is {} bytes, expected 21",
            payload.len()
        )));
    }
    let mut h160 = [0u8; 20];
    h160.copy_from_slice(&payload[1..]);
    Ok(h160)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h160(s: &str) -> Hash160 {
        let mut out = [0u8; 20];
        out.copy_from_slice(&hex::decode(s).unwrap());
        out
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(encode_base58(&[0, 0, 1]), "112");
        assert_eq!(decode_base58("112").unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn test_p2pkh_address() {
        let h = h160("74d691da1574e6b3c192ecfb52cc8984ee7b6c56");
        assert_eq!(
            h160_to_p2pkh_address(&h, Network::Mainnet),
            "1BenRpVUFK65JFWcQSuHnJKzc4M8ZP8Eqa"
        );
        assert_eq!(
            h160_to_p2pkh_address(&h, Network::Testnet),
            "mrAjisaT4LXL5MzE81sfcDYKU3wqWSvf9q"
        );
    }

    #[test]
    fn test_p2sh_address() {
        let h = h160("74d691da1574e6b3c192ecfb52cc8984ee7b6c56");
        assert_eq!(
            h160_to_p2sh_address(&h, Network::Mainnet),
            "3CLoMMyuoDQTPRD3XYZtCvgvkadrAdvdXh"
        );
        assert_eq!(
            h160_to_p2sh_address(&h, Network::Testnet),
            "2N3u1R6uwQfuobCqbCgBkpsgBxvr1tZpe7B"
        );
    }

    #[test]
    fn test_decode_address() {
        let h = decode_address("mnrVtF8DWjMu839VW3rBfgYaAfKk8983Xf").unwrap();
        assert_eq!(hex::encode(h), "507b27411ccf7f16f10297de6cef3f291623eddf");
    }

    #[test]
    fn test_bad_checksum() {
        // Last character altered
        let result = decode_base58_checksum("1BenRpVUFK65JFWcQSuHnJKzc4M8ZP8Eqb");
        assert!(matches!(result, Err(BitcoinError::Base58(_))));
    }

    #[test]
    fn test_invalid_character() {
        assert!(decode_base58("0OIl").is_err());
    }
}
