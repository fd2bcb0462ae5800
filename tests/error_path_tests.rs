//! Tests for error paths and malformed input

use bitcoin_verify::base58::{decode_address, decode_base58_checksum, encode_base58_checksum};
use bitcoin_verify::serialize::Reader;
use bitcoin_verify::*;
use num_bigint::BigUint;

#[test]
fn test_truncated_transaction() {
    // version, one input, then nothing
    let raw = hex::decode("0100000001").unwrap();
    assert!(matches!(
        Tx::parse(&raw, Network::Mainnet),
        Err(BitcoinError::UnexpectedEnd(_))
    ));
    assert!(Tx::parse(&[], Network::Mainnet).is_err());
}

#[test]
fn test_script_length_beyond_buffer() {
    // empty tx shell whose single input claims a 0xff-byte script
    let mut raw = hex::decode("0100000001").unwrap();
    raw.extend_from_slice(&[0u8; 36]);
    raw.push(0xfd);
    raw.extend_from_slice(&[0xff, 0x00]);
    raw.extend_from_slice(&[0u8; 10]);
    assert!(Tx::parse(&raw, Network::Mainnet).is_err());
}

#[test]
fn test_varint_truncated() {
    let mut reader = Reader::new(&[0xfe, 0x01, 0x02]);
    assert!(reader.read_varint().is_err());
}

#[test]
fn test_der_errors() {
    let good = Signature::new(BigUint::from(5u32), BigUint::from(7u32)).der();
    assert!(Signature::parse_der(&good).is_ok());

    let mut bad_tag = good.clone();
    bad_tag[0] = 0x31;
    assert!(matches!(
        Signature::parse_der(&bad_tag),
        Err(BitcoinError::InvalidSignature(_))
    ));

    let mut bad_length = good.clone();
    bad_length[1] += 1;
    assert!(Signature::parse_der(&bad_length).is_err());

    let mut bad_marker = good.clone();
    bad_marker[2] = 0x03;
    assert!(Signature::parse_der(&bad_marker).is_err());

    assert!(Signature::parse_der(&good[..good.len() - 1]).is_err());
    assert!(Signature::parse_der(&[]).is_err());
}

#[test]
fn test_sec_errors() {
    assert!(matches!(
        Point::parse_sec(&[0x05; 33]),
        Err(BitcoinError::InvalidPublicKey(_))
    ));
    assert!(Point::parse_sec(&[0x02; 32]).is_err());
    assert!(Point::parse_sec(&[]).is_err());

    // x = 5 has no square root of x^3 + 7 on secp256k1
    let mut no_root = vec![0x02];
    no_root.extend_from_slice(&[0u8; 31]);
    no_root.push(5);
    assert!(Point::parse_sec(&no_root).is_err());

    let mut off_curve = vec![0x04];
    off_curve.extend_from_slice(&[0u8; 63]);
    off_curve.push(1);
    assert!(Point::parse_sec(&off_curve).is_err());
}

#[test]
fn test_off_curve_point() {
    assert!(matches!(
        Point::secp256k1(BigUint::from(1u32), BigUint::from(1u32)),
        Err(BitcoinError::InvalidPoint(_))
    ));
}

#[test]
fn test_private_key_range() {
    assert!(PrivateKey::new(BigUint::from(0u32)).is_err());
    let n = BigUint::parse_bytes(
        b"fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
        16,
    )
    .unwrap();
    assert!(PrivateKey::new(n.clone()).is_err());
    assert!(PrivateKey::new(n - 1u32).is_ok());
}

#[test]
fn test_nonce_range() {
    let key = PrivateKey::new(BigUint::from(3u32)).unwrap();
    assert!(key.sign_with_nonce(&BigUint::from(1u32), &BigUint::from(0u32)).is_err());
}

#[test]
fn test_base58_errors() {
    let encoded = encode_base58_checksum(b"payload");
    assert_eq!(decode_base58_checksum(&encoded).unwrap(), b"payload".to_vec());

    let mut chars: Vec<char> = encoded.chars().collect();
    let last = chars.len() - 1;
    chars[last] = if chars[last] == '2' { '3' } else { '2' };
    let corrupted: String = chars.into_iter().collect();
    assert!(matches!(
        decode_base58_checksum(&corrupted),
        Err(BitcoinError::Base58(_))
    ));

    assert!(decode_base58_checksum("0OIl").is_err());
    assert!(decode_address(&encoded).is_err());
}

#[test]
fn test_wif_errors() {
    // valid checksum, unknown prefix
    let mut payload = vec![0x42];
    payload.extend_from_slice(&[1u8; 32]);
    assert!(matches!(
        PrivateKey::from_wif(&encode_base58_checksum(&payload)),
        Err(BitcoinError::InvalidPrivateKey(_))
    ));

    // bad compression flag
    let mut payload = vec![0x80];
    payload.extend_from_slice(&[1u8; 32]);
    payload.push(0x02);
    assert!(PrivateKey::from_wif(&encode_base58_checksum(&payload)).is_err());
}

#[test]
fn test_undecodable_script_is_error_not_invalid() {
    let prev = Tx {
        version: 1,
        inputs: vec![],
        outputs: vec![TxOut::new(10, Script::new(vec![0x4c, 0x05, 0x01]))],
        lock_time: 0,
        network: Network::Mainnet,
    };
    let spend = Tx {
        version: 1,
        inputs: vec![TxIn::new(prev.hash(), 0)],
        outputs: vec![],
        lock_time: 0,
        network: Network::Mainnet,
    };
    let mut provider = MemoryTxProvider::new();
    provider.insert(prev);
    assert!(matches!(
        spend.verify_input(0, &provider),
        Err(BitcoinError::ScriptParse(_))
    ));
    assert_eq!(
        Script::new(vec![0x4c, 0x05, 0x01]).to_string(),
        "<undecodable 4c0501>"
    );
}

#[test]
fn test_prev_output_index_out_of_range() {
    let prev = Tx {
        version: 1,
        inputs: vec![],
        outputs: vec![TxOut::new(10, Script::new(vec![0x51]))],
        lock_time: 0,
        network: Network::Mainnet,
    };
    let spend = Tx {
        version: 1,
        inputs: vec![TxIn::new(prev.hash(), 3)],
        outputs: vec![],
        lock_time: 0,
        network: Network::Mainnet,
    };
    let mut provider = MemoryTxProvider::new();
    provider.insert(prev);
    assert!(matches!(
        spend.fee(&provider),
        Err(BitcoinError::InputOutOfRange(_))
    ));
}

#[test]
fn test_provider_failure_aborts() {
    struct Offline;
    impl TxProvider for Offline {
        fn fetch(&self, _tx_id: &Hash, _network: Network) -> anyhow::Result<Tx> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }
    let spend = Tx {
        version: 1,
        inputs: vec![TxIn::new([7u8; 32], 0)],
        outputs: vec![],
        lock_time: 0,
        network: Network::Mainnet,
    };
    let err = spend.verify(&Offline).unwrap_err();
    assert!(matches!(err, BitcoinError::Provider(_)));
    assert_eq!(err.to_string(), "connection refused");
}

#[test]
fn test_block_header_errors() {
    assert!(BlockHeader::parse(&[0u8; 81]).is_err());
    assert!(BlockHeader::parse(&[]).is_err());
}

#[test]
fn test_empty_merkle_tree() {
    assert!(matches!(
        MerkleTree::new(0),
        Err(BitcoinError::MalformedMerkleProof(_))
    ));
}
