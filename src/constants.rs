//! Wire-format, curve and script constants

/// secp256k1 field prime: 2^256 - 2^32 - 977
pub const SECP256K1_P: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

/// secp256k1 group order
pub const SECP256K1_N: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b,
    0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Generator x coordinate
pub const SECP256K1_GX: [u8; 32] = [
    0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac,
    0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b, 0x07,
    0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9,
    0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
];

/// Generator y coordinate
pub const SECP256K1_GY: [u8; 32] = [
    0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65,
    0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08, 0xa8,
    0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19,
    0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10, 0xd4, 0xb8,
];

/// Curve coefficient a in y^2 = x^3 + ax + b
pub const SECP256K1_A: u32 = 0;

/// Curve coefficient b in y^2 = x^3 + ax + b
pub const SECP256K1_B: u32 = 7;

/// Signature hash type committing to all inputs and outputs
pub const SIGHASH_ALL: u32 = 1;

/// Maximum size of a single pushed stack element
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Maximum byte length of a numeric operand
pub const MAX_NUM_SIZE: usize = 4;

/// Maximum combined size of main and alt stacks during script execution
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum number of public keys in OP_CHECKMULTISIG
pub const MAX_PUBKEYS_PER_MULTISIG: i64 = 20;

/// Mainnet pay-to-pubkey-hash address prefix
pub const MAINNET_P2PKH_PREFIX: u8 = 0x00;

/// Testnet pay-to-pubkey-hash address prefix
pub const TESTNET_P2PKH_PREFIX: u8 = 0x6f;

/// Mainnet pay-to-script-hash address prefix
pub const MAINNET_P2SH_PREFIX: u8 = 0x05;

/// Testnet pay-to-script-hash address prefix
pub const TESTNET_P2SH_PREFIX: u8 = 0xc4;

/// Mainnet WIF private key prefix
pub const MAINNET_WIF_PREFIX: u8 = 0x80;

/// Testnet WIF private key prefix
pub const TESTNET_WIF_PREFIX: u8 = 0xef;

/// Serialized block header length
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Maximum block weight (BIP141)
pub const MAX_BLOCK_WEIGHT: u32 = 4_000_000;

/// Weight of the smallest possible transaction (60 bytes)
pub const MIN_TRANSACTION_WEIGHT: u32 = 4 * 60;

/// Upper bound on the transaction count a merkle block may claim
pub const MAX_MERKLE_BLOCK_TRANSACTIONS: u32 = MAX_BLOCK_WEIGHT / MIN_TRANSACTION_WEIGHT;

// Opcode bytes referenced outside the opcode table
pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_VERIF: u8 = 0x65;
pub const OP_VERNOTIF: u8 = 0x66;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKMULTISIG: u8 = 0xae;
