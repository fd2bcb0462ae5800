//! secp256k1 domain parameters
//!
//! Built once on first use and shared read-only for the life of the process.

use std::sync::OnceLock;

use num_bigint::BigUint;

use crate::constants::*;

/// Curve `y^2 = x^3 + ax + b` over `F_p` with base point `G` of order `n`
#[derive(Debug)]
pub struct CurveParams {
    pub p: BigUint,
    pub n: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub gx: BigUint,
    pub gy: BigUint,
    /// `n / 2`, the upper bound for low-S signatures
    pub half_n: BigUint,
}

static SECP256K1: OnceLock<CurveParams> = OnceLock::new();

pub fn secp256k1() -> &'static CurveParams {
    SECP256K1.get_or_init(|| {
        let n = BigUint::from_bytes_be(&SECP256K1_N);
        CurveParams {
            p: BigUint::from_bytes_be(&SECP256K1_P),
            half_n: &n >> 1,
            n,
            a: BigUint::from(SECP256K1_A),
            b: BigUint::from(SECP256K1_B),
            gx: BigUint::from_bytes_be(&SECP256K1_GX),
            gy: BigUint::from_bytes_be(&SECP256K1_GY),
        }
    })
}

/// Field prime `P`
pub fn prime() -> &'static BigUint {
    &secp256k1().p
}

/// Group order `N`
pub fn order() -> &'static BigUint {
    &secp256k1().n
}
