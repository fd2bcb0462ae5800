//! Modular arithmetic over a prime modulus
//!
//! All functions take their operands as unreduced `BigUint` values and
//! return a result in `[0, m)`. The modulus is passed explicitly so the same
//! helpers serve both the field prime `P` and the group order `N`.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

pub fn mod_add(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a + b) % m
}

/// `a - b mod m`, never negative
pub fn mod_sub(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    let a = a % m;
    let b = b % m;
    if a >= b {
        a - b
    } else {
        m - (b - a)
    }
}

pub fn mod_mul(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a * b) % m
}

pub fn mod_pow(base: &BigUint, exponent: &BigUint, m: &BigUint) -> BigUint {
    base.modpow(exponent, m)
}

/// Multiplicative inverse by Fermat's little theorem, `a^(m-2) mod m`.
/// `m` must be prime; the inverse of zero comes back as zero.
pub fn mod_inv(a: &BigUint, m: &BigUint) -> BigUint {
    let exponent = m - BigUint::from(2u32);
    a.modpow(&exponent, m)
}

/// `a / b mod m`
pub fn mod_div(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    mod_mul(a, &mod_inv(b, m), m)
}

/// Square root for primes with `m ≡ 3 (mod 4)`, computed as
/// `a^((m+1)/4)`. Returns `None` when `a` is not a quadratic residue.
pub fn mod_sqrt(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let exponent = (m + BigUint::one()) >> 2;
    let root = a.modpow(&exponent, m);
    if mod_mul(&root, &root, m) == a % m {
        Some(root)
    } else {
        None
    }
}

/// Reduces into `[0, m)`
pub fn normalize(a: &BigUint, m: &BigUint) -> BigUint {
    a % m
}

pub fn is_even(a: &BigUint) -> bool {
    a.is_even()
}

pub fn is_zero(a: &BigUint) -> bool {
    a.is_zero()
}

/// Big-endian fixed 32-byte encoding, left-padded with zeros
pub fn to_bytes32(a: &BigUint) -> [u8; 32] {
    let bytes = a.to_bytes_be();
    let mut out = [0u8; 32];
    let start = 32usize.saturating_sub(bytes.len());
    let skip = bytes.len().saturating_sub(32);
    out[start..].copy_from_slice(&bytes[skip..]);
    out
}

pub fn from_bytes_be(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}
