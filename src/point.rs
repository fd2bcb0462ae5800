//! Elliptic curve points over the secp256k1 field
//!
//! Implements the group law, scalar multiplication, ECDSA verification and
//! the SEC public key encodings.

use std::fmt;
use std::ops::Add;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::base58::h160_to_p2pkh_address;
use crate::curve::{order, prime, secp256k1};
use crate::error::{BitcoinError, Result};
use crate::field::*;
use crate::hash::hash160;
use crate::signature::Signature;
use crate::types::*;

/// A point on `y^2 = x^3 + ax + b (mod P)`.
///
/// `x` and `y` are both `None` for the point at infinity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    x: Option<BigUint>,
    y: Option<BigUint>,
    a: BigUint,
    b: BigUint,
}

impl Point {
    /// Creates a point, rejecting coordinates that are not on the curve.
    pub fn new(x: BigUint, y: BigUint, a: BigUint, b: BigUint) -> Result<Self> {
        let p = prime();
        if &x >= p || &y >= p {
            return Err(BitcoinError::InvalidPoint(
                "coordinate not reduced modulo the field prime".to_string(),
            ));
        }
        let lhs = mod_mul(&y, &y, p);
        let rhs = mod_add(
            &mod_add(&mod_pow(&x, &BigUint::from(3u32), p), &mod_mul(&a, &x, p), p),
            &b,
            p,
        );
        if lhs != rhs {
            return Err(BitcoinError::InvalidPoint(format!(
                "({:x}, {:x}) is not on the curve",
                x, y
            )));
        }
        Ok(Point { x: Some(x), y: Some(y), a, b })
    }

    /// Point on secp256k1
    pub fn secp256k1(x: BigUint, y: BigUint) -> Result<Self> {
        let curve = secp256k1();
        Self::new(x, y, curve.a.clone(), curve.b.clone())
    }

    /// Point at infinity on the curve with coefficients `a`, `b`
    pub fn infinity_on(a: BigUint, b: BigUint) -> Self {
        Point { x: None, y: None, a, b }
    }

    /// Point at infinity on secp256k1
    pub fn infinity() -> Self {
        let curve = secp256k1();
        Self::infinity_on(curve.a.clone(), curve.b.clone())
    }

    /// The base point `G`
    pub fn generator() -> Self {
        let curve = secp256k1();
        Point {
            x: Some(curve.gx.clone()),
            y: Some(curve.gy.clone()),
            a: curve.a.clone(),
            b: curve.b.clone(),
        }
    }

    pub fn x(&self) -> Option<&BigUint> {
        self.x.as_ref()
    }

    pub fn y(&self) -> Option<&BigUint> {
        self.y.as_ref()
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_none()
    }

    fn coordinates(&self) -> Option<(&BigUint, &BigUint)> {
        match (&self.x, &self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    fn with_coordinates(&self, x: BigUint, y: BigUint) -> Self {
        Point {
            x: Some(x),
            y: Some(y),
            a: self.a.clone(),
            b: self.b.clone(),
        }
    }

    fn at_infinity(&self) -> Self {
        Self::infinity_on(self.a.clone(), self.b.clone())
    }

    /// Group law. Edge cases are checked in order: identity, inverse
    /// points, distinct x (chord), vertical tangent, tangent doubling.
    pub fn add_point(&self, other: &Point) -> Point {
        let p = prime();
        let (x1, y1) = match self.coordinates() {
            Some(c) => c,
            None => return other.clone(),
        };
        let (x2, y2) = match other.coordinates() {
            Some(c) => c,
            None => return self.clone(),
        };

        if x1 == x2 && y1 != y2 {
            return self.at_infinity();
        }

        let slope = if x1 != x2 {
            mod_div(&mod_sub(y2, y1, p), &mod_sub(x2, x1, p), p)
        } else {
            if y1.is_zero() {
                return self.at_infinity();
            }
            // (3x^2 + a) / 2y
            let numerator = mod_add(
                &mod_mul(&BigUint::from(3u32), &mod_mul(x1, x1, p), p),
                &self.a,
                p,
            );
            mod_div(&numerator, &mod_mul(&BigUint::from(2u32), y1, p), p)
        };

        let x3 = mod_sub(&mod_sub(&mod_mul(&slope, &slope, p), x1, p), x2, p);
        let y3 = mod_sub(&mod_mul(&slope, &mod_sub(x1, &x3, p), p), y1, p);
        self.with_coordinates(x3, y3)
    }

    /// Double-and-add over `k mod N`, scanning from the least significant bit
    pub fn scalar_multiply(&self, k: &BigUint) -> Point {
        let mut coefficient = k % order();
        let mut current = self.clone();
        let mut result = self.at_infinity();
        while !coefficient.is_zero() {
            if coefficient.bit(0) {
                result = result.add_point(&current);
            }
            current = current.add_point(&current);
            coefficient >>= 1;
        }
        result
    }

    /// ECDSA verification of signature `sig` over message hash `z`
    pub fn verify(&self, z: &BigUint, sig: &Signature) -> bool {
        let n = order();
        if self.is_infinity() {
            return false;
        }
        if sig.r.is_zero() || sig.s.is_zero() || &sig.r >= n || &sig.s >= n {
            return false;
        }
        let s_inv = mod_inv(&sig.s, n);
        let u = mod_mul(z, &s_inv, n);
        let v = mod_mul(&sig.r, &s_inv, n);
        let total = Point::generator()
            .scalar_multiply(&u)
            .add_point(&self.scalar_multiply(&v));
        match total.x() {
            Some(x) => normalize(x, n) == sig.r,
            None => false,
        }
    }

    /// SEC encoding: `04 ‖ x ‖ y` uncompressed, `02/03 ‖ x` compressed
    pub fn sec(&self, compressed: bool) -> Result<ByteString> {
        let (x, y) = self.coordinates().ok_or_else(|| {
            BitcoinError::InvalidPoint("point at infinity has no SEC encoding".to_string())
        })?;
        let mut out = Vec::with_capacity(65);
        if compressed {
            out.push(if is_even(y) { 0x02 } else { 0x03 });
            out.extend_from_slice(&to_bytes32(x));
        } else {
            out.push(0x04);
            out.extend_from_slice(&to_bytes32(x));
            out.extend_from_slice(&to_bytes32(y));
        }
        Ok(out)
    }

    /// Parses a SEC public key, recovering `y` for the compressed form
    pub fn parse_sec(sec: &[u8]) -> Result<Point> {
        match (sec.first(), sec.len()) {
            (Some(0x04), 65) => Point::secp256k1(
                from_bytes_be(&sec[1..33]),
                from_bytes_be(&sec[33..65]),
            )
            .map_err(|e| BitcoinError::InvalidPublicKey(e.to_string())),
            (Some(prefix @ (0x02 | 0x03)), 33) => {
                let p = prime();
                let x = from_bytes_be(&sec[1..]);
                if &x >= p {
                    return Err(BitcoinError::InvalidPublicKey(
                        "x coordinate exceeds field prime".to_string(),
                    ));
                }
                let alpha = mod_add(&mod_pow(&x, &BigUint::from(3u32), p), &secp256k1().b, p);
                let beta = mod_sqrt(&alpha, p).ok_or_else(|| {
                    BitcoinError::InvalidPublicKey(format!("no curve point with x = {:x}", x))
                })?;
                let want_even = *prefix == 0x02;
                let y = if is_even(&beta) == want_even {
                    beta
                } else {
                    mod_sub(p, &beta, p)
                };
                Point::secp256k1(x, y).map_err(|e| BitcoinError::InvalidPublicKey(e.to_string()))
            }
            (Some(prefix), len) => Err(BitcoinError::InvalidPublicKey(format!(
                "unexpected prefix 0x{:02x} with length {}",
                prefix, len
            ))),
            (None, _) => Err(BitcoinError::InvalidPublicKey("empty key".to_string())),
        }
    }

    /// hash160 of the SEC encoding
    pub fn hash160(&self, compressed: bool) -> Result<Hash160> {
        Ok(hash160(&self.sec(compressed)?))
    }

    /// Pay-to-pubkey-hash address
    pub fn address(&self, compressed: bool, network: Network) -> Result<String> {
        Ok(h160_to_p2pkh_address(&self.hash160(compressed)?, network))
    }
}

impl Add<&Point> for &Point {
    type Output = Point;

    fn add(self, other: &Point) -> Point {
        self.add_point(other)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        self.add_point(&other)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coordinates() {
            Some((x, y)) => write!(f, "Point({:064x}, {:064x})", x, y),
            None => write!(f, "Point(infinity)"),
        }
    }
}

/// `true` iff `k` is a valid secret scalar, `1 <= k < N`
pub fn is_valid_scalar(k: &BigUint) -> bool {
    k >= &BigUint::one() && k < order()
}
