//! The secp256k1 curve: constants, SEC point encoding, and ECDSA
//! verification.
//!
//! Everything here is built from [`crate::field`] and [`crate::point`]
//! rather than delegated to a dedicated crypto crate — this crate's whole
//! point is to walk the field/curve/signature math by hand, the way the
//! reference material it's ported from does, not to wrap `libsecp256k1`.

use std::sync::OnceLock;

use crate::bigint::Int;
use crate::error::CryptoError;
use crate::field::FieldElement;
use crate::point::Point;

/// secp256k1 field prime: `2^256 - 2^32 - 977`.
pub fn p() -> Int {
    (Int::from(2u8).pow(256)) - Int::from(2u8).pow(32) - Int::from(977u32)
}

/// secp256k1 group order.
pub fn n() -> Int {
    hex_to_int("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141")
}

fn hex_to_int(s: &str) -> Int {
    Int::parse_bytes(s.as_bytes(), 16).expect("valid hex constant")
}

fn gx() -> Int {
    hex_to_int("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
}

fn gy() -> Int {
    hex_to_int("483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b")
}

/// Builds a field element in the secp256k1 base field `F_p`.
pub fn s256_field(value: Int) -> FieldElement {
    FieldElement::new(p(), value)
}

fn a_coeff() -> FieldElement {
    s256_field(Int::from(0u8))
}

fn b_coeff() -> FieldElement {
    s256_field(Int::from(7u8))
}

/// Builds a point on secp256k1 from affine coordinates, checking it lies
/// on the curve.
pub fn s256_point(x: Int, y: Int) -> Result<Point, CryptoError> {
    Point::affine(a_coeff(), b_coeff(), s256_field(x), s256_field(y))
        .map_err(|_| CryptoError::PointNotOnCurve)
}

/// The secp256k1 base point `G`.
pub fn generator() -> &'static Point {
    static G: OnceLock<Point> = OnceLock::new();
    G.get_or_init(|| s256_point(gx(), gy()).expect("G is on the curve"))
}

/// Computes `G * scalar`.
pub fn generator_mul(scalar: &Int) -> Point {
    generator().scalar_mul(scalar)
}

/// Square root in `F_p`, valid because `p mod 4 == 3`: `w = v^((p+1)/4)`.
fn sqrt_mod_p(v: &FieldElement) -> FieldElement {
    let exponent = (p() + Int::from(1u8)) / Int::from(4u8);
    v.pow(&exponent)
}

/// Parses a SEC-encoded public key, compressed (33 bytes, `0x02`/`0x03`
/// prefix) or uncompressed (65 bytes, `0x04` prefix).
pub fn parse_sec(data: &[u8]) -> Result<Point, CryptoError> {
    if data.is_empty() {
        return Err(CryptoError::InvalidSec);
    }
    match data[0] {
        0x04 => {
            if data.len() != 65 {
                return Err(CryptoError::InvalidSec);
            }
            let x = crate::bigint::from_be_bytes(&data[1..33]);
            let y = crate::bigint::from_be_bytes(&data[33..65]);
            s256_point(x, y)
        }
        0x02 | 0x03 => {
            if data.len() != 33 {
                return Err(CryptoError::InvalidSec);
            }
            let is_even = data[0] == 0x02;
            let x = crate::bigint::from_be_bytes(&data[1..33]);
            let x_field = s256_field(x.clone());
            let alpha = x_field
                .pow(&Int::from(3u8))
                .add(&b_coeff())
                .map_err(|_| CryptoError::InvalidSec)?;
            let beta = sqrt_mod_p(&alpha);
            let beta_is_even = beta.value() % Int::from(2u8) == Int::from(0u8);
            let (even_beta, odd_beta) = if beta_is_even {
                let odd = s256_field(p() - beta.value());
                (beta, odd)
            } else {
                let even = s256_field(p() - beta.value());
                (even, beta)
            };
            let y = if is_even { even_beta } else { odd_beta };
            s256_point(x, y.value().clone())
        }
        _ => Err(CryptoError::InvalidSec),
    }
}

/// Encodes a public key point in SEC format.
pub fn sec_encode(point: &Point, compressed: bool) -> Vec<u8> {
    let x = point.x().expect("infinity has no SEC encoding");
    let y = point.y().expect("infinity has no SEC encoding");
    let x_bytes = crate::bigint::to_be_bytes_padded(x.value(), 32);
    if compressed {
        let prefix = if y.value() % Int::from(2u8) == Int::from(0u8) {
            0x02
        } else {
            0x03
        };
        let mut out = Vec::with_capacity(33);
        out.push(prefix);
        out.extend_from_slice(&x_bytes);
        out
    } else {
        let y_bytes = crate::bigint::to_be_bytes_padded(y.value(), 32);
        let mut out = Vec::with_capacity(65);
        out.push(0x04);
        out.extend_from_slice(&x_bytes);
        out.extend_from_slice(&y_bytes);
        out
    }
}

/// Verifies an ECDSA signature `(r, s)` over message hash `z` against
/// public key `point`.
pub fn verify(point: &Point, z: &Int, r: &Int, s: &Int) -> bool {
    let n_val = n();
    if r == &Int::from(0u8) || r >= &n_val || s == &Int::from(0u8) || s >= &n_val {
        return false;
    }
    let s_inv = crate::bigint::mod_pow(s, &(n_val.clone() - Int::from(2u8)), &n_val);
    let u = (z * &s_inv) % &n_val;
    let v = (r * &s_inv) % &n_val;
    let total = generator_mul(&u).add(&point.scalar_mul(&v));
    match total {
        Ok(p) => match p.x() {
            Some(x) => x.value() % &n_val == *r,
            None => false,
        },
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(!generator().is_infinity());
    }

    #[test]
    fn sec_round_trip_compressed() {
        let point = generator_mul(&Int::from(5u32));
        let encoded = sec_encode(&point, true);
        let decoded = parse_sec(&encoded).unwrap();
        assert_eq!(point, decoded);
    }

    #[test]
    fn sec_round_trip_uncompressed() {
        let point = generator_mul(&Int::from(999u32));
        let encoded = sec_encode(&point, false);
        let decoded = parse_sec(&encoded).unwrap();
        assert_eq!(point, decoded);
    }

    #[test]
    fn verify_rejects_out_of_range_signature() {
        let point = generator_mul(&Int::from(12345u32));
        assert!(!verify(&point, &Int::from(1u8), &Int::from(0u8), &Int::from(1u8)));
    }

    #[test]
    fn verify_matches_sign_round_trip() {
        let priv_scalar = Int::from(4242u32);
        let point = generator_mul(&priv_scalar);
        let z = Int::from(123456789u64);
        let k = Int::from(99999u32);
        let r_point = generator_mul(&k);
        let r = r_point.x().unwrap().value() % n();
        let k_inv = crate::bigint::mod_pow(&k, &(n() - Int::from(2u8)), &n());
        let s = ((&z + &r * &priv_scalar) * &k_inv) % n();
        assert!(verify(&point, &z, &r, &s));
        assert!(!verify(&point, &(z + Int::from(1u8)), &r, &s));
    }
}
