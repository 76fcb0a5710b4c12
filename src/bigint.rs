//! Unbounded non-negative integer arithmetic.
//!
//! The field/curve layer and the Script numeric opcodes both need integers
//! wider than any fixed machine width can hold efficiently (curve
//! coordinates and scalars are 256 bits; modular exponentiation needs
//! headroom beyond that during intermediate squarings). Rather than
//! hand-roll a fixed 4×u64 integer, this module is a thin layer over
//! [`num_bigint::BigUint`], the standard big-integer crate.
//!
//! `Int` is always non-negative: every quantity this crate uses it for
//! (field elements, curve scalars, varints, Script numeric magnitudes) is
//! reduced into a known-non-negative range before it reaches here. Sign is
//! handled by the caller (the Script number codec, in particular, carries
//! its own sign bit separately from the magnitude).

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// An unbounded non-negative integer.
pub type Int = BigUint;

/// Builds an [`Int`] from a big-endian byte slice.
pub fn from_be_bytes(bytes: &[u8]) -> Int {
    BigUint::from_bytes_be(bytes)
}

/// Serializes an [`Int`] to big-endian bytes, left-padded with zeros to
/// exactly `width` bytes.
///
/// # Panics
///
/// Panics if the value does not fit in `width` bytes.
pub fn to_be_bytes_padded(value: &Int, width: usize) -> Vec<u8> {
    let raw = value.to_bytes_be();
    assert!(raw.len() <= width, "value does not fit in {width} bytes");
    let mut out = vec![0u8; width - raw.len()];
    out.extend_from_slice(&raw);
    out
}

/// Computes `base^exp mod modulus`.
pub fn mod_pow(base: &Int, exp: &Int, modulus: &Int) -> Int {
    base.modpow(exp, modulus)
}

/// Computes the Fermat inverse of `value` modulo the prime `modulus`:
/// `value^(modulus - 2) mod modulus`.
///
/// Only valid when `modulus` is prime and `value` is not a multiple of it.
pub fn mod_inverse_prime(value: &Int, modulus: &Int) -> Int {
    let two = Int::from(2u8);
    mod_pow(value, &(modulus - two), modulus)
}

pub fn zero() -> Int {
    Int::zero()
}

pub fn one() -> Int {
    Int::one()
}
