//! Base58 and Base58Check encoding.
//!
//! Leading zero *bytes* (not nibbles) map one-to-one to leading `'1'`
//! characters, matching the reference encoding rather than a naive
//! bit-count-based scheme.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::hash::hash256;

const ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Base58-encodes `data`.
pub fn encode(data: &[u8]) -> String {
    let leading_zeros = data.iter().take_while(|&&b| b == 0).count();
    let mut num = BigUint::from_bytes_be(data);
    let mut digits = Vec::new();
    let base = BigUint::from(58u8);
    while !num.is_zero() {
        let remainder = &num % &base;
        num /= &base;
        let idx: usize = remainder.to_bytes_be().first().copied().unwrap_or(0) as usize;
        digits.push(ALPHABET[idx]);
    }
    let mut out = vec![ALPHABET[0]; leading_zeros];
    out.extend(digits.into_iter().rev());
    String::from_utf8(out).expect("alphabet is ASCII")
}

/// Decodes a Base58 string.
pub fn decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    let leading_ones = s.bytes().take_while(|&b| b == ALPHABET[0]).count();
    let mut num = BigUint::zero();
    let base = BigUint::from(58u8);
    for ch in s.bytes() {
        let idx = ALPHABET
            .iter()
            .position(|&a| a == ch)
            .ok_or(Base58Error::InvalidCharacter)?;
        num = num * &base + BigUint::from(idx as u32);
    }
    let mut body = num.to_bytes_be();
    if body == [0] {
        body.clear();
    }
    let mut out = vec![0u8; leading_ones];
    out.extend(body);
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base58Error {
    InvalidCharacter,
    BadChecksum,
    TooShort,
}

impl std::fmt::Display for Base58Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Base58Error::InvalidCharacter => write!(f, "character outside the Base58 alphabet"),
            Base58Error::BadChecksum => write!(f, "Base58Check checksum mismatch"),
            Base58Error::TooShort => write!(f, "Base58Check payload shorter than checksum"),
        }
    }
}

impl std::error::Error for Base58Error {}

/// Encodes `payload` (prefix byte + body) with a trailing 4-byte
/// `HASH256` checksum, then Base58-encodes the result.
pub fn encode_check(payload: &[u8]) -> String {
    let checksum = &hash256(payload)[..4];
    let mut full = payload.to_vec();
    full.extend_from_slice(checksum);
    encode(&full)
}

/// Decodes a Base58Check string, verifying and stripping the checksum.
pub fn decode_check(s: &str) -> Result<Vec<u8>, Base58Error> {
    let raw = decode(s)?;
    if raw.len() < 4 {
        return Err(Base58Error::TooShort);
    }
    let (payload, checksum) = raw.split_at(raw.len() - 4);
    let expected = &hash256(payload)[..4];
    if expected != checksum {
        return Err(Base58Error::BadChecksum);
    }
    Ok(payload.to_vec())
}
