//! ECDSA signatures: DER encoding and verification against a public key.

use crate::bigint::Int;
use crate::error::CryptoError;
use crate::point::Point;
use crate::secp256k1;

/// An ECDSA signature `(r, s)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub r: Int,
    pub s: Int,
}

impl Signature {
    pub fn new(r: Int, s: Int) -> Self {
        Signature { r, s }
    }

    /// Verifies this signature over message hash `z` against `point`.
    pub fn verify(&self, point: &Point, z: &Int) -> bool {
        secp256k1::verify(point, z, &self.r, &self.s)
    }

    /// Canonicalizes `s` to the "low-S" form required by BIP62/policy:
    /// if `s > n/2`, replace it with `n - s`.
    pub fn to_low_s(&self) -> Signature {
        let n = secp256k1::n();
        let half = &n / Int::from(2u8);
        if self.s > half {
            Signature::new(self.r.clone(), n - &self.s)
        } else {
            self.clone()
        }
    }

    /// Encodes this signature in strict DER: `30 len 02 len(r) r 02 len(s) s`.
    pub fn to_der(&self) -> Vec<u8> {
        let mut out = vec![0x30];
        let r_bytes = der_encode_int(&self.r);
        let s_bytes = der_encode_int(&self.s);
        let body_len = 2 + r_bytes.len() + 2 + s_bytes.len();
        out.push(body_len as u8);
        out.push(0x02);
        out.push(r_bytes.len() as u8);
        out.extend_from_slice(&r_bytes);
        out.push(0x02);
        out.push(s_bytes.len() as u8);
        out.extend_from_slice(&s_bytes);
        out
    }

    /// Parses a strict-DER-encoded signature.
    pub fn from_der(data: &[u8]) -> Result<Signature, CryptoError> {
        let mut pos = 0usize;
        let byte = |pos: &mut usize| -> Result<u8, CryptoError> {
            let b = *data.get(*pos).ok_or(CryptoError::InvalidDer)?;
            *pos += 1;
            Ok(b)
        };
        if byte(&mut pos)? != 0x30 {
            return Err(CryptoError::InvalidDer);
        }
        let total_len = byte(&mut pos)? as usize;
        if data.len() != pos + total_len {
            return Err(CryptoError::InvalidDer);
        }
        if byte(&mut pos)? != 0x02 {
            return Err(CryptoError::InvalidDer);
        }
        let r_len = byte(&mut pos)? as usize;
        let r_bytes = data.get(pos..pos + r_len).ok_or(CryptoError::InvalidDer)?;
        pos += r_len;
        let r = crate::bigint::from_be_bytes(r_bytes);
        if byte(&mut pos)? != 0x02 {
            return Err(CryptoError::InvalidDer);
        }
        let s_len = byte(&mut pos)? as usize;
        let s_bytes = data.get(pos..pos + s_len).ok_or(CryptoError::InvalidDer)?;
        pos += s_len;
        let s = crate::bigint::from_be_bytes(s_bytes);
        if pos != data.len() {
            return Err(CryptoError::InvalidDer);
        }
        Ok(Signature::new(r, s))
    }
}

/// Encodes an integer the DER way: big-endian, minimal length, with a
/// leading `0x00` inserted if the high bit would otherwise be read as a
/// negative sign.
fn der_encode_int(value: &Int) -> Vec<u8> {
    let mut bytes = value.to_bytes_be();
    if bytes.is_empty() {
        bytes.push(0);
    }
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0x00);
    }
    bytes
}
