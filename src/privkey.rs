//! Private keys: deterministic (RFC 6979) ECDSA signing, WIF and address
//! derivation.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::base58;
use crate::bigint::Int;
use crate::hash;
use crate::point::Point;
use crate::secp256k1;
use crate::signature::Signature;

type HmacSha256 = Hmac<Sha256>;

/// A secp256k1 private key: scalar `e` and its public point `e * G`.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    e: Int,
    point: Point,
}

impl PrivateKey {
    pub fn new(e: Int) -> Self {
        let point = secp256k1::generator_mul(&e);
        PrivateKey { e, point }
    }

    pub fn secret(&self) -> &Int {
        &self.e
    }

    pub fn public_point(&self) -> &Point {
        &self.point
    }

    /// Signs a 256-bit message hash `z` with an RFC 6979 deterministic
    /// nonce, returning a low-S-canonicalized signature.
    pub fn sign(&self, z: &Int) -> Signature {
        let n = secp256k1::n();
        let k = deterministic_k(&self.e, z, &n);
        let r_point = secp256k1::generator_mul(&k);
        let r = r_point.x().expect("non-infinity point").value() % &n;
        let k_inv = crate::bigint::mod_pow(&k, &(n.clone() - Int::from(2u8)), &n);
        let s = ((z + &r * &self.e) * &k_inv) % &n;
        Signature::new(r, s).to_low_s()
    }

    /// Encodes this key in Wallet Import Format.
    pub fn wif(&self, compressed: bool, testnet: bool) -> String {
        let prefix: u8 = if testnet { 0xef } else { 0x80 };
        let mut payload = vec![prefix];
        payload.extend_from_slice(&crate::bigint::to_be_bytes_padded(&self.e, 32));
        if compressed {
            payload.push(0x01);
        }
        base58::encode_check(&payload)
    }

    /// Derives the Base58Check P2PKH address for this key's public point.
    pub fn address(&self, compressed: bool, testnet: bool) -> String {
        let sec = secp256k1::sec_encode(&self.point, compressed);
        let h160 = hash::hash160(&sec);
        let prefix: u8 = if testnet { 0x6f } else { 0x00 };
        let mut payload = vec![prefix];
        payload.extend_from_slice(&h160);
        base58::encode_check(&payload)
    }
}

/// RFC 6979 deterministic nonce generation, specialized to secp256k1's
/// 256-bit order and SHA-256.
fn deterministic_k(secret: &Int, z: &Int, n: &Int) -> Int {
    let z = if z >= n { z - n } else { z.clone() };
    let secret_bytes = crate::bigint::to_be_bytes_padded(secret, 32);
    let z_bytes = crate::bigint::to_be_bytes_padded(&z, 32);

    let mut k = [0u8; 32];
    let mut v = [1u8; 32];

    let mut mac = HmacSha256::new_from_slice(&k).expect("hmac accepts any key length");
    mac.update(&v);
    mac.update(&[0x00]);
    mac.update(&secret_bytes);
    mac.update(&z_bytes);
    k.copy_from_slice(&mac.finalize().into_bytes());

    let mut mac = HmacSha256::new_from_slice(&k).expect("hmac accepts any key length");
    mac.update(&v);
    v.copy_from_slice(&mac.finalize().into_bytes());

    let mut mac = HmacSha256::new_from_slice(&k).expect("hmac accepts any key length");
    mac.update(&v);
    mac.update(&[0x01]);
    mac.update(&secret_bytes);
    mac.update(&z_bytes);
    k.copy_from_slice(&mac.finalize().into_bytes());

    let mut mac = HmacSha256::new_from_slice(&k).expect("hmac accepts any key length");
    mac.update(&v);
    v.copy_from_slice(&mac.finalize().into_bytes());

    loop {
        let mut mac = HmacSha256::new_from_slice(&k).expect("hmac accepts any key length");
        mac.update(&v);
        v.copy_from_slice(&mac.finalize().into_bytes());
        let candidate = crate::bigint::from_be_bytes(&v);
        if candidate > Int::from(0u8) && &candidate < n {
            return candidate;
        }
        let mut mac = HmacSha256::new_from_slice(&k).expect("hmac accepts any key length");
        mac.update(&v);
        mac.update(&[0x00]);
        k.copy_from_slice(&mac.finalize().into_bytes());
        let mut mac = HmacSha256::new_from_slice(&k).expect("hmac accepts any key length");
        mac.update(&v);
        v.copy_from_slice(&mac.finalize().into_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_produces_verifiable_signature() {
        let key = PrivateKey::new(Int::from(12345u32));
        let z = Int::from(999999u64);
        let sig = key.sign(&z);
        assert!(sig.verify(key.public_point(), &z));
    }

    #[test]
    fn deterministic_k_is_stable_across_calls() {
        let key = PrivateKey::new(Int::from(42u32));
        let z = Int::from(777u32);
        let first = key.sign(&z);
        let second = key.sign(&z);
        assert_eq!(first, second);
    }

    #[test]
    fn wif_round_trips_through_base58check() {
        let key = PrivateKey::new(Int::from(5003u32));
        let wif = key.wif(true, true);
        let decoded = base58::decode_check(&wif).unwrap();
        assert_eq!(decoded[0], 0xef);
        assert_eq!(decoded.last(), Some(&0x01));
    }

    #[test]
    fn address_has_expected_mainnet_prefix() {
        let key = PrivateKey::new(Int::from(5002u32));
        let addr = key.address(false, false);
        let decoded = base58::decode_check(&addr).unwrap();
        assert_eq!(decoded[0], 0x00);
        assert_eq!(decoded.len(), 21);
    }
}
