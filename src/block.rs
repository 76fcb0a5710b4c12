//! Block headers: parsing, hashing, proof-of-work, retargeting, and the
//! BIP9/91/141 version-bits flags.

use crate::bigint::{from_be_bytes, Int};
use crate::error::{ParseError, ParseErrorKind};
use crate::hash::hash256;
use crate::varint::{read_bytes, read_u32_le};

/// The genesis difficulty target's `bits` encoding, used as the numerator
/// in [`BlockHeader::difficulty`].
pub const LOWEST_BITS: u32 = 0x1d00_ffff;

/// Two weeks, in seconds: the target interval for 2016 blocks.
const TWO_WEEKS_SECS: i64 = 14 * 24 * 60 * 60;

/// An 80-byte Bitcoin block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    /// Previous block's id, in internal (non-reversed) byte order.
    pub prev_block: [u8; 32],
    /// This block's Merkle root, in internal (non-reversed) byte order.
    pub merkle_root: [u8; 32],
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn parse(bytes: &[u8]) -> Result<BlockHeader, ParseError> {
        let mut pos = 0usize;
        let version = read_u32_le(bytes, &mut pos)?;
        let prev_block = read_32(bytes, &mut pos)?;
        let merkle_root = read_32(bytes, &mut pos)?;
        let timestamp = read_u32_le(bytes, &mut pos)?;
        let bits = read_u32_le(bytes, &mut pos)?;
        let nonce = read_u32_le(bytes, &mut pos)?;
        if pos != bytes.len() {
            return Err(ParseError::new(pos, ParseErrorKind::TrailingBytes));
        }
        Ok(BlockHeader {
            version,
            prev_block,
            merkle_root,
            timestamp,
            bits,
            nonce,
        })
    }

    pub fn serialize(&self) -> [u8; 80] {
        let mut out = [0u8; 80];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.prev_block);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    /// The block id: `reverse(hash256(serialize()))`, in the big-endian
    /// order conventionally displayed as hex.
    pub fn id(&self) -> [u8; 32] {
        let mut h = hash256(&self.serialize());
        h.reverse();
        h
    }

    /// `true` iff the block's id, read as a big-endian integer, is at or
    /// below the target implied by `bits`.
    pub fn check_pow(&self) -> bool {
        let h = hash256(&self.serialize());
        let proof = from_be_bytes(&h);
        proof <= bits_to_target(self.bits)
    }

    /// `true` iff the top 3 bits of `version` are `0b001`, signaling
    /// BIP9 versionbits soft-fork signaling.
    pub fn is_bip9(&self) -> bool {
        self.version >> 29 == 0b001
    }

    /// `true` iff bit 4 of `version` is set, signaling BIP91
    /// (segwit activation via miner signaling).
    pub fn is_bip91(&self) -> bool {
        self.version & (1 << 4) != 0
    }

    /// `true` iff bit 1 of `version` is set, signaling BIP141 (segwit).
    pub fn is_bip141(&self) -> bool {
        self.version & (1 << 1) != 0
    }

    /// This header's proof-of-work target, decoded from `bits`.
    pub fn target(&self) -> Int {
        bits_to_target(self.bits)
    }

    /// Difficulty relative to the genesis target, as a rational
    /// `target(0x1d00ffff) / target(self.bits)`.
    pub fn difficulty(&self) -> (Int, Int) {
        (bits_to_target(LOWEST_BITS), self.target())
    }
}

/// Decodes a packed `bits` field into its full-width target.
///
/// `bits` is `[coefficient (3 bytes, little-endian) ∥ exponent (1 byte)]`
/// packed into a little-endian `u32` on the wire: `target = coefficient *
/// 256^(exponent - 3)`.
pub fn bits_to_target(bits: u32) -> Int {
    let exponent = (bits >> 24) as u32;
    let coefficient = Int::from(bits & 0x00ff_ffff);
    if exponent <= 3 {
        coefficient >> (8 * (3 - exponent))
    } else {
        coefficient << (8 * (exponent - 3))
    }
}

/// Encodes a target back into its packed `bits` form.
///
/// Takes the target's big-endian bytes, using the first three non-zero
/// leading bytes as the coefficient; if the coefficient's high bit would
/// be set (making it look negative), a zero byte is prepended and the
/// exponent incremented to compensate.
pub fn target_to_bits(target: &Int) -> u32 {
    let mut bytes = target.to_bytes_be();
    while bytes.first() == Some(&0) && bytes.len() > 1 {
        bytes.remove(0);
    }
    let mut exponent = bytes.len() as u32;
    let mut coefficient = if bytes.len() >= 3 {
        bytes[0..3].to_vec()
    } else {
        let mut padded = vec![0u8; 3 - bytes.len()];
        padded.extend_from_slice(&bytes);
        padded
    };
    if coefficient[0] & 0x80 != 0 {
        coefficient.insert(0, 0);
        coefficient.truncate(3);
        exponent += 1;
    }
    let mut bits_bytes = [0u8; 4];
    bits_bytes[0] = coefficient[2];
    bits_bytes[1] = coefficient[1];
    bits_bytes[2] = coefficient[0];
    bits_bytes[3] = exponent as u8;
    u32::from_le_bytes(bits_bytes)
}

/// Computes the next epoch's `bits` given the first and last headers of
/// a completed 2016-block retarget epoch.
///
/// `Δ = clamp(last.timestamp - first.timestamp, 3.5 days, 8 weeks)`;
/// `new_target = old_target * Δ / (2 weeks)`.
pub fn calculate_new_bits(first: &BlockHeader, last: &BlockHeader) -> u32 {
    let actual = last.timestamp as i64 - first.timestamp as i64;
    let clamped = actual.clamp(TWO_WEEKS_SECS / 4, TWO_WEEKS_SECS * 4);
    let old_target = bits_to_target(last.bits);
    let new_target = (old_target * Int::from(clamped as u64)) / Int::from(TWO_WEEKS_SECS as u64);
    target_to_bits(&new_target)
}

fn read_32(bytes: &[u8], pos: &mut usize) -> Result<[u8; 32], ParseError> {
    let slice = read_bytes(bytes, pos, 32)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(slice);
    Ok(out)
}
