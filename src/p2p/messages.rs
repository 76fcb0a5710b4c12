//! The SPV message payloads: `version`, `verack`, `ping`/`pong`,
//! `getheaders`, `headers`, `merkleblock`, `getdata`, `filterload`.

use crate::block::BlockHeader;
use crate::error::{ParseError, ParseErrorKind};
use crate::varint::{encode_varint, read_bytes, read_u32_le, read_u64_le, read_varint};

/// A message payload with a fixed 12-byte command token.
pub trait Message: Sized {
    const COMMAND: &'static [u8];
    fn serialize(&self) -> Vec<u8>;
    fn parse(payload: &[u8]) -> Result<Self, ParseError>;
}

fn reversed32(mut bytes: [u8; 32]) -> [u8; 32] {
    bytes.reverse();
    bytes
}

fn ipv4_mapped(ip: [u8; 4]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[10] = 0xff;
    out[11] = 0xff;
    out[12..16].copy_from_slice(&ip);
    out
}

/// The `version` handshake message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMessage {
    pub version: u32,
    pub services: u64,
    pub timestamp: u64,
    pub receiver_services: u64,
    pub receiver_addr: [u8; 16],
    pub receiver_port: u16,
    pub sender_services: u64,
    pub sender_addr: [u8; 16],
    pub sender_port: u16,
    pub nonce: u64,
    pub user_agent: Vec<u8>,
    pub height: u32,
    pub relay: bool,
}

impl VersionMessage {
    /// A reasonable default `version` message for an outbound SPV
    /// connection: IPv4-mapped unroutable addresses, a zero nonce, an
    /// empty user agent, relay requested.
    pub fn new(height: u32) -> VersionMessage {
        VersionMessage {
            version: 70015,
            services: 0,
            timestamp: 0,
            receiver_services: 0,
            receiver_addr: ipv4_mapped([0, 0, 0, 0]),
            receiver_port: 8333,
            sender_services: 0,
            sender_addr: ipv4_mapped([0, 0, 0, 0]),
            sender_port: 8333,
            nonce: 0,
            user_agent: Vec::new(),
            height,
            relay: false,
        }
    }
}

impl Message for VersionMessage {
    const COMMAND: &'static [u8] = b"version";

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.services.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.receiver_services.to_le_bytes());
        out.extend_from_slice(&self.receiver_addr);
        out.extend_from_slice(&self.receiver_port.to_be_bytes());
        out.extend_from_slice(&self.sender_services.to_le_bytes());
        out.extend_from_slice(&self.sender_addr);
        out.extend_from_slice(&self.sender_port.to_be_bytes());
        out.extend_from_slice(&self.nonce.to_le_bytes());
        out.extend_from_slice(&encode_varint(self.user_agent.len() as u64));
        out.extend_from_slice(&self.user_agent);
        out.extend_from_slice(&self.height.to_le_bytes());
        out.push(self.relay as u8);
        out
    }

    fn parse(payload: &[u8]) -> Result<VersionMessage, ParseError> {
        let mut pos = 0usize;
        let version = read_u32_le(payload, &mut pos)?;
        let services = read_u64_le(payload, &mut pos)?;
        let timestamp = read_u64_le(payload, &mut pos)?;
        let receiver_services = read_u64_le(payload, &mut pos)?;
        let mut receiver_addr = [0u8; 16];
        receiver_addr.copy_from_slice(read_bytes(payload, &mut pos, 16)?);
        let receiver_port = u16::from_be_bytes(read_bytes(payload, &mut pos, 2)?.try_into().unwrap());
        let sender_services = read_u64_le(payload, &mut pos)?;
        let mut sender_addr = [0u8; 16];
        sender_addr.copy_from_slice(read_bytes(payload, &mut pos, 16)?);
        let sender_port = u16::from_be_bytes(read_bytes(payload, &mut pos, 2)?.try_into().unwrap());
        let nonce = read_u64_le(payload, &mut pos)?;
        let ua_len = read_varint(payload, &mut pos)? as usize;
        let user_agent = read_bytes(payload, &mut pos, ua_len)?.to_vec();
        let height = read_u32_le(payload, &mut pos)?;
        let relay = read_bytes(payload, &mut pos, 1)?[0] != 0;

        Ok(VersionMessage {
            version,
            services,
            timestamp,
            receiver_services,
            receiver_addr,
            receiver_port,
            sender_services,
            sender_addr,
            sender_port,
            nonce,
            user_agent,
            height,
            relay,
        })
    }
}

/// The empty `verack` acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerAckMessage;

impl Message for VerAckMessage {
    const COMMAND: &'static [u8] = b"verack";

    fn serialize(&self) -> Vec<u8> {
        Vec::new()
    }

    fn parse(payload: &[u8]) -> Result<VerAckMessage, ParseError> {
        if !payload.is_empty() {
            return Err(ParseError::new(0, ParseErrorKind::TrailingBytes));
        }
        Ok(VerAckMessage)
    }
}

/// A `ping` message: a single LE nonce echoed back in `pong`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingMessage {
    pub nonce: u64,
}

impl Message for PingMessage {
    const COMMAND: &'static [u8] = b"ping";

    fn serialize(&self) -> Vec<u8> {
        self.nonce.to_le_bytes().to_vec()
    }

    fn parse(payload: &[u8]) -> Result<PingMessage, ParseError> {
        let mut pos = 0usize;
        Ok(PingMessage { nonce: read_u64_le(payload, &mut pos)? })
    }
}

/// A `pong` message echoing a `ping`'s nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PongMessage {
    pub nonce: u64,
}

impl Message for PongMessage {
    const COMMAND: &'static [u8] = b"pong";

    fn serialize(&self) -> Vec<u8> {
        self.nonce.to_le_bytes().to_vec()
    }

    fn parse(payload: &[u8]) -> Result<PongMessage, ParseError> {
        let mut pos = 0usize;
        Ok(PongMessage { nonce: read_u64_le(payload, &mut pos)? })
    }
}

impl From<PingMessage> for PongMessage {
    fn from(ping: PingMessage) -> PongMessage {
        PongMessage { nonce: ping.nonce }
    }
}

/// Requests headers starting after `start_block` up to `end_block` (the
/// zero hash requests the server's default 2000-header window).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetHeadersMessage {
    pub version: u32,
    pub start_block: [u8; 32],
    pub end_block: [u8; 32],
}

impl GetHeadersMessage {
    pub fn new(start_block: [u8; 32]) -> GetHeadersMessage {
        GetHeadersMessage {
            version: 70015,
            start_block,
            end_block: [0u8; 32],
        }
    }
}

impl Message for GetHeadersMessage {
    const COMMAND: &'static [u8] = b"getheaders";

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&encode_varint(1));
        out.extend_from_slice(&reversed32(self.start_block));
        out.extend_from_slice(&reversed32(self.end_block));
        out
    }

    fn parse(payload: &[u8]) -> Result<GetHeadersMessage, ParseError> {
        let mut pos = 0usize;
        let version = read_u32_le(payload, &mut pos)?;
        let _hash_count = read_varint(payload, &mut pos)?;
        let mut start_block = [0u8; 32];
        start_block.copy_from_slice(read_bytes(payload, &mut pos, 32)?);
        let mut end_block = [0u8; 32];
        end_block.copy_from_slice(read_bytes(payload, &mut pos, 32)?);
        Ok(GetHeadersMessage {
            version,
            start_block: reversed32(start_block),
            end_block: reversed32(end_block),
        })
    }
}

/// A batch of block headers, each followed by a (always zero) tx count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadersMessage {
    pub headers: Vec<BlockHeader>,
}

impl Message for HeadersMessage {
    const COMMAND: &'static [u8] = b"headers";

    fn serialize(&self) -> Vec<u8> {
        let mut out = encode_varint(self.headers.len() as u64);
        for header in &self.headers {
            out.extend_from_slice(&header.serialize());
            out.extend_from_slice(&encode_varint(0));
        }
        out
    }

    fn parse(payload: &[u8]) -> Result<HeadersMessage, ParseError> {
        let mut pos = 0usize;
        let count = read_varint(payload, &mut pos)?;
        let mut headers = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let raw = read_bytes(payload, &mut pos, 80)?;
            headers.push(BlockHeader::parse(raw)?);
            let tx_count = read_varint(payload, &mut pos)?;
            if tx_count != 0 {
                return Err(ParseError::new(pos, ParseErrorKind::BadTransactionCountTrailer));
            }
        }
        Ok(HeadersMessage { headers })
    }
}

/// A filtered block: its header, the claimed total transaction count,
/// the partial Merkle tree's hashes, and its flag bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleBlockMessage {
    pub header: BlockHeader,
    pub total_transactions: u32,
    pub hashes: Vec<[u8; 32]>,
    pub flags: Vec<u8>,
}

impl MerkleBlockMessage {
    /// Unpacks [`MerkleBlockMessage::flags`] into individual bits,
    /// least-significant-bit-first within each byte, as
    /// [`crate::merkle::MerkleTree::populate`] expects.
    pub fn flag_bits(&self) -> Vec<bool> {
        let mut bits = Vec::with_capacity(self.flags.len() * 8);
        for byte in &self.flags {
            for i in 0..8 {
                bits.push(byte & (1 << i) != 0);
            }
        }
        bits
    }
}

impl Message for MerkleBlockMessage {
    const COMMAND: &'static [u8] = b"merkleblock";

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.header.serialize());
        out.extend_from_slice(&self.total_transactions.to_le_bytes());
        out.extend_from_slice(&encode_varint(self.hashes.len() as u64));
        for hash in &self.hashes {
            out.extend_from_slice(&reversed32(*hash));
        }
        out.push(self.flags.len() as u8);
        out.extend_from_slice(&self.flags);
        out
    }

    fn parse(payload: &[u8]) -> Result<MerkleBlockMessage, ParseError> {
        let mut pos = 0usize;
        let header = BlockHeader::parse(read_bytes(payload, &mut pos, 80)?)?;
        let total_transactions = read_u32_le(payload, &mut pos)?;
        let hash_count = read_varint(payload, &mut pos)?;
        let mut hashes = Vec::with_capacity(hash_count as usize);
        for _ in 0..hash_count {
            let mut h = [0u8; 32];
            h.copy_from_slice(read_bytes(payload, &mut pos, 32)?);
            hashes.push(reversed32(h));
        }
        let flag_byte_count = read_bytes(payload, &mut pos, 1)?[0] as usize;
        let flags = read_bytes(payload, &mut pos, flag_byte_count)?.to_vec();
        Ok(MerkleBlockMessage { header, total_transactions, hashes, flags })
    }
}

/// A request for specific objects, e.g. filtered blocks (`type = 3`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDataMessage {
    pub items: Vec<(u32, [u8; 32])>,
}

pub const INV_TYPE_FILTERED_BLOCK: u32 = 3;

impl Message for GetDataMessage {
    const COMMAND: &'static [u8] = b"getdata";

    fn serialize(&self) -> Vec<u8> {
        let mut out = encode_varint(self.items.len() as u64);
        for (item_type, hash) in &self.items {
            out.extend_from_slice(&item_type.to_le_bytes());
            out.extend_from_slice(&reversed32(*hash));
        }
        out
    }

    fn parse(payload: &[u8]) -> Result<GetDataMessage, ParseError> {
        let mut pos = 0usize;
        let count = read_varint(payload, &mut pos)?;
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let item_type = read_u32_le(payload, &mut pos)?;
            let mut hash = [0u8; 32];
            hash.copy_from_slice(read_bytes(payload, &mut pos, 32)?);
            items.push((item_type, reversed32(hash)));
        }
        Ok(GetDataMessage { items })
    }
}

/// Installs a bloom filter on the remote peer so it only relays
/// transactions and `merkleblock`s matching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLoadMessage {
    pub filter_bytes: Vec<u8>,
    pub function_count: u32,
    pub tweak: u32,
    pub flags: u8,
}

impl Message for FilterLoadMessage {
    const COMMAND: &'static [u8] = b"filterload";

    fn serialize(&self) -> Vec<u8> {
        let mut out = encode_varint(self.filter_bytes.len() as u64);
        out.extend_from_slice(&self.filter_bytes);
        out.extend_from_slice(&self.function_count.to_le_bytes());
        out.extend_from_slice(&self.tweak.to_le_bytes());
        out.push(self.flags);
        out
    }

    fn parse(payload: &[u8]) -> Result<FilterLoadMessage, ParseError> {
        let mut pos = 0usize;
        let len = read_varint(payload, &mut pos)? as usize;
        let filter_bytes = read_bytes(payload, &mut pos, len)?.to_vec();
        let function_count = read_u32_le(payload, &mut pos)?;
        let tweak = read_u32_le(payload, &mut pos)?;
        let flags = read_bytes(payload, &mut pos, 1)?[0];
        Ok(FilterLoadMessage { filter_bytes, function_count, tweak, flags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_message_round_trip() {
        let msg = VersionMessage::new(12345);
        let bytes = msg.serialize();
        let parsed = VersionMessage::parse(&bytes).unwrap();
        assert_eq!(msg, parsed);
    }

    #[test]
    fn verack_round_trip_is_empty() {
        let msg = VerAckMessage;
        assert!(msg.serialize().is_empty());
        assert_eq!(VerAckMessage::parse(&[]).unwrap(), VerAckMessage);
    }

    #[test]
    fn verack_rejects_nonempty_payload() {
        assert!(VerAckMessage::parse(&[0x01]).is_err());
    }

    #[test]
    fn ping_pong_echo_nonce() {
        let ping = PingMessage { nonce: 0xdead_beef };
        let pong: PongMessage = ping.into();
        assert_eq!(pong.nonce, ping.nonce);
        let parsed = PongMessage::parse(&pong.serialize()).unwrap();
        assert_eq!(parsed, pong);
    }

    #[test]
    fn getheaders_round_trip() {
        let msg = GetHeadersMessage::new([0xab; 32]);
        let bytes = msg.serialize();
        let parsed = GetHeadersMessage::parse(&bytes).unwrap();
        assert_eq!(msg, parsed);
    }

    #[test]
    fn headers_round_trip() {
        let header = BlockHeader {
            version: 1,
            prev_block: [1; 32],
            merkle_root: [2; 32],
            timestamp: 100,
            bits: 0x1d00_ffff,
            nonce: 0,
        };
        let msg = HeadersMessage { headers: vec![header] };
        let bytes = msg.serialize();
        let parsed = HeadersMessage::parse(&bytes).unwrap();
        assert_eq!(msg, parsed);
    }

    #[test]
    fn headers_rejects_nonzero_tx_count_trailer() {
        let header = BlockHeader {
            version: 1,
            prev_block: [1; 32],
            merkle_root: [2; 32],
            timestamp: 100,
            bits: 0x1d00_ffff,
            nonce: 0,
        };
        let mut bytes = encode_varint(1);
        bytes.extend_from_slice(&header.serialize());
        bytes.extend_from_slice(&encode_varint(1)); // should be 0
        let err = HeadersMessage::parse(&bytes).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::BadTransactionCountTrailer));
    }

    #[test]
    fn merkleblock_round_trip() {
        let header = BlockHeader {
            version: 1,
            prev_block: [1; 32],
            merkle_root: [2; 32],
            timestamp: 100,
            bits: 0x1d00_ffff,
            nonce: 0,
        };
        let msg = MerkleBlockMessage {
            header,
            total_transactions: 5,
            hashes: vec![[3; 32], [4; 32]],
            flags: vec![0b0000_0101],
        };
        let bytes = msg.serialize();
        let parsed = MerkleBlockMessage::parse(&bytes).unwrap();
        assert_eq!(msg, parsed);
        assert_eq!(parsed.flag_bits()[..3], [true, false, true]);
    }

    #[test]
    fn getdata_round_trip() {
        let msg = GetDataMessage { items: vec![(INV_TYPE_FILTERED_BLOCK, [7; 32])] };
        let bytes = msg.serialize();
        let parsed = GetDataMessage::parse(&bytes).unwrap();
        assert_eq!(msg, parsed);
    }

    #[test]
    fn filterload_round_trip() {
        let msg = FilterLoadMessage {
            filter_bytes: vec![0xde, 0xad],
            function_count: 3,
            tweak: 99,
            flags: 1,
        };
        let bytes = msg.serialize();
        let parsed = FilterLoadMessage::parse(&bytes).unwrap();
        assert_eq!(msg, parsed);
    }
}
