//! A cooperative, single-threaded SPV peer connection: handshake plus
//! a `wait_for`-style dispatch loop over a generic duplex stream.

use std::io::{self, Read, Write};

use super::envelope::NetworkEnvelope;
use super::messages::{
    Message, PingMessage, PongMessage, VerAckMessage, VersionMessage,
};

/// A connection to a single peer over any `Read + Write` duplex
/// (a `TcpStream` in production, an `io::Cursor` or pipe in tests).
pub struct SimpleNode<S> {
    stream: S,
    magic: u32,
}

impl<S: Read + Write> SimpleNode<S> {
    pub fn new(stream: S, magic: u32) -> SimpleNode<S> {
        SimpleNode { stream, magic }
    }

    fn send<M: Message>(&mut self, message: &M) -> io::Result<()> {
        let envelope = NetworkEnvelope::new(M::COMMAND, message.serialize(), self.magic);
        envelope.write_to(&mut self.stream)
    }

    fn receive(&mut self) -> io::Result<NetworkEnvelope> {
        NetworkEnvelope::read_from(&mut self.stream, self.magic)
    }

    /// Performs the `version`/`verack` handshake: sends our `version`,
    /// then reads envelopes until both a `version` and a `verack` have
    /// been seen, auto-replying `verack` to the peer's `version`.
    pub fn handshake(&mut self, height: u32) -> io::Result<()> {
        self.send(&VersionMessage::new(height))?;

        let mut got_version = false;
        let mut got_verack = false;
        while !(got_version && got_verack) {
            let envelope = self.receive()?;
            match envelope.command_str() {
                "version" => {
                    got_version = true;
                    self.send(&VerAckMessage)?;
                }
                "verack" => got_verack = true,
                "ping" => {
                    let ping = PingMessage::parse(&envelope.payload)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
                    let pong: PongMessage = ping.into();
                    self.send(&pong)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Blocks until an envelope whose command is in `commands` arrives,
    /// transparently answering `ping` with `pong` and skipping anything
    /// else while it waits.
    pub fn wait_for(&mut self, commands: &[&[u8]]) -> io::Result<NetworkEnvelope> {
        loop {
            let envelope = self.receive()?;
            if envelope.command_str() == "ping" {
                let ping = PingMessage::parse(&envelope.payload)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
                let pong: PongMessage = ping.into();
                self.send(&pong)?;
                continue;
            }
            if commands.iter().any(|c| *c == envelope.command_str().as_bytes()) {
                return Ok(envelope);
            }
        }
    }

    /// Sends a single typed message to the peer.
    pub fn send_message<M: Message>(&mut self, message: &M) -> io::Result<()> {
        self.send(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::p2p::envelope::MAGIC_TESTNET;
    use crate::p2p::messages::VerAckMessage;
    use std::io::Cursor;

    /// A minimal in-memory duplex: reads come from `inbound`, writes go
    /// to `outbound`.
    struct MockStream {
        inbound: Cursor<Vec<u8>>,
        outbound: Vec<u8>,
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inbound.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.outbound.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn handshake_completes_on_version_then_verack() {
        let mut scripted = Vec::new();
        scripted.extend(NetworkEnvelope::new(b"version", VersionMessage::new(0).serialize(), MAGIC_TESTNET).serialize());
        scripted.extend(NetworkEnvelope::new(b"verack", VerAckMessage.serialize(), MAGIC_TESTNET).serialize());

        let mut node = SimpleNode::new(
            MockStream { inbound: Cursor::new(scripted), outbound: Vec::new() },
            MAGIC_TESTNET,
        );
        node.handshake(0).unwrap();

        // Our outbound stream is: version, then a verack reply to the
        // peer's version.
        let mut pos = 0usize;
        let sent_version = NetworkEnvelope::parse(&node.stream.outbound, MAGIC_TESTNET).unwrap();
        assert_eq!(sent_version.command_str(), "version");
        pos += 24 + sent_version.payload.len();
        let sent_verack = NetworkEnvelope::parse(&node.stream.outbound[pos..], MAGIC_TESTNET).unwrap();
        assert_eq!(sent_verack.command_str(), "verack");
    }

    #[test]
    fn wait_for_replies_to_ping_and_skips_unknown_commands() {
        let mut scripted = Vec::new();
        scripted.extend(NetworkEnvelope::new(b"inv", vec![], MAGIC_TESTNET).serialize());
        scripted.extend(NetworkEnvelope::new(b"ping", PingMessage { nonce: 7 }.serialize(), MAGIC_TESTNET).serialize());
        scripted.extend(NetworkEnvelope::new(b"verack", VerAckMessage.serialize(), MAGIC_TESTNET).serialize());

        let mut node = SimpleNode::new(
            MockStream { inbound: Cursor::new(scripted), outbound: Vec::new() },
            MAGIC_TESTNET,
        );
        let envelope = node.wait_for(&[b"verack"]).unwrap();
        assert_eq!(envelope.command_str(), "verack");

        let pong_reply = NetworkEnvelope::parse(&node.stream.outbound, MAGIC_TESTNET).unwrap();
        assert_eq!(pong_reply.command_str(), "pong");
        assert_eq!(PongMessage::parse(&pong_reply.payload).unwrap().nonce, 7);
    }
}
