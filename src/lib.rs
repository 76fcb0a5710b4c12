//! A from-scratch Bitcoin protocol library: wire parsing for blocks and
//! transactions, a Bitcoin Script interpreter, secp256k1 ECDSA signing
//! and verification built on hand-rolled field/curve arithmetic, Merkle
//! and BIP37 partial-Merkle validation, a bloom filter, and enough of
//! the P2P protocol to run an SPV handshake and header sync.
//!
//! # Consensus warning
//!
//! This crate is **not** a replacement for a full Bitcoin node. It
//! performs per-input script evaluation and header proof-of-work
//! checks, not full consensus validation (UTXO set tracking, BIP-30/34
//! enforcement beyond coinbase height, soft-fork activation state,
//! mempool policy). Do not use it to validate transactions protecting
//! real funds without independent verification.
//!
//! # Layout
//!
//! - [`bigint`], [`field`], [`point`], [`secp256k1`] — unbounded integer
//!   arithmetic and secp256k1 field/curve math, built from scratch.
//! - [`signature`], [`privkey`] — DER/low-S signatures, RFC 6979
//!   deterministic signing, WIF and address encoding.
//! - [`base58`], [`hash`], [`hex`], [`varint`] — the encodings and wire
//!   helpers everything else is built on.
//! - [`script`] — the Script tokenizer, stack VM, and opcode table.
//! - [`tx`] — transaction parsing, txid/wtxid, fee, legacy and BIP143
//!   sighash, signing and verification.
//! - [`resolver`] — the injected previous-transaction lookup capability
//!   `tx`'s sighash and fee methods depend on.
//! - [`block`] — block headers, proof-of-work, retargeting, version
//!   bits.
//! - [`merkle`] — Merkle root computation and BIP37 partial Merkle tree
//!   replay.
//! - [`bloom`] — BIP37 bloom filters.
//! - [`p2p`] — envelope framing and the handful of message payloads an
//!   SPV client needs.
//! - [`error`] — the per-component error enums and the crate-wide
//!   [`error::Error`] that composes them.
//!
//! # Quick example
//!
//! ```rust
//! use bitcoin_proto::script::tokenizer::parse_script_hex;
//! use bitcoin_proto::script::engine::execute;
//!
//! let tokens = parse_script_hex("515187").unwrap(); // OP_1 OP_1 OP_EQUAL
//! assert!(execute(&tokens).unwrap());
//! ```

pub mod base58;
pub mod bigint;
pub mod block;
pub mod bloom;
pub mod error;
pub mod field;
pub mod hash;
pub mod hex;
pub mod merkle;
pub mod p2p;
pub mod point;
pub mod privkey;
pub mod resolver;
pub mod script;
pub mod secp256k1;
pub mod signature;
pub mod tx;
pub mod varint;
