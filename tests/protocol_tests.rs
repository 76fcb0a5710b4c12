//! Integration tests that exercise whole flows across module boundaries
//! rather than a single function: signing and verifying a real input,
//! replaying a merkle block back to a header's root, and building a
//! bloom filter straight into a `filterload` message.

use bitcoin_proto::base58;
use bitcoin_proto::bigint::Int;
use bitcoin_proto::block::BlockHeader;
use bitcoin_proto::bloom::BloomFilter;
use bitcoin_proto::hash;
use bitcoin_proto::merkle::{merkle_root, MerkleTree};
use bitcoin_proto::p2p::messages::{FilterLoadMessage, Message, MerkleBlockMessage};
use bitcoin_proto::privkey::PrivateKey;
use bitcoin_proto::tx::{Tx, TxIn, TxOut};

fn sample_header(merkle_root: [u8; 32]) -> BlockHeader {
    BlockHeader {
        version: 1,
        prev_block: [0u8; 32],
        merkle_root,
        timestamp: 1_600_000_000,
        bits: 0x1d00_ffff,
        nonce: 0,
    }
}

#[test]
fn sign_and_verify_a_p2pkh_input_end_to_end() {
    let key = PrivateKey::new(Int::from(424242u32));
    let address_script_pubkey = {
        let sec = bitcoin_proto::secp256k1::sec_encode(key.public_point(), true);
        let h160 = hash::hash160(&sec);
        let mut script = vec![0x76, 0xa9, 0x14];
        script.extend_from_slice(&h160);
        script.push(0x88);
        script.push(0xac);
        script
    };

    let mut tx = Tx {
        version: 1,
        inputs: vec![TxIn {
            prev_txid: [0x22; 32],
            prev_index: 0,
            script_sig: vec![],
            sequence: 0xffff_ffff,
            witness: vec![],
        }],
        outputs: vec![TxOut { amount: 4_000, script_pubkey: vec![0x6a] }],
        locktime: 0,
        is_segwit: false,
    };

    tx.inputs[0].script_sig = tx.sign_input(0, &key, &address_script_pubkey);
    let prev_output = TxOut { amount: 5_000, script_pubkey: address_script_pubkey.clone() };
    assert!(tx.verify_input(0, &prev_output).unwrap());

    // A signature computed against a different previous scriptPubKey
    // (a different input being spent) must not verify here.
    let mut other_key_script = address_script_pubkey.clone();
    other_key_script[3] ^= 0xff;
    let other_output = TxOut { amount: 5_000, script_pubkey: other_key_script };
    assert!(!tx.verify_input(0, &other_output).unwrap());
}

#[test]
fn merkleblock_message_replays_to_the_headers_own_root() {
    let leaves: Vec<[u8; 32]> = (0..7u8).map(|b| [b; 32]).collect();
    let root = merkle_root(&leaves);
    let header = sample_header(root);

    // 7 leaves makes a 14-node tree, so exactly 14 flag bits get consumed
    // (one per node visited); the trailing 2 padding bits must be 0 or
    // the replay reports leftover flag bits.
    let msg = MerkleBlockMessage {
        header,
        total_transactions: leaves.len() as u32,
        hashes: leaves.clone(),
        flags: vec![0b1111_1111, 0b0011_1111],
    };

    let bytes = msg.serialize();
    let parsed = MerkleBlockMessage::parse(&bytes).unwrap();
    assert_eq!(parsed.header.merkle_root, root);

    let mut tree = MerkleTree::new(parsed.hashes.len());
    let replayed_root = tree.populate(&parsed.flag_bits(), &parsed.hashes).unwrap();
    assert_eq!(replayed_root, parsed.header.merkle_root);

    // All 14 consumed flag bits are 1, so every leaf is a matched
    // transaction.
    assert_eq!(tree.matched(), leaves.as_slice());
}

#[test]
fn bloom_filter_round_trips_through_a_filterload_message() {
    let mut filter = BloomFilter::new(10, 5, 99);
    filter.add(b"Hello World");
    filter.add(b"Goodbye!");

    let payload = filter.filterload_payload(1);
    let parsed = FilterLoadMessage::parse(&payload).unwrap();
    let rebuilt = FilterLoadMessage {
        filter_bytes: filter.filter_bytes(),
        function_count: 5,
        tweak: 99,
        flags: 1,
    };
    assert_eq!(parsed, rebuilt);
    assert_eq!(parsed.serialize(), payload);
}

#[test]
fn address_decodes_back_to_the_keys_pubkey_hash() {
    let key = PrivateKey::new(Int::from(90210u32));
    let sec = bitcoin_proto::secp256k1::sec_encode(key.public_point(), true);
    let expected_hash = hash::hash160(&sec);

    let address = key.address(true, false);
    let decoded = base58::decode_check(&address).unwrap();
    assert_eq!(decoded[0], 0x00);
    assert_eq!(&decoded[1..], &expected_hash);
}
