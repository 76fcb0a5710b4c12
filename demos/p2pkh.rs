//! Demonstrates the complete Pay-to-Public-Key-Hash (P2PKH) validation
//! flow: signing a real sighash digest with a private key, then
//! verifying the resulting scriptSig against the locking script.
//!
//! Run with: `cargo run --example p2pkh`

use bitcoin_proto::bigint::{from_be_bytes, Int};
use bitcoin_proto::hash;
use bitcoin_proto::privkey::PrivateKey;
use bitcoin_proto::script::engine::ExecuteOpts;
use bitcoin_proto::script::tokenizer::parse_script;
use bitcoin_proto::script::validate_p2pkh_with_opts;
use bitcoin_proto::secp256k1;

fn main() {
    // 1. A private key and its SEC-encoded (compressed) public key.
    let key = PrivateKey::new(Int::from(424242u32));
    let sec = secp256k1::sec_encode(key.public_point(), true);

    // 2. Compute HASH160(pubkey) -- the 20-byte "address hash" that
    //    appears in the locking script.
    let pubkey_hash = hash::hash160(&sec);

    // 3. Sign a stand-in sighash digest and append the SIGHASH_ALL byte.
    let z_bytes = hash::hash256(b"a spending transaction's sighash preimage");
    let z = from_be_bytes(&z_bytes);
    let mut der = key.sign(&z).to_der();
    der.push(0x01); // SIGHASH_ALL

    // 4. Build scriptSig: <sig> <pubkey>
    let mut script_sig = Vec::new();
    script_sig.push(der.len() as u8);
    script_sig.extend_from_slice(&der);
    script_sig.push(sec.len() as u8);
    script_sig.extend_from_slice(&sec);

    // 5. Build scriptPubKey: OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG
    let mut script_pubkey = Vec::new();
    script_pubkey.push(0x76); // OP_DUP
    script_pubkey.push(0xa9); // OP_HASH160
    script_pubkey.push(0x14); // push 20 bytes
    script_pubkey.extend_from_slice(&pubkey_hash);
    script_pubkey.push(0x88); // OP_EQUALVERIFY
    script_pubkey.push(0xac); // OP_CHECKSIG

    // 6. Display the scriptPubKey tokens for inspection.
    let tokens = parse_script(&script_pubkey).expect("valid scriptPubKey");
    println!("scriptPubKey tokens:");
    print!(" ");
    for token in &tokens {
        print!(" {token}");
    }
    println!();
    println!();

    // 7. Validate the P2PKH script pair against the real sighash digest.
    let opts = ExecuteOpts { sighash: Some(z_bytes) };
    let result = validate_p2pkh_with_opts(&script_sig, &script_pubkey, &opts).expect("execution succeeded");
    println!("P2PKH validation result: {result}");
}
