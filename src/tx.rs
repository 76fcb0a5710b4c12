//! Transactions: legacy and segwit parsing/serialization, txid/wtxid,
//! fee calculation, and the legacy and BIP143 sighash algorithms.

use crate::error::{ParseError, ParseErrorKind};
use crate::hash::hash256;
use crate::privkey::PrivateKey;
use crate::resolver::PrevTxProvider;
use crate::secp256k1;
use crate::varint::{encode_varint, read_bytes, read_u32_le, read_u64_le, read_varint};

/// SIGHASH flags. Only `All` is exercised by this crate's signing path;
/// the others are provided so callers can build and verify against
/// transactions that use them.
pub const SIGHASH_ALL: u32 = 0x01;
pub const SIGHASH_NONE: u32 = 0x02;
pub const SIGHASH_SINGLE: u32 = 0x03;
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    /// The referenced transaction's id, in display (big-endian) byte
    /// order, matching [`Tx::txid`]. Reversed relative to the wire,
    /// which stores it little-endian; [`TxIn::parse`]/`serialize_into`
    /// perform the reversal at the wire boundary.
    pub prev_txid: [u8; 32],
    pub prev_index: u32,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    /// Witness stack items for this input. Empty for a legacy input or a
    /// segwit transaction's non-witness inputs.
    pub witness: Vec<Vec<u8>>,
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub amount: u64,
    pub script_pubkey: Vec<u8>,
}

/// A Bitcoin transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub locktime: u32,
    /// Whether this transaction carries the segwit marker/flag and
    /// per-input witness data. Tracked explicitly rather than inferred
    /// from `witness` being non-empty, since an all-legacy-signature
    /// segwit transaction still needs the marker serialized.
    pub is_segwit: bool,
}

impl Tx {
    /// Parses a transaction from raw bytes, detecting the segwit
    /// marker/flag automatically.
    pub fn parse(bytes: &[u8]) -> Result<Tx, ParseError> {
        let mut pos = 0usize;
        let tx = Tx::parse_at(bytes, &mut pos)?;
        if pos != bytes.len() {
            return Err(ParseError::new(pos, ParseErrorKind::TrailingBytes));
        }
        Ok(tx)
    }

    fn parse_at(bytes: &[u8], pos: &mut usize) -> Result<Tx, ParseError> {
        let version = read_u32_le(bytes, pos)? as i32;

        let mut is_segwit = false;
        let marker_pos = *pos;
        if bytes.get(*pos) == Some(&0x00) {
            let flag = *bytes
                .get(*pos + 1)
                .ok_or_else(|| ParseError::new(marker_pos, ParseErrorKind::UnexpectedEof))?;
            if flag != 0x01 {
                return Err(ParseError::new(marker_pos, ParseErrorKind::BadSegwitMarker));
            }
            is_segwit = true;
            *pos += 2;
        }

        let input_count = read_varint(bytes, pos)?;
        let mut inputs = Vec::with_capacity(input_count as usize);
        for _ in 0..input_count {
            inputs.push(TxIn::parse(bytes, pos)?);
        }

        let output_count = read_varint(bytes, pos)?;
        let mut outputs = Vec::with_capacity(output_count as usize);
        for _ in 0..output_count {
            outputs.push(TxOut::parse(bytes, pos)?);
        }

        if is_segwit {
            for input in &mut inputs {
                let item_count = read_varint(bytes, pos)?;
                let mut witness = Vec::with_capacity(item_count as usize);
                for _ in 0..item_count {
                    let len = read_varint(bytes, pos)? as usize;
                    witness.push(read_bytes(bytes, pos, len)?.to_vec());
                }
                input.witness = witness;
            }
        }

        let locktime = read_u32_le(bytes, pos)?;

        Ok(Tx {
            version,
            inputs,
            outputs,
            locktime,
            is_segwit,
        })
    }

    /// Serializes this transaction, including witness data and the
    /// segwit marker/flag if [`Tx::is_segwit`] is set.
    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_with_witness(self.is_segwit)
    }

    /// Serializes this transaction without witness data, regardless of
    /// [`Tx::is_segwit`]. This is the legacy form hashed for `txid` and
    /// for the legacy sighash algorithm.
    pub fn serialize_legacy(&self) -> Vec<u8> {
        self.serialize_with_witness(false)
    }

    fn serialize_with_witness(&self, with_witness: bool) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.version as u32).to_le_bytes());

        if with_witness {
            out.push(0x00);
            out.push(0x01);
        }

        out.extend_from_slice(&encode_varint(self.inputs.len() as u64));
        for input in &self.inputs {
            input.serialize_into(&mut out);
        }

        out.extend_from_slice(&encode_varint(self.outputs.len() as u64));
        for output in &self.outputs {
            output.serialize_into(&mut out);
        }

        if with_witness {
            for input in &self.inputs {
                out.extend_from_slice(&encode_varint(input.witness.len() as u64));
                for item in &input.witness {
                    out.extend_from_slice(&encode_varint(item.len() as u64));
                    out.extend_from_slice(item);
                }
            }
        }

        out.extend_from_slice(&self.locktime.to_le_bytes());
        out
    }

    /// The transaction id: `reverse(HASH256(legacy_serialization))`, in
    /// display (big-endian) byte order, excluding the segwit
    /// marker/flag/witnesses.
    pub fn txid(&self) -> [u8; 32] {
        reversed(hash256(&self.serialize_legacy()))
    }

    /// The witness transaction id: `reverse(HASH256(full_serialization))`,
    /// including witness data. Equal to [`Tx::txid`] for a non-segwit
    /// transaction.
    pub fn wtxid(&self) -> [u8; 32] {
        reversed(hash256(&self.serialize_with_witness(true)))
    }

    /// A coinbase transaction has exactly one input whose previous
    /// output is the all-zero/`0xffffffff` null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].prev_txid == [0u8; 32]
            && self.inputs[0].prev_index == 0xffff_ffff
    }

    /// The block height encoded in a coinbase input's scriptSig per
    /// BIP34: the first push, read as a little-endian integer.
    ///
    /// Returns `None` if this isn't a coinbase transaction or the
    /// scriptSig doesn't begin with a recognizable push of 1-8 bytes.
    pub fn coinbase_height(&self) -> Option<u64> {
        if !self.is_coinbase() {
            return None;
        }
        let script = &self.inputs[0].script_sig;
        let len = *script.first()? as usize;
        if len == 0 || len > 8 {
            return None;
        }
        let push = script.get(1..1 + len)?;
        let mut buf = [0u8; 8];
        buf[..len].copy_from_slice(push);
        Some(u64::from_le_bytes(buf))
    }

    /// Signs input `i` against its legacy `SIGHASH_ALL` digest, using
    /// `prev_script_pubkey` (the referenced output's locking script) as
    /// the scriptCode substituted during sighash computation, and
    /// returns the scriptSig `<DER signature ∥ 0x01> <compressed SEC
    /// pubkey>` ready to install on that input.
    pub fn sign_input(&self, input_index: usize, key: &PrivateKey, prev_script_pubkey: &[u8]) -> Vec<u8> {
        let z_bytes = self.sig_hash_legacy(input_index, prev_script_pubkey, SIGHASH_ALL);
        let z = crate::bigint::from_be_bytes(&z_bytes);
        let mut der = key.sign(&z).to_der();
        der.push(SIGHASH_ALL as u8);
        let sec = secp256k1::sec_encode(key.public_point(), true);

        let mut script_sig = Vec::new();
        script_sig.push(der.len() as u8);
        script_sig.extend_from_slice(&der);
        script_sig.push(sec.len() as u8);
        script_sig.extend_from_slice(&sec);
        script_sig
    }

    /// Verifies input `i` against `prev_output` (the referenced output
    /// this input spends).
    ///
    /// Dispatches on `prev_output.script_pubkey`'s standard-form shape
    /// before choosing how to verify: P2WPKH and P2WSH compute a BIP143
    /// sighash over `prev_output.amount` and check the input's witness
    /// stack; P2SH inspects the redeem script pushed by the scriptSig and
    /// recurses the same dispatch (covering P2SH-wrapped segwit); anything
    /// else falls back to the legacy `SIGHASH_ALL` digest and a plain
    /// scriptSig/scriptPubKey evaluation.
    pub fn verify_input(
        &self,
        input_index: usize,
        prev_output: &TxOut,
    ) -> Result<bool, crate::script::error::ScriptError> {
        use crate::script::engine::ExecuteOpts;
        use crate::script::{self, ScriptType};

        let script_sig = &self.inputs[input_index].script_sig;
        let witness = &self.inputs[input_index].witness;

        match script::classify(&prev_output.script_pubkey) {
            ScriptType::P2wpkh(hash160) => {
                self.verify_p2wpkh(input_index, witness, &hash160, prev_output.amount)
            }
            ScriptType::P2wsh(hash256) => {
                self.verify_p2wsh(input_index, witness, &hash256, prev_output.amount)
            }
            ScriptType::P2sh(hash160) => {
                let redeem_script = script::redeem_script_of(script_sig)?;
                match script::classify(&redeem_script) {
                    ScriptType::P2wpkh(inner_hash) => {
                        self.verify_p2wpkh(input_index, witness, &inner_hash, prev_output.amount)
                    }
                    ScriptType::P2wsh(inner_hash) => {
                        self.verify_p2wsh(input_index, witness, &inner_hash, prev_output.amount)
                    }
                    _ => {
                        let z = self.sig_hash_legacy(input_index, &redeem_script, SIGHASH_ALL);
                        let opts = ExecuteOpts { sighash: Some(z) };
                        script::validate_p2sh_with_opts(script_sig, &hash160, &opts)
                    }
                }
            }
            ScriptType::Other => {
                let z = self.sig_hash_legacy(input_index, &prev_output.script_pubkey, SIGHASH_ALL);
                let opts = ExecuteOpts { sighash: Some(z) };
                script::validate_p2pkh_with_opts(script_sig, &prev_output.script_pubkey, &opts)
            }
        }
    }

    fn verify_p2wpkh(
        &self,
        input_index: usize,
        witness: &[Vec<u8>],
        hash160: &[u8; 20],
        amount: u64,
    ) -> Result<bool, crate::script::error::ScriptError> {
        let script_code = crate::script::p2wpkh_script_code(hash160);
        let z = self.sig_hash_bip143(input_index, &script_code, amount, SIGHASH_ALL);
        let opts = crate::script::engine::ExecuteOpts { sighash: Some(z) };
        crate::script::validate_p2wpkh_with_opts(witness, hash160, &opts)
    }

    fn verify_p2wsh(
        &self,
        input_index: usize,
        witness: &[Vec<u8>],
        hash256: &[u8; 32],
        amount: u64,
    ) -> Result<bool, crate::script::error::ScriptError> {
        let witness_script = witness
            .last()
            .ok_or(crate::script::error::ScriptError::StackUnderflow)?;
        let z = self.sig_hash_bip143(input_index, witness_script, amount, SIGHASH_ALL);
        let opts = crate::script::engine::ExecuteOpts { sighash: Some(z) };
        crate::script::validate_p2wsh_with_opts(witness, hash256, &opts)
    }

    /// Sums `(input value) - (output value)` using `resolver` to look up
    /// each input's previous transaction. `testnet` is forwarded to the
    /// resolver so it can pick the right network to query; lookups are
    /// made with `fresh = false`, letting a caching resolver serve
    /// repeated fee computations for the same prevouts from its cache.
    pub fn fee(&self, resolver: &dyn PrevTxProvider, testnet: bool) -> Result<i64, crate::error::ResolverError> {
        let mut input_total: i64 = 0;
        for input in &self.inputs {
            let prev = resolver.fetch(&input.prev_txid, testnet, false)?;
            let out = prev
                .outputs
                .get(input.prev_index as usize)
                .ok_or_else(|| crate::error::ResolverError("prev_index out of range".into()))?;
            input_total += out.amount as i64;
        }
        let output_total: i64 = self.outputs.iter().map(|o| o.amount as i64).sum();
        Ok(input_total - output_total)
    }

    /// Computes the legacy sighash for `input_index`, replacing that
    /// input's scriptSig with `script_pubkey` (the prior output's
    /// locking script, or its redeem script for P2SH) and every other
    /// input's scriptSig with an empty script, then appending the
    /// 4-byte little-endian `hash_type`.
    pub fn sig_hash_legacy(&self, input_index: usize, script_pubkey: &[u8], hash_type: u32) -> [u8; 32] {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.version as u32).to_le_bytes());
        out.extend_from_slice(&encode_varint(self.inputs.len() as u64));
        for (i, input) in self.inputs.iter().enumerate() {
            let script = if i == input_index { script_pubkey } else { &[][..] };
            out.extend_from_slice(&reversed(input.prev_txid));
            out.extend_from_slice(&input.prev_index.to_le_bytes());
            out.extend_from_slice(&encode_varint(script.len() as u64));
            out.extend_from_slice(script);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }
        out.extend_from_slice(&encode_varint(self.outputs.len() as u64));
        for output in &self.outputs {
            output.serialize_into(&mut out);
        }
        out.extend_from_slice(&self.locktime.to_le_bytes());
        out.extend_from_slice(&hash_type.to_le_bytes());
        hash256(&out)
    }

    /// Computes the BIP143 segwit sighash for `input_index` spending an
    /// output worth `amount` with scripting code `script_code` (the
    /// witness program's implied scriptPubKey, e.g. a P2WPKH's
    /// `OP_DUP OP_HASH160 <h160> OP_EQUALVERIFY OP_CHECKSIG`).
    pub fn sig_hash_bip143(
        &self,
        input_index: usize,
        script_code: &[u8],
        amount: u64,
        hash_type: u32,
    ) -> [u8; 32] {
        let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY != 0;
        let base_type = hash_type & 0x1f;

        let hash_prevouts = if anyone_can_pay {
            [0u8; 32]
        } else {
            let mut buf = Vec::new();
            for input in &self.inputs {
                buf.extend_from_slice(&reversed(input.prev_txid));
                buf.extend_from_slice(&input.prev_index.to_le_bytes());
            }
            hash256(&buf)
        };

        let hash_sequence = if anyone_can_pay || base_type == SIGHASH_SINGLE || base_type == SIGHASH_NONE {
            [0u8; 32]
        } else {
            let mut buf = Vec::new();
            for input in &self.inputs {
                buf.extend_from_slice(&input.sequence.to_le_bytes());
            }
            hash256(&buf)
        };

        let hash_outputs = if base_type == SIGHASH_NONE {
            [0u8; 32]
        } else if base_type == SIGHASH_SINGLE {
            match self.outputs.get(input_index) {
                Some(out) => {
                    let mut buf = Vec::new();
                    out.serialize_into(&mut buf);
                    hash256(&buf)
                }
                None => [0u8; 32],
            }
        } else {
            let mut buf = Vec::new();
            for output in &self.outputs {
                output.serialize_into(&mut buf);
            }
            hash256(&buf)
        };

        let input = &self.inputs[input_index];
        let mut preimage = Vec::new();
        preimage.extend_from_slice(&(self.version as u32).to_le_bytes());
        preimage.extend_from_slice(&hash_prevouts);
        preimage.extend_from_slice(&hash_sequence);
        preimage.extend_from_slice(&reversed(input.prev_txid));
        preimage.extend_from_slice(&input.prev_index.to_le_bytes());
        preimage.extend_from_slice(&encode_varint(script_code.len() as u64));
        preimage.extend_from_slice(script_code);
        preimage.extend_from_slice(&amount.to_le_bytes());
        preimage.extend_from_slice(&input.sequence.to_le_bytes());
        preimage.extend_from_slice(&hash_outputs);
        preimage.extend_from_slice(&self.locktime.to_le_bytes());
        preimage.extend_from_slice(&hash_type.to_le_bytes());
        hash256(&preimage)
    }
}

impl TxIn {
    fn parse(bytes: &[u8], pos: &mut usize) -> Result<TxIn, ParseError> {
        let prev_txid_bytes = read_bytes(bytes, pos, 32)?;
        let mut prev_txid = [0u8; 32];
        prev_txid.copy_from_slice(prev_txid_bytes);
        let prev_txid = reversed(prev_txid);
        let prev_index = read_u32_le(bytes, pos)?;
        let script_len = read_varint(bytes, pos)? as usize;
        let script_sig = read_bytes(bytes, pos, script_len)?.to_vec();
        let sequence = read_u32_le(bytes, pos)?;
        Ok(TxIn {
            prev_txid,
            prev_index,
            script_sig,
            sequence,
            witness: Vec::new(),
        })
    }

    fn serialize_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&reversed(self.prev_txid));
        out.extend_from_slice(&self.prev_index.to_le_bytes());
        out.extend_from_slice(&encode_varint(self.script_sig.len() as u64));
        out.extend_from_slice(&self.script_sig);
        out.extend_from_slice(&self.sequence.to_le_bytes());
    }
}

/// Reverses a 32-byte array, converting between the wire's little-endian
/// txid/hash order and the conventional big-endian display order.
fn reversed(mut bytes: [u8; 32]) -> [u8; 32] {
    bytes.reverse();
    bytes
}

impl TxOut {
    fn parse(bytes: &[u8], pos: &mut usize) -> Result<TxOut, ParseError> {
        let amount = read_u64_le(bytes, pos)?;
        let script_len = read_varint(bytes, pos)? as usize;
        let script_pubkey = read_bytes(bytes, pos, script_len)?.to_vec();
        Ok(TxOut { amount, script_pubkey })
    }

    fn serialize_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&encode_varint(self.script_pubkey.len() as u64));
        out.extend_from_slice(&self.script_pubkey);
    }
}
