//! Bitcoin Script: tokenizing, executing, and validating scriptSig /
//! scriptPubKey pairs.

pub mod engine;
pub mod error;
pub mod opcode;
pub(crate) mod stack;
pub mod token;
pub mod tokenizer;

use crate::hash;
use crate::script::engine::{execute_on_stack, ExecuteOpts};
use crate::script::error::ScriptError;
use crate::script::opcode::Opcode;
use crate::script::stack::{is_true, Stack};
use crate::script::token::Token;
use crate::script::tokenizer::parse_script;

/// Validates a Pay-to-Public-Key-Hash (P2PKH) script pair.
///
/// Executes `script_sig` (the unlocking script) on a fresh stack, then
/// executes `script_pubkey` (the locking script) on the resulting stack.
/// This two-phase model matches Bitcoin's actual execution behavior
/// (post-2010), preventing scriptSig from manipulating scriptPubKey's
/// control flow.
///
/// Returns `Ok(true)` if the combined execution succeeds (top stack
/// element is truthy after both phases).
///
/// OP_CHECKSIG has nothing to verify against without a sighash digest, so
/// it always fails here. Use [`validate_p2pkh_with_opts`] with a sighash
/// for scripts that reach OP_CHECKSIG.
///
/// Both arguments are raw script bytes (not hex). Use
/// [`crate::hex::decode_hex`] to convert hex strings first.
pub fn validate_p2pkh(script_sig: &[u8], script_pubkey: &[u8]) -> Result<bool, ScriptError> {
    validate_p2pkh_with_opts(script_sig, script_pubkey, &ExecuteOpts::default())
}

/// Validates a P2PKH script pair with execution options.
///
/// See [`validate_p2pkh`] for details. The `opts` parameter controls
/// OP_CHECKSIG behavior via [`ExecuteOpts::sighash`].
pub fn validate_p2pkh_with_opts(
    script_sig: &[u8],
    script_pubkey: &[u8],
    opts: &ExecuteOpts,
) -> Result<bool, ScriptError> {
    let sig_tokens = parse_script(script_sig)?;
    let pk_tokens = parse_script(script_pubkey)?;

    let mut stack = Stack::new();

    // Phase 1: execute scriptSig (pushes sig + pubkey onto stack)
    execute_on_stack(&sig_tokens, &mut stack, opts)?;

    // Phase 2: execute scriptPubKey on the resulting stack
    execute_on_stack(&pk_tokens, &mut stack, opts)?;

    // Final evaluation
    if stack.is_empty() {
        return Ok(false);
    }
    let top = stack.pop()?;
    Ok(is_true(&top))
}

/// The standard-form shapes a `scriptPubKey` can take, recognized by
/// pattern rather than by inferring intent from arbitrary opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    /// `OP_HASH160 <20-byte hash> OP_EQUAL`.
    P2sh([u8; 20]),
    /// `OP_0 <20-byte hash>`.
    P2wpkh([u8; 20]),
    /// `OP_0 <32-byte hash>`.
    P2wsh([u8; 32]),
    /// Anything else (P2PKH, bare multisig, OP_RETURN, ...), executed by
    /// the generic two-phase scriptSig/scriptPubKey path.
    Other,
}

/// Classifies a `scriptPubKey` by its standard-form shape. Falls back to
/// [`ScriptType::Other`] on a parse error, since an unrecognizable or
/// malformed script is never P2SH/P2WPKH/P2WSH.
pub fn classify(script_pubkey: &[u8]) -> ScriptType {
    let Ok(tokens) = parse_script(script_pubkey) else {
        return ScriptType::Other;
    };
    match tokens.as_slice() {
        [Token::Op(Opcode::OpHash160), Token::PushData(h), Token::Op(Opcode::OpEqual)] if h.len() == 20 => {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(h);
            ScriptType::P2sh(hash)
        }
        [Token::Op(Opcode::Op0), Token::PushData(h)] if h.len() == 20 => {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(h);
            ScriptType::P2wpkh(hash)
        }
        [Token::Op(Opcode::Op0), Token::PushData(h)] if h.len() == 32 => {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(h);
            ScriptType::P2wsh(hash)
        }
        _ => ScriptType::Other,
    }
}

/// The canonical P2PKH template a P2WPKH witness program's hash implies as
/// its `scriptCode` for both execution and the BIP143 sighash preimage:
/// `OP_DUP OP_HASH160 <hash160> OP_EQUALVERIFY OP_CHECKSIG`.
pub fn p2wpkh_script_code(hash160: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.push(Opcode::OpDup.to_byte());
    script.push(Opcode::OpHash160.to_byte());
    script.push(20);
    script.extend_from_slice(hash160);
    script.push(Opcode::OpEqualVerify.to_byte());
    script.push(Opcode::OpCheckSig.to_byte());
    script
}

/// Extracts the redeem script from a P2SH `scriptSig`: its last pushed
/// item, per BIP16.
pub fn redeem_script_of(script_sig: &[u8]) -> Result<Vec<u8>, ScriptError> {
    let tokens = parse_script(script_sig)?;
    match tokens.last() {
        Some(Token::PushData(data)) => Ok(data.clone()),
        _ => Err(ScriptError::InvalidPushData),
    }
}

/// Validates a P2SH script pair: executes `script_sig`, pops its last
/// item as the candidate redeem script, checks it hashes to
/// `expected_hash160`, then executes the redeem script against whatever
/// `script_sig` left beneath it.
///
/// Callers that need to dispatch a P2SH-wrapped segwit redeem script
/// (P2SH-P2WPKH/P2SH-P2WSH) should classify [`redeem_script_of`] first
/// and call [`validate_p2wpkh_with_opts`]/[`validate_p2wsh_with_opts`]
/// instead of this function.
pub fn validate_p2sh_with_opts(
    script_sig: &[u8],
    expected_hash160: &[u8; 20],
    opts: &ExecuteOpts,
) -> Result<bool, ScriptError> {
    let sig_tokens = parse_script(script_sig)?;
    let mut stack = Stack::new();
    execute_on_stack(&sig_tokens, &mut stack, opts)?;

    let redeem_script = stack.pop()?;
    if hash::hash160(&redeem_script) != *expected_hash160 {
        return Err(ScriptError::VerifyFailed);
    }

    let redeem_tokens = parse_script(&redeem_script)?;
    execute_on_stack(&redeem_tokens, &mut stack, opts)?;

    if stack.is_empty() {
        return Ok(false);
    }
    Ok(is_true(&stack.pop()?))
}

/// Validates a P2WPKH witness: exactly `[signature, pubkey]`, executed
/// against the canonical P2PKH template implied by `expected_hash160`
/// ([`p2wpkh_script_code`]).
pub fn validate_p2wpkh_with_opts(
    witness: &[Vec<u8>],
    expected_hash160: &[u8; 20],
    opts: &ExecuteOpts,
) -> Result<bool, ScriptError> {
    if witness.len() != 2 {
        return Err(ScriptError::StackUnderflow);
    }
    let tokens = parse_script(&p2wpkh_script_code(expected_hash160))?;
    let mut stack = Stack::new();
    stack.push(witness[0].clone());
    stack.push(witness[1].clone());
    execute_on_stack(&tokens, &mut stack, opts)?;

    if stack.is_empty() {
        return Ok(false);
    }
    Ok(is_true(&stack.pop()?))
}

/// Validates a P2WSH witness: its last item is the witness script, which
/// must hash (sha256, not hash160) to `expected_hash256`; the remaining
/// items are pushed as the initial stack before the witness script runs.
pub fn validate_p2wsh_with_opts(
    witness: &[Vec<u8>],
    expected_hash256: &[u8; 32],
    opts: &ExecuteOpts,
) -> Result<bool, ScriptError> {
    let witness_script = witness.last().ok_or(ScriptError::StackUnderflow)?;
    if hash::sha256(witness_script) != *expected_hash256 {
        return Err(ScriptError::VerifyFailed);
    }

    let tokens = parse_script(witness_script)?;
    let mut stack = Stack::new();
    for item in &witness[..witness.len() - 1] {
        stack.push(item.clone());
    }
    execute_on_stack(&tokens, &mut stack, opts)?;

    if stack.is_empty() {
        return Ok(false);
    }
    Ok(is_true(&stack.pop()?))
}
