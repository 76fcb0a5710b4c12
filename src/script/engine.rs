use crate::bigint::Int;
use crate::hash;
use crate::script::error::ScriptError;
use crate::script::opcode::Opcode;
use crate::script::stack::{is_true, Stack};
use crate::script::token::Token;
use crate::secp256k1;
use crate::signature::Signature;

/// Options for script execution.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOpts {
    /// The sighash digest OP_CHECKSIG/OP_CHECKMULTISIG verify against.
    ///
    /// `None` means no signature checks can succeed (there is nothing to
    /// verify against), which is the correct behavior when a caller just
    /// wants to exercise non-signature opcodes.
    pub sighash: Option<[u8; 32]>,
}

/// Executes a sequence of tokens on a fresh stack.
///
/// Returns `Ok(true)` if the script succeeds (top stack element is truthy).
/// Returns `Ok(false)` if the stack is empty or the top element is falsy.
pub fn execute(tokens: &[Token]) -> Result<bool, ScriptError> {
    execute_with_opts(tokens, &ExecuteOpts::default())
}

/// Executes a sequence of tokens with configuration options.
pub fn execute_with_opts(tokens: &[Token], opts: &ExecuteOpts) -> Result<bool, ScriptError> {
    let mut stack = Stack::new();
    execute_on_stack(tokens, &mut stack, opts)?;

    if stack.is_empty() {
        return Ok(false);
    }
    let top = stack.pop()?;
    Ok(is_true(&top))
}

/// Executes tokens on an existing stack.
///
/// Used by [`crate::script::validate_p2pkh`] for two-phase execution where
/// the scriptSig runs first, then the scriptPubKey runs on the same stack.
pub(crate) fn execute_on_stack(
    tokens: &[Token],
    stack: &mut Stack,
    opts: &ExecuteOpts,
) -> Result<(), ScriptError> {
    let mut exec_stack: Vec<bool> = Vec::new();
    let mut alt_stack: Vec<Vec<u8>> = Vec::new();

    for token in tokens {
        let executing = is_executing(&exec_stack);

        match token {
            // ── Conditional flow control (always processed) ──────────
            Token::Op(Opcode::OpIf) => {
                if executing {
                    let val = stack.pop()?;
                    exec_stack.push(is_true(&val));
                } else {
                    exec_stack.push(false);
                }
            }
            Token::Op(Opcode::OpNotIf) => {
                if executing {
                    let val = stack.pop()?;
                    exec_stack.push(!is_true(&val));
                } else {
                    exec_stack.push(false);
                }
            }
            Token::Op(Opcode::OpElse) => {
                let top = exec_stack
                    .last_mut()
                    .ok_or(ScriptError::UnbalancedConditional)?;
                *top = !*top;
            }
            Token::Op(Opcode::OpEndIf) => {
                if exec_stack.pop().is_none() {
                    return Err(ScriptError::UnbalancedConditional);
                }
            }

            // ── Skip everything else when not executing ──────────────
            _ if !executing => continue,

            // ── PushData ─────────────────────────────────────────────
            Token::PushData(data) => {
                stack.push(data.clone());
            }

            // ── Constants ────────────────────────────────────────────
            Token::Op(Opcode::Op0) => stack.push(vec![]),
            Token::Op(Opcode::Op1Negate) => stack.push(encode_num(-1)),
            Token::Op(opcode) if opcode.small_int().is_some() => {
                let n = opcode.small_int().expect("checked above");
                stack.push(encode_num(n as i64));
            }

            // ── Flow control ─────────────────────────────────────────
            Token::Op(Opcode::OpNop) => {}
            Token::Op(Opcode::OpVerify) => {
                let val = stack.pop()?;
                if !is_true(&val) {
                    return Err(ScriptError::VerifyFailed);
                }
            }
            Token::Op(Opcode::OpReturn) => {
                return Err(ScriptError::OpReturnEncountered);
            }

            // ── Stack manipulation ───────────────────────────────────
            Token::Op(Opcode::OpToAltStack) => {
                alt_stack.push(stack.pop()?);
            }
            Token::Op(Opcode::OpFromAltStack) => {
                let val = alt_stack.pop().ok_or(ScriptError::StackUnderflow)?;
                stack.push(val);
            }
            Token::Op(Opcode::OpDup) => {
                let top = stack.peek()?.to_vec();
                stack.push(top);
            }
            Token::Op(Opcode::OpIfDup) => {
                let top = stack.peek()?.to_vec();
                if is_true(&top) {
                    stack.push(top);
                }
            }
            Token::Op(Opcode::OpDrop) => {
                stack.pop()?;
            }
            Token::Op(Opcode::Op2Dup) => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(a.clone());
                stack.push(b.clone());
                stack.push(a);
                stack.push(b);
            }
            Token::Op(Opcode::Op3Dup) => {
                let c = stack.pop()?;
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(a.clone());
                stack.push(b.clone());
                stack.push(c.clone());
                stack.push(a);
                stack.push(b);
                stack.push(c);
            }
            Token::Op(Opcode::Op2Drop) => {
                stack.pop()?;
                stack.pop()?;
            }
            Token::Op(Opcode::Op2Over) => {
                if stack.len() < 4 {
                    return Err(ScriptError::StackUnderflow);
                }
                let a = stack.items_from_top(4).to_vec();
                let b = stack.items_from_top(3).to_vec();
                stack.push(a);
                stack.push(b);
            }
            Token::Op(Opcode::Op2Rot) => {
                if stack.len() < 6 {
                    return Err(ScriptError::StackUnderflow);
                }
                let f = stack.pop()?;
                let e = stack.pop()?;
                let d = stack.pop()?;
                let c = stack.pop()?;
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(c);
                stack.push(d);
                stack.push(e);
                stack.push(f);
                stack.push(a);
                stack.push(b);
            }
            Token::Op(Opcode::Op2Swap) => {
                if stack.len() < 4 {
                    return Err(ScriptError::StackUnderflow);
                }
                let d = stack.pop()?;
                let c = stack.pop()?;
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(c);
                stack.push(d);
                stack.push(a);
                stack.push(b);
            }
            Token::Op(Opcode::OpNip) => {
                if stack.len() < 2 {
                    return Err(ScriptError::StackUnderflow);
                }
                stack.remove(stack.len() - 2)?;
            }
            Token::Op(Opcode::OpOver) => {
                if stack.len() < 2 {
                    return Err(ScriptError::StackUnderflow);
                }
                let second = stack.pop()?;
                let first = stack.peek()?.to_vec();
                stack.push(second);
                stack.push(first);
            }
            Token::Op(Opcode::OpPick) => {
                let n = decode_num(&stack.pop()?) as usize;
                if n >= stack.len() {
                    return Err(ScriptError::StackUnderflow);
                }
                let item = stack.items_from_top(n + 1).to_vec();
                stack.push(item);
            }
            Token::Op(Opcode::OpRoll) => {
                let n = decode_num(&stack.pop()?) as usize;
                if n >= stack.len() {
                    return Err(ScriptError::StackUnderflow);
                }
                let item = stack.remove(stack.len() - 1 - n)?;
                stack.push(item);
            }
            Token::Op(Opcode::OpRot) => {
                if stack.len() < 3 {
                    return Err(ScriptError::StackUnderflow);
                }
                let item = stack.remove(stack.len() - 3)?;
                stack.push(item);
            }
            Token::Op(Opcode::OpSwap) => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(b);
                stack.push(a);
            }
            Token::Op(Opcode::OpTuck) => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(b.clone());
                stack.push(a);
                stack.push(b);
            }
            Token::Op(Opcode::OpDepth) => {
                let depth = stack.len();
                stack.push(encode_num(depth as i64));
            }
            Token::Op(Opcode::OpSize) => {
                let top = stack.peek()?;
                let size = top.len();
                stack.push(encode_num(size as i64));
            }

            // ── Comparison ───────────────────────────────────────────
            Token::Op(Opcode::OpEqual) => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push_bool(a == b);
            }
            Token::Op(Opcode::OpEqualVerify) => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                if a != b {
                    return Err(ScriptError::VerifyFailed);
                }
            }

            // ── Arithmetic ───────────────────────────────────────────
            Token::Op(Opcode::Op1Add) => {
                let a = decode_num(&stack.pop()?);
                stack.push(encode_num(a + 1));
            }
            Token::Op(Opcode::Op1Sub) => {
                let a = decode_num(&stack.pop()?);
                stack.push(encode_num(a - 1));
            }
            Token::Op(Opcode::OpNegate) => {
                let a = decode_num(&stack.pop()?);
                stack.push(encode_num(-a));
            }
            Token::Op(Opcode::OpAbs) => {
                let a = decode_num(&stack.pop()?);
                stack.push(encode_num(a.abs()));
            }
            Token::Op(Opcode::OpNot) => {
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a == 0);
            }
            Token::Op(Opcode::Op0NotEqual) => {
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a != 0);
            }
            Token::Op(Opcode::OpAdd) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push(encode_num(a + b));
            }
            Token::Op(Opcode::OpSub) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push(encode_num(a - b));
            }
            Token::Op(Opcode::OpBoolAnd) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a != 0 && b != 0);
            }
            Token::Op(Opcode::OpBoolOr) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a != 0 || b != 0);
            }
            Token::Op(Opcode::OpNumEqual) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a == b);
            }
            Token::Op(Opcode::OpNumEqualVerify) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                if a != b {
                    return Err(ScriptError::VerifyFailed);
                }
            }
            Token::Op(Opcode::OpNumNotEqual) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a != b);
            }
            Token::Op(Opcode::OpLessThan) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a < b);
            }
            Token::Op(Opcode::OpGreaterThan) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a > b);
            }
            Token::Op(Opcode::OpLessThanOrEqual) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a <= b);
            }
            Token::Op(Opcode::OpGreaterThanOrEqual) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push_bool(a >= b);
            }
            Token::Op(Opcode::OpMin) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push(encode_num(a.min(b)));
            }
            Token::Op(Opcode::OpMax) => {
                let b = decode_num(&stack.pop()?);
                let a = decode_num(&stack.pop()?);
                stack.push(encode_num(a.max(b)));
            }
            Token::Op(Opcode::OpWithin) => {
                let max = decode_num(&stack.pop()?);
                let min = decode_num(&stack.pop()?);
                let x = decode_num(&stack.pop()?);
                stack.push_bool(x >= min && x < max);
            }

            // ── Crypto ───────────────────────────────────────────────
            Token::Op(Opcode::OpRipemd160) => {
                let data = stack.pop()?;
                stack.push(hash::ripemd160(&data).to_vec());
            }
            Token::Op(Opcode::OpSha1) => {
                let data = stack.pop()?;
                stack.push(hash::sha1(&data).to_vec());
            }
            Token::Op(Opcode::OpSha256) => {
                let data = stack.pop()?;
                stack.push(hash::sha256(&data).to_vec());
            }
            Token::Op(Opcode::OpHash160) => {
                let data = stack.pop()?;
                stack.push(hash::hash160(&data).to_vec());
            }
            Token::Op(Opcode::OpHash256) => {
                let data = stack.pop()?;
                stack.push(hash::hash256(&data).to_vec());
            }
            Token::Op(Opcode::OpCodeSeparator) => {}
            Token::Op(Opcode::OpCheckSig) => {
                let result = checksig(stack, opts)?;
                stack.push_bool(result);
            }
            Token::Op(Opcode::OpCheckSigVerify) => {
                let result = checksig(stack, opts)?;
                if !result {
                    return Err(ScriptError::VerifyFailed);
                }
            }
            Token::Op(Opcode::OpCheckMultiSig) => {
                let result = check_multisig(stack, opts)?;
                stack.push_bool(result);
            }
            Token::Op(Opcode::OpCheckMultiSigVerify) => {
                let result = check_multisig(stack, opts)?;
                if !result {
                    return Err(ScriptError::VerifyFailed);
                }
            }

            // ── Locktime (no-ops: this engine does not track a
            // transaction context to compare against) ────────────────
            Token::Op(Opcode::OpCheckLockTimeVerify) => {}
            Token::Op(Opcode::OpCheckSequenceVerify) => {}

            Token::Op(Opcode::Unknown(b)) => {
                return Err(ScriptError::UnsupportedOpcode(*b));
            }

            Token::Op(_) => unreachable!("every opcode variant is handled above"),
        }
    }

    if !exec_stack.is_empty() {
        return Err(ScriptError::UnbalancedConditional);
    }

    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Returns `true` if the execution stack indicates we are in an executing branch.
fn is_executing(exec_stack: &[bool]) -> bool {
    exec_stack.iter().all(|&v| v)
}

/// Encodes a signed integer as a minimal Bitcoin Script number.
///
/// Never mutates input (there is none to mutate) and always returns a
/// freshly allocated vector, matching the reference `encodeNum` contract.
pub(crate) fn encode_num(n: i64) -> Vec<u8> {
    if n == 0 {
        return vec![];
    }

    let negative = n < 0;
    let mut abs = if negative { n.unsigned_abs() } else { n as u64 };
    let mut result = Vec::new();

    while abs > 0 {
        result.push((abs & 0xff) as u8);
        abs >>= 8;
    }

    if result.last().map_or(false, |&b| b & 0x80 != 0) {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        let len = result.len();
        result[len - 1] |= 0x80;
    }

    result
}

/// Decodes a minimal Bitcoin Script number into a signed integer.
///
/// Does not mutate `bytes`; returns `0` for an empty slice, matching the
/// empty-vector encoding of zero.
pub(crate) fn decode_num(bytes: &[u8]) -> i64 {
    if bytes.is_empty() {
        return 0;
    }
    let negative = bytes[bytes.len() - 1] & 0x80 != 0;
    let mut magnitude: i64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let byte = if i == bytes.len() - 1 { byte & 0x7f } else { byte };
        magnitude |= (byte as i64) << (8 * i);
    }
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// `OP_CHECKSIG`: pops pubkey then signature, verifies the signature (DER
/// plus a trailing sighash-type byte) against the execution sighash.
fn checksig(stack: &mut Stack, opts: &ExecuteOpts) -> Result<bool, ScriptError> {
    let pubkey = stack.pop()?;
    let sig = stack.pop()?;
    Ok(verify_signature(&sig, &pubkey, opts))
}

fn verify_signature(sig_bytes: &[u8], pubkey_bytes: &[u8], opts: &ExecuteOpts) -> bool {
    let Some(sighash) = opts.sighash else {
        return false;
    };
    if sig_bytes.is_empty() {
        return false;
    }
    let der_sig = &sig_bytes[..sig_bytes.len() - 1];
    let signature = match Signature::from_der(der_sig) {
        Ok(s) => s,
        Err(_) => return false,
    };
    let point = match secp256k1::parse_sec(pubkey_bytes) {
        Ok(p) => p,
        Err(_) => return false,
    };
    let z: Int = crate::bigint::from_be_bytes(&sighash);
    signature.verify(&point, &z)
}

/// `OP_CHECKMULTISIG` / `OP_CHECKMULTISIGVERIFY`: pops `n` pubkeys, `m`
/// signatures, and one extra element consumed by the historical
/// off-by-one bug in the reference implementation, which this engine
/// reproduces for compatibility since it cannot be fixed without a
/// consensus rule change.
fn check_multisig(stack: &mut Stack, opts: &ExecuteOpts) -> Result<bool, ScriptError> {
    let n = decode_num(&stack.pop()?);
    if n < 0 || n > 20 {
        return Err(ScriptError::InvalidPushData);
    }
    let mut pubkeys = Vec::with_capacity(n as usize);
    for _ in 0..n {
        pubkeys.push(stack.pop()?);
    }
    let m = decode_num(&stack.pop()?);
    if m < 0 || m > n {
        return Err(ScriptError::InvalidPushData);
    }
    let mut sigs = Vec::with_capacity(m as usize);
    for _ in 0..m {
        sigs.push(stack.pop()?);
    }
    // The off-by-one bug: one extra stack item is popped and discarded.
    stack.pop()?;

    let mut pubkey_idx = 0;
    for sig in &sigs {
        let mut matched = false;
        while pubkey_idx < pubkeys.len() {
            let pubkey = &pubkeys[pubkey_idx];
            pubkey_idx += 1;
            if verify_signature(sig, pubkey, opts) {
                matched = true;
                break;
            }
        }
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}
