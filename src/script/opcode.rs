/// A Bitcoin Script opcode supported by this engine.
///
/// This is a fieldless enum that maps 1:1 to protocol-defined byte values,
/// plus an [`Opcode::Unknown`] catch-all for reserved/disabled codes so the
/// tokenizer can still represent a script byte-for-byte even when the
/// engine refuses to execute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    // Constants
    Op0,
    Op1Negate,
    Op1,
    Op2,
    Op3,
    Op4,
    Op5,
    Op6,
    Op7,
    Op8,
    Op9,
    Op10,
    Op11,
    Op12,
    Op13,
    Op14,
    Op15,
    Op16,

    // Flow control
    OpNop,
    OpIf,
    OpNotIf,
    OpElse,
    OpEndIf,
    OpVerify,
    OpReturn,

    // Stack manipulation
    OpToAltStack,
    OpFromAltStack,
    Op2Drop,
    Op2Dup,
    Op3Dup,
    Op2Over,
    Op2Rot,
    Op2Swap,
    OpIfDup,
    OpDepth,
    OpDrop,
    OpDup,
    OpNip,
    OpOver,
    OpPick,
    OpRoll,
    OpRot,
    OpSwap,
    OpTuck,

    // Splice
    OpSize,

    // Bitwise logic
    OpEqual,
    OpEqualVerify,

    // Arithmetic
    Op1Add,
    Op1Sub,
    OpNegate,
    OpAbs,
    OpNot,
    Op0NotEqual,
    OpAdd,
    OpSub,
    OpBoolAnd,
    OpBoolOr,
    OpNumEqual,
    OpNumEqualVerify,
    OpNumNotEqual,
    OpLessThan,
    OpGreaterThan,
    OpLessThanOrEqual,
    OpGreaterThanOrEqual,
    OpMin,
    OpMax,
    OpWithin,

    // Crypto
    OpRipemd160,
    OpSha1,
    OpSha256,
    OpHash160,
    OpHash256,
    OpCodeSeparator,
    OpCheckSig,
    OpCheckSigVerify,
    OpCheckMultiSig,
    OpCheckMultiSigVerify,

    // Locktime
    OpCheckLockTimeVerify,
    OpCheckSequenceVerify,

    // Reserved / disabled / unimplemented, kept by byte value for display
    // and round-trip purposes. The engine refuses to execute these.
    Unknown(u8),
}

impl Opcode {
    /// Convert a byte to an `Opcode`. Push-data bytes (`0x01`-`0x4e`) are
    /// handled by the tokenizer, not here, and are never passed in.
    pub fn from_byte(byte: u8) -> Opcode {
        match byte {
            0x00 => Opcode::Op0,
            0x4f => Opcode::Op1Negate,
            0x51 => Opcode::Op1,
            0x52 => Opcode::Op2,
            0x53 => Opcode::Op3,
            0x54 => Opcode::Op4,
            0x55 => Opcode::Op5,
            0x56 => Opcode::Op6,
            0x57 => Opcode::Op7,
            0x58 => Opcode::Op8,
            0x59 => Opcode::Op9,
            0x5a => Opcode::Op10,
            0x5b => Opcode::Op11,
            0x5c => Opcode::Op12,
            0x5d => Opcode::Op13,
            0x5e => Opcode::Op14,
            0x5f => Opcode::Op15,
            0x60 => Opcode::Op16,
            0x61 => Opcode::OpNop,
            0x63 => Opcode::OpIf,
            0x64 => Opcode::OpNotIf,
            0x67 => Opcode::OpElse,
            0x68 => Opcode::OpEndIf,
            0x69 => Opcode::OpVerify,
            0x6a => Opcode::OpReturn,
            0x6b => Opcode::OpToAltStack,
            0x6c => Opcode::OpFromAltStack,
            0x6d => Opcode::Op2Drop,
            0x6e => Opcode::Op2Dup,
            0x6f => Opcode::Op3Dup,
            0x70 => Opcode::Op2Over,
            0x71 => Opcode::Op2Rot,
            0x72 => Opcode::Op2Swap,
            0x73 => Opcode::OpIfDup,
            0x74 => Opcode::OpDepth,
            0x75 => Opcode::OpDrop,
            0x76 => Opcode::OpDup,
            0x77 => Opcode::OpNip,
            0x78 => Opcode::OpOver,
            0x79 => Opcode::OpPick,
            0x7a => Opcode::OpRoll,
            0x7b => Opcode::OpRot,
            0x7c => Opcode::OpSwap,
            0x7d => Opcode::OpTuck,
            0x82 => Opcode::OpSize,
            0x87 => Opcode::OpEqual,
            0x88 => Opcode::OpEqualVerify,
            0x8b => Opcode::Op1Add,
            0x8c => Opcode::Op1Sub,
            0x8f => Opcode::OpNegate,
            0x90 => Opcode::OpAbs,
            0x91 => Opcode::OpNot,
            0x92 => Opcode::Op0NotEqual,
            0x93 => Opcode::OpAdd,
            0x94 => Opcode::OpSub,
            0x9a => Opcode::OpBoolAnd,
            0x9b => Opcode::OpBoolOr,
            0x9c => Opcode::OpNumEqual,
            0x9d => Opcode::OpNumEqualVerify,
            0x9e => Opcode::OpNumNotEqual,
            0x9f => Opcode::OpLessThan,
            0xa0 => Opcode::OpGreaterThan,
            0xa1 => Opcode::OpLessThanOrEqual,
            0xa2 => Opcode::OpGreaterThanOrEqual,
            0xa3 => Opcode::OpMin,
            0xa4 => Opcode::OpMax,
            0xa5 => Opcode::OpWithin,
            0xa6 => Opcode::OpRipemd160,
            0xa7 => Opcode::OpSha1,
            0xa8 => Opcode::OpSha256,
            0xa9 => Opcode::OpHash160,
            0xaa => Opcode::OpHash256,
            0xab => Opcode::OpCodeSeparator,
            0xac => Opcode::OpCheckSig,
            0xad => Opcode::OpCheckSigVerify,
            0xae => Opcode::OpCheckMultiSig,
            0xaf => Opcode::OpCheckMultiSigVerify,
            0xb1 => Opcode::OpCheckLockTimeVerify,
            0xb2 => Opcode::OpCheckSequenceVerify,
            other => Opcode::Unknown(other),
        }
    }

    /// Convert an `Opcode` back to its canonical byte value.
    pub fn to_byte(self) -> u8 {
        match self {
            Opcode::Op0 => 0x00,
            Opcode::Op1Negate => 0x4f,
            Opcode::Op1 => 0x51,
            Opcode::Op2 => 0x52,
            Opcode::Op3 => 0x53,
            Opcode::Op4 => 0x54,
            Opcode::Op5 => 0x55,
            Opcode::Op6 => 0x56,
            Opcode::Op7 => 0x57,
            Opcode::Op8 => 0x58,
            Opcode::Op9 => 0x59,
            Opcode::Op10 => 0x5a,
            Opcode::Op11 => 0x5b,
            Opcode::Op12 => 0x5c,
            Opcode::Op13 => 0x5d,
            Opcode::Op14 => 0x5e,
            Opcode::Op15 => 0x5f,
            Opcode::Op16 => 0x60,
            Opcode::OpNop => 0x61,
            Opcode::OpIf => 0x63,
            Opcode::OpNotIf => 0x64,
            Opcode::OpElse => 0x67,
            Opcode::OpEndIf => 0x68,
            Opcode::OpVerify => 0x69,
            Opcode::OpReturn => 0x6a,
            Opcode::OpToAltStack => 0x6b,
            Opcode::OpFromAltStack => 0x6c,
            Opcode::Op2Drop => 0x6d,
            Opcode::Op2Dup => 0x6e,
            Opcode::Op3Dup => 0x6f,
            Opcode::Op2Over => 0x70,
            Opcode::Op2Rot => 0x71,
            Opcode::Op2Swap => 0x72,
            Opcode::OpIfDup => 0x73,
            Opcode::OpDepth => 0x74,
            Opcode::OpDrop => 0x75,
            Opcode::OpDup => 0x76,
            Opcode::OpNip => 0x77,
            Opcode::OpOver => 0x78,
            Opcode::OpPick => 0x79,
            Opcode::OpRoll => 0x7a,
            Opcode::OpRot => 0x7b,
            Opcode::OpSwap => 0x7c,
            Opcode::OpTuck => 0x7d,
            Opcode::OpSize => 0x82,
            Opcode::OpEqual => 0x87,
            Opcode::OpEqualVerify => 0x88,
            Opcode::Op1Add => 0x8b,
            Opcode::Op1Sub => 0x8c,
            Opcode::OpNegate => 0x8f,
            Opcode::OpAbs => 0x90,
            Opcode::OpNot => 0x91,
            Opcode::Op0NotEqual => 0x92,
            Opcode::OpAdd => 0x93,
            Opcode::OpSub => 0x94,
            Opcode::OpBoolAnd => 0x9a,
            Opcode::OpBoolOr => 0x9b,
            Opcode::OpNumEqual => 0x9c,
            Opcode::OpNumEqualVerify => 0x9d,
            Opcode::OpNumNotEqual => 0x9e,
            Opcode::OpLessThan => 0x9f,
            Opcode::OpGreaterThan => 0xa0,
            Opcode::OpLessThanOrEqual => 0xa1,
            Opcode::OpGreaterThanOrEqual => 0xa2,
            Opcode::OpMin => 0xa3,
            Opcode::OpMax => 0xa4,
            Opcode::OpWithin => 0xa5,
            Opcode::OpRipemd160 => 0xa6,
            Opcode::OpSha1 => 0xa7,
            Opcode::OpSha256 => 0xa8,
            Opcode::OpHash160 => 0xa9,
            Opcode::OpHash256 => 0xaa,
            Opcode::OpCodeSeparator => 0xab,
            Opcode::OpCheckSig => 0xac,
            Opcode::OpCheckSigVerify => 0xad,
            Opcode::OpCheckMultiSig => 0xae,
            Opcode::OpCheckMultiSigVerify => 0xaf,
            Opcode::OpCheckLockTimeVerify => 0xb1,
            Opcode::OpCheckSequenceVerify => 0xb2,
            Opcode::Unknown(byte) => byte,
        }
    }

    /// True for the `OP_1`..`OP_16` small-integer push opcodes.
    pub fn small_int(self) -> Option<u8> {
        let byte = self.to_byte();
        match self {
            Opcode::Op1
            | Opcode::Op2
            | Opcode::Op3
            | Opcode::Op4
            | Opcode::Op5
            | Opcode::Op6
            | Opcode::Op7
            | Opcode::Op8
            | Opcode::Op9
            | Opcode::Op10
            | Opcode::Op11
            | Opcode::Op12
            | Opcode::Op13
            | Opcode::Op14
            | Opcode::Op15
            | Opcode::Op16 => Some(byte - 0x50),
            _ => None,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Opcode::Op0 => "OP_0",
            Opcode::Op1Negate => "OP_1NEGATE",
            Opcode::Op1 => "OP_1",
            Opcode::Op2 => "OP_2",
            Opcode::Op3 => "OP_3",
            Opcode::Op4 => "OP_4",
            Opcode::Op5 => "OP_5",
            Opcode::Op6 => "OP_6",
            Opcode::Op7 => "OP_7",
            Opcode::Op8 => "OP_8",
            Opcode::Op9 => "OP_9",
            Opcode::Op10 => "OP_10",
            Opcode::Op11 => "OP_11",
            Opcode::Op12 => "OP_12",
            Opcode::Op13 => "OP_13",
            Opcode::Op14 => "OP_14",
            Opcode::Op15 => "OP_15",
            Opcode::Op16 => "OP_16",
            Opcode::OpNop => "OP_NOP",
            Opcode::OpIf => "OP_IF",
            Opcode::OpNotIf => "OP_NOTIF",
            Opcode::OpElse => "OP_ELSE",
            Opcode::OpEndIf => "OP_ENDIF",
            Opcode::OpVerify => "OP_VERIFY",
            Opcode::OpReturn => "OP_RETURN",
            Opcode::OpToAltStack => "OP_TOALTSTACK",
            Opcode::OpFromAltStack => "OP_FROMALTSTACK",
            Opcode::Op2Drop => "OP_2DROP",
            Opcode::Op2Dup => "OP_2DUP",
            Opcode::Op3Dup => "OP_3DUP",
            Opcode::Op2Over => "OP_2OVER",
            Opcode::Op2Rot => "OP_2ROT",
            Opcode::Op2Swap => "OP_2SWAP",
            Opcode::OpIfDup => "OP_IFDUP",
            Opcode::OpDepth => "OP_DEPTH",
            Opcode::OpDrop => "OP_DROP",
            Opcode::OpDup => "OP_DUP",
            Opcode::OpNip => "OP_NIP",
            Opcode::OpOver => "OP_OVER",
            Opcode::OpPick => "OP_PICK",
            Opcode::OpRoll => "OP_ROLL",
            Opcode::OpRot => "OP_ROT",
            Opcode::OpSwap => "OP_SWAP",
            Opcode::OpTuck => "OP_TUCK",
            Opcode::OpSize => "OP_SIZE",
            Opcode::OpEqual => "OP_EQUAL",
            Opcode::OpEqualVerify => "OP_EQUALVERIFY",
            Opcode::Op1Add => "OP_1ADD",
            Opcode::Op1Sub => "OP_1SUB",
            Opcode::OpNegate => "OP_NEGATE",
            Opcode::OpAbs => "OP_ABS",
            Opcode::OpNot => "OP_NOT",
            Opcode::Op0NotEqual => "OP_0NOTEQUAL",
            Opcode::OpAdd => "OP_ADD",
            Opcode::OpSub => "OP_SUB",
            Opcode::OpBoolAnd => "OP_BOOLAND",
            Opcode::OpBoolOr => "OP_BOOLOR",
            Opcode::OpNumEqual => "OP_NUMEQUAL",
            Opcode::OpNumEqualVerify => "OP_NUMEQUALVERIFY",
            Opcode::OpNumNotEqual => "OP_NUMNOTEQUAL",
            Opcode::OpLessThan => "OP_LESSTHAN",
            Opcode::OpGreaterThan => "OP_GREATERTHAN",
            Opcode::OpLessThanOrEqual => "OP_LESSTHANOREQUAL",
            Opcode::OpGreaterThanOrEqual => "OP_GREATERTHANOREQUAL",
            Opcode::OpMin => "OP_MIN",
            Opcode::OpMax => "OP_MAX",
            Opcode::OpWithin => "OP_WITHIN",
            Opcode::OpRipemd160 => "OP_RIPEMD160",
            Opcode::OpSha1 => "OP_SHA1",
            Opcode::OpSha256 => "OP_SHA256",
            Opcode::OpHash160 => "OP_HASH160",
            Opcode::OpHash256 => "OP_HASH256",
            Opcode::OpCodeSeparator => "OP_CODESEPARATOR",
            Opcode::OpCheckSig => "OP_CHECKSIG",
            Opcode::OpCheckSigVerify => "OP_CHECKSIGVERIFY",
            Opcode::OpCheckMultiSig => "OP_CHECKMULTISIG",
            Opcode::OpCheckMultiSigVerify => "OP_CHECKMULTISIGVERIFY",
            Opcode::OpCheckLockTimeVerify => "OP_CHECKLOCKTIMEVERIFY",
            Opcode::OpCheckSequenceVerify => "OP_CHECKSEQUENCEVERIFY",
            Opcode::Unknown(byte) => return write!(f, "OP_UNKNOWN(0x{byte:02x})"),
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_OPCODES: &[Opcode] = &[
        Opcode::Op0,
        Opcode::Op1Negate,
        Opcode::Op1,
        Opcode::Op16,
        Opcode::OpNop,
        Opcode::OpIf,
        Opcode::OpNotIf,
        Opcode::OpElse,
        Opcode::OpEndIf,
        Opcode::OpVerify,
        Opcode::OpReturn,
        Opcode::OpToAltStack,
        Opcode::OpFromAltStack,
        Opcode::Op2Drop,
        Opcode::Op2Dup,
        Opcode::Op3Dup,
        Opcode::Op2Over,
        Opcode::Op2Rot,
        Opcode::Op2Swap,
        Opcode::OpIfDup,
        Opcode::OpDepth,
        Opcode::OpDrop,
        Opcode::OpDup,
        Opcode::OpNip,
        Opcode::OpOver,
        Opcode::OpPick,
        Opcode::OpRoll,
        Opcode::OpRot,
        Opcode::OpSwap,
        Opcode::OpTuck,
        Opcode::OpSize,
        Opcode::OpEqual,
        Opcode::OpEqualVerify,
        Opcode::Op1Add,
        Opcode::Op1Sub,
        Opcode::OpNegate,
        Opcode::OpAbs,
        Opcode::OpNot,
        Opcode::Op0NotEqual,
        Opcode::OpAdd,
        Opcode::OpSub,
        Opcode::OpBoolAnd,
        Opcode::OpBoolOr,
        Opcode::OpNumEqual,
        Opcode::OpNumEqualVerify,
        Opcode::OpNumNotEqual,
        Opcode::OpLessThan,
        Opcode::OpGreaterThan,
        Opcode::OpLessThanOrEqual,
        Opcode::OpGreaterThanOrEqual,
        Opcode::OpMin,
        Opcode::OpMax,
        Opcode::OpWithin,
        Opcode::OpRipemd160,
        Opcode::OpSha1,
        Opcode::OpSha256,
        Opcode::OpHash160,
        Opcode::OpHash256,
        Opcode::OpCodeSeparator,
        Opcode::OpCheckSig,
        Opcode::OpCheckSigVerify,
        Opcode::OpCheckMultiSig,
        Opcode::OpCheckMultiSigVerify,
        Opcode::OpCheckLockTimeVerify,
        Opcode::OpCheckSequenceVerify,
    ];

    #[test]
    fn roundtrip_all_opcodes() {
        for opcode in KNOWN_OPCODES {
            let byte = opcode.to_byte();
            let recovered = Opcode::from_byte(byte);
            assert_eq!(recovered, *opcode, "roundtrip failed for {opcode}");
        }
    }

    #[test]
    fn push_data_bytes_are_not_known_opcodes() {
        for byte in 0x01..=0x4eu8 {
            assert!(matches!(Opcode::from_byte(byte), Opcode::Unknown(_)));
        }
    }

    #[test]
    fn reserved_bytes_become_unknown() {
        assert_eq!(Opcode::from_byte(0x50), Opcode::Unknown(0x50)); // OP_RESERVED
        assert_eq!(Opcode::from_byte(0xb0), Opcode::Unknown(0xb0));
        assert_eq!(Opcode::from_byte(0xff), Opcode::Unknown(0xff));
    }

    #[test]
    fn small_int_extracts_pushed_value() {
        assert_eq!(Opcode::Op1.small_int(), Some(1));
        assert_eq!(Opcode::Op16.small_int(), Some(16));
        assert_eq!(Opcode::Op0.small_int(), None);
    }

    #[test]
    fn display_formatting() {
        assert_eq!(format!("{}", Opcode::OpDup), "OP_DUP");
        assert_eq!(format!("{}", Opcode::OpHash160), "OP_HASH160");
        assert_eq!(format!("{}", Opcode::Op0), "OP_0");
        assert_eq!(format!("{}", Opcode::OpCheckMultiSig), "OP_CHECKMULTISIG");
        assert_eq!(format!("{}", Opcode::Unknown(0xb0)), "OP_UNKNOWN(0xb0)");
    }
}
