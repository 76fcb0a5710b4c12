//! Crate-wide error taxonomy.
//!
//! Each component that can fail defines its own focused error enum
//! ([`crate::script::error::ScriptError`], [`CryptoError`], [`ParseError`],
//! [`ResolverError`]) so a caller that only cares about, say, DER parsing
//! doesn't have to match on script-evaluation variants it'll never see.
//! [`Error`] composes all of them via `From` so call sites that just want
//! to propagate with `?` can do so without picking a variant by hand.

use std::fmt;

use crate::script::error::ScriptError;

/// Failure decoding a length-prefixed or fixed-width wire structure
/// (transactions, block headers, P2P messages).
///
/// `offset` is the byte position within the input stream at which the
/// failure was detected, so callers can report where a malformed message
/// went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedEof,
    BadMagic { expected: u32, found: u32 },
    BadChecksum { expected: [u8; 4], found: [u8; 4] },
    BadSegwitMarker,
    TrailingBytes,
    BadTransactionCountTrailer,
    InvalidVarInt,
    InvalidLength,
}

impl ParseError {
    pub fn new(offset: usize, kind: ParseErrorKind) -> Self {
        ParseError { offset, kind }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at offset {}: {:?}", self.offset, self.kind)
    }
}

impl std::error::Error for ParseError {}

/// Failure decoding or validating a cryptographic encoding: SEC public
/// keys, DER signatures, or an ECDSA verification mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    InvalidSec,
    InvalidDer,
    PointNotOnCurve,
    VerificationFailed,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidSec => write!(f, "malformed SEC public key encoding"),
            CryptoError::InvalidDer => write!(f, "malformed DER signature encoding"),
            CryptoError::PointNotOnCurve => write!(f, "decoded point is not on the curve"),
            CryptoError::VerificationFailed => write!(f, "signature verification failed"),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Failure fetching a previous transaction from the injected resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverError(pub String);

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "previous-transaction resolver failure: {}", self.0)
    }
}

impl std::error::Error for ResolverError {}

/// The union of every error this crate's public API can return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Parse(ParseError),
    Crypto(CryptoError),
    Script(ScriptError),
    Resolver(ResolverError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Crypto(e) => write!(f, "{e}"),
            Error::Script(e) => write!(f, "{e}"),
            Error::Resolver(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Error::Crypto(e)
    }
}

impl From<ScriptError> for Error {
    fn from(e: ScriptError) -> Self {
        Error::Script(e)
    }
}

impl From<ResolverError> for Error {
    fn from(e: ResolverError) -> Self {
        Error::Resolver(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_displays_offset() {
        let e = ParseError::new(42, ParseErrorKind::UnexpectedEof);
        assert!(e.to_string().contains("42"));
    }

    #[test]
    fn from_impls_compose_into_error() {
        let e: Error = CryptoError::InvalidDer.into();
        assert!(matches!(e, Error::Crypto(CryptoError::InvalidDer)));
    }
}
