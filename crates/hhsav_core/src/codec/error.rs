//! Decode and encode error types.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reason a byte buffer could not become a `Document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Input is shorter than the smallest valid container.
    Truncated,
    /// Container magic bytes are wrong.
    BadMagic,
    /// Container compression method is not the supported one.
    UnsupportedVersion(u8),
    /// Inflate, checksum or trailer failure reported by the container layer.
    Container(String),
    /// Trailer length does not match the inflated payload.
    LengthMismatch { declared: u32, actual: u32 },
    InvalidUtf8,
    UnexpectedEof,
    UnexpectedByte(u8),
    InvalidNumber,
    InvalidEscape,
    LoneSurrogate,
    ControlCharacter,
    DuplicateKey(String),
    TooDeep,
    TrailingData,
    /// Top-level value is not a keyed structure.
    NotAnObject,
}

/// Decode failure with an optional byte offset into the input.
///
/// Offsets for container payload errors are relative to the inflated
/// payload, not to the compressed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    offset: Option<usize>,
}

impl DecodeError {
    pub(crate) fn new(kind: DecodeErrorKind, offset: Option<usize>) -> Self {
        Self { kind, offset }
    }

    pub(crate) fn at(kind: DecodeErrorKind, offset: usize) -> Self {
        Self::new(kind, Some(offset))
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DecodeErrorKind::Truncated => write!(f, "input too short to be a save container"),
            DecodeErrorKind::BadMagic => write!(f, "not a save container (bad magic bytes)"),
            DecodeErrorKind::UnsupportedVersion(method) => {
                write!(f, "unsupported container method {method}")
            }
            DecodeErrorKind::Container(cause) => write!(f, "corrupt container: {cause}"),
            DecodeErrorKind::LengthMismatch { declared, actual } => write!(
                f,
                "container declares {declared} payload bytes but holds {actual}"
            ),
            DecodeErrorKind::InvalidUtf8 => write!(f, "payload is not valid UTF-8"),
            DecodeErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            DecodeErrorKind::UnexpectedByte(byte) => {
                write!(f, "unexpected byte 0x{byte:02x}")
            }
            DecodeErrorKind::InvalidNumber => write!(f, "invalid number"),
            DecodeErrorKind::InvalidEscape => write!(f, "invalid string escape"),
            DecodeErrorKind::LoneSurrogate => write!(f, "unpaired UTF-16 surrogate escape"),
            DecodeErrorKind::ControlCharacter => {
                write!(f, "unescaped control character in string")
            }
            DecodeErrorKind::DuplicateKey(key) => write!(f, "duplicate key `{key}`"),
            DecodeErrorKind::TooDeep => write!(f, "nesting too deep"),
            DecodeErrorKind::TrailingData => write!(f, "trailing data after document"),
            DecodeErrorKind::NotAnObject => write!(f, "top-level value is not an object"),
        }?;
        if let Some(offset) = self.offset {
            write!(f, " at byte {offset}")?;
        }
        Ok(())
    }
}

impl Error for DecodeError {}

/// Reason a `Document` could not be written in a target format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// NaN and infinities have no representation in the save grammar.
    NonFiniteFloat { path: String },
    /// Nesting the reader would refuse under the same limit.
    TooDeep { path: String, max_depth: usize },
    Serialize(String),
    Io(String),
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteFloat { path } => {
                write!(f, "non-finite number at `{path}` cannot be encoded")
            }
            Self::TooDeep { path, max_depth } => {
                write!(f, "value at `{path}` nests deeper than {max_depth} levels")
            }
            Self::Serialize(cause) => write!(f, "serialization failed: {cause}"),
            Self::Io(cause) => write!(f, "container write failed: {cause}"),
        }
    }
}

impl Error for EncodeError {}

impl From<serde_json::Error> for EncodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
