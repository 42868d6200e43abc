//! Dual-format serialization engine.
//!
//! # Responsibility
//! - Decode container or interchange bytes into a `Document`.
//! - Encode a `Document` into either format, deterministically.
//!
//! # Invariants
//! - `decode(encode(d, f), f) == d` for every document this crate produces.
//! - A failed encode returns no bytes at all.

pub mod container;
pub mod error;
pub mod reader;
pub mod writer;

use crate::model::document::Document;
use crate::model::node::Node;
use error::{DecodeError, EncodeError};
use std::path::Path;

/// Nesting limit applied when no configuration is supplied.
pub const DEFAULT_MAX_DEPTH: usize = 512;
/// Deflate level used when no configuration is supplied.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Byte format of a save on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The game's native `.hhsav` container.
    Proprietary,
    /// Indented, key-order-preserving JSON.
    Interchange,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Proprietary => "hhsav",
            Self::Interchange => "json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Proprietary => "proprietary",
            Self::Interchange => "interchange",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "hhsav" => Some(Self::Proprietary),
            "json" => Some(Self::Interchange),
            _ => None,
        }
    }

    /// Picks a format from a file path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Tunables for decode/encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    pub max_depth: usize,
    /// Deflate level, 0..=9.
    pub compression_level: u32,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

pub fn decode(bytes: &[u8], format: Format) -> Result<Document, DecodeError> {
    decode_with(bytes, format, &CodecOptions::default())
}

pub fn decode_with(
    bytes: &[u8],
    format: Format,
    options: &CodecOptions,
) -> Result<Document, DecodeError> {
    match format {
        Format::Proprietary => container::decode(bytes, options.max_depth),
        Format::Interchange => reader::read_document(bytes, options.max_depth),
    }
}

pub fn encode(document: &Document, format: Format) -> Result<Vec<u8>, EncodeError> {
    encode_with(document, format, &CodecOptions::default())
}

pub fn encode_with(
    document: &Document,
    format: Format,
    options: &CodecOptions,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        Format::Proprietary => {
            container::encode(document, options.compression_level, options.max_depth)
        }
        Format::Interchange => {
            writer::write_document(document, writer::Layout::Pretty, options.max_depth)
        }
    }
}

/// Parses one JSON value, as typed into the raw editing view.
pub fn parse_value(text: &str) -> Result<Node, DecodeError> {
    reader::read_node(text.as_bytes(), DEFAULT_MAX_DEPTH)
}
