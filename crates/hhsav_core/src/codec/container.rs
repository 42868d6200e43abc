//! Proprietary `.hhsav` container.
//!
//! # Responsibility
//! - Validate and inflate the gzip envelope the game writes.
//! - Wrap compact document JSON back into the same envelope.
//!
//! # Invariants
//! - Layout: one gzip member (magic `1f 8b`, method 8), compact UTF-8 JSON
//!   payload, trailer CRC32 + ISIZE.
//! - Encoding is deterministic: header mtime is always zero.

use crate::codec::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::codec::reader;
use crate::codec::writer::{self, Layout};
use crate::model::document::Document;
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use std::io::{Read, Write};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const DEFLATE_METHOD: u8 = 8;
const HEADER_LEN: usize = 10;
const TRAILER_LEN: usize = 8;

pub fn decode(data: &[u8], max_depth: usize) -> Result<Document, DecodeError> {
    if data.len() < HEADER_LEN + TRAILER_LEN {
        return Err(DecodeError::at(DecodeErrorKind::Truncated, data.len()));
    }
    if data[..2] != GZIP_MAGIC {
        return Err(DecodeError::at(DecodeErrorKind::BadMagic, 0));
    }
    if data[2] != DEFLATE_METHOD {
        return Err(DecodeError::at(
            DecodeErrorKind::UnsupportedVersion(data[2]),
            2,
        ));
    }

    let mut payload = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut payload)
        .map_err(|err| DecodeError::new(DecodeErrorKind::Container(err.to_string()), None))?;

    let trailer_offset = data.len() - 4;
    let mut declared = [0_u8; 4];
    declared.copy_from_slice(&data[trailer_offset..]);
    let declared = u32::from_le_bytes(declared);
    // ISIZE is the payload length modulo 2^32.
    let actual = payload.len() as u32;
    if declared != actual {
        return Err(DecodeError::at(
            DecodeErrorKind::LengthMismatch { declared, actual },
            trailer_offset,
        ));
    }

    reader::read_document(&payload, max_depth)
}

pub fn encode(
    document: &Document,
    compression_level: u32,
    max_depth: usize,
) -> Result<Vec<u8>, EncodeError> {
    let payload = writer::write_document(document, Layout::Compact, max_depth)?;
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::new(), Compression::new(compression_level));
    encoder
        .write_all(&payload)
        .map_err(|err| EncodeError::Io(err.to_string()))?;
    encoder.finish().map_err(|err| EncodeError::Io(err.to_string()))
}
