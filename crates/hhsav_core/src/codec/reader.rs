//! Interchange text reader.
//!
//! # Responsibility
//! - Turn JSON text into `Node` trees in a single pass.
//! - Record the numeric kind of every number exactly as written.
//!
//! # Invariants
//! - A number without `.`, `e` or `E` is an `Integer`; anything else is a
//!   `Float`.
//! - Duplicate keys inside one object are rejected, never merged.
//! - Every error carries the byte offset where reading stopped.

use crate::codec::error::{DecodeError, DecodeErrorKind};
use crate::model::document::Document;
use crate::model::node::{Integer, KeyedMap, Node};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads a whole document: one top-level object, nothing after it.
pub fn read_document(data: &[u8], max_depth: usize) -> Result<Document, DecodeError> {
    let mut reader = Reader::new(data, max_depth)?;
    reader.skip_whitespace();
    match reader.peek() {
        None => return Err(DecodeError::at(DecodeErrorKind::UnexpectedEof, reader.pos)),
        Some(b'{') => {}
        Some(_) => return Err(DecodeError::at(DecodeErrorKind::NotAnObject, reader.pos)),
    }
    let sections = reader.read_object()?;
    reader.finish()?;
    Ok(Document::from_sections(sections))
}

/// Reads a single value of any kind, e.g. a raw-view edit.
pub fn read_node(data: &[u8], max_depth: usize) -> Result<Node, DecodeError> {
    let mut reader = Reader::new(data, max_depth)?;
    let node = reader.read_value()?;
    reader.finish()?;
    Ok(node)
}

struct Reader<'a> {
    text: &'a str,
    data: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], max_depth: usize) -> Result<Self, DecodeError> {
        let start = if data.starts_with(UTF8_BOM) {
            UTF8_BOM.len()
        } else {
            0
        };
        let text = std::str::from_utf8(data).map_err(|err| {
            DecodeError::at(DecodeErrorKind::InvalidUtf8, err.valid_up_to())
        })?;
        Ok(Self {
            text,
            data,
            pos: start,
            depth: 0,
            max_depth,
        })
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::at(kind, self.pos)
    }

    fn unexpected(&self) -> DecodeError {
        match self.peek() {
            Some(byte) => self.error(DecodeErrorKind::UnexpectedByte(byte)),
            None => self.error(DecodeErrorKind::UnexpectedEof),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), DecodeError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn finish(&mut self) -> Result<(), DecodeError> {
        self.skip_whitespace();
        if self.pos < self.data.len() {
            return Err(self.error(DecodeErrorKind::TrailingData));
        }
        Ok(())
    }

    fn read_value(&mut self) -> Result<Node, DecodeError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.read_object().map(Node::Keyed),
            Some(b'[') => self.read_array().map(Node::Sequence),
            Some(b'"') => self.read_string().map(Node::Text),
            Some(b't') => self.read_literal(b"true", Node::Boolean(true)),
            Some(b'f') => self.read_literal(b"false", Node::Boolean(false)),
            Some(b'n') => self.read_literal(b"null", Node::Null),
            Some(b'-' | b'0'..=b'9') => self.read_number(),
            _ => Err(self.unexpected()),
        }
    }

    fn enter(&mut self) -> Result<(), DecodeError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error(DecodeErrorKind::TooDeep));
        }
        Ok(())
    }

    fn read_object(&mut self) -> Result<KeyedMap, DecodeError> {
        self.enter()?;
        self.expect(b'{')?;
        let mut map = KeyedMap::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(map);
        }

        loop {
            self.skip_whitespace();
            let key_offset = self.pos;
            if self.peek() != Some(b'"') {
                return Err(self.unexpected());
            }
            let key = self.read_string()?;
            self.skip_whitespace();
            self.expect(b':')?;
            let value = self.read_value()?;
            if map.contains_key(&key) {
                return Err(DecodeError::at(
                    DecodeErrorKind::DuplicateKey(key),
                    key_offset,
                ));
            }
            map.insert(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected()),
            }
        }

        self.depth -= 1;
        Ok(map)
    }

    fn read_array(&mut self) -> Result<Vec<Node>, DecodeError> {
        self.enter()?;
        self.expect(b'[')?;
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(items);
        }

        loop {
            items.push(self.read_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected()),
            }
        }

        self.depth -= 1;
        Ok(items)
    }

    fn read_literal(&mut self, literal: &[u8], node: Node) -> Result<Node, DecodeError> {
        for expected in literal {
            if self.peek() != Some(*expected) {
                return Err(self.unexpected());
            }
            self.pos += 1;
        }
        Ok(node)
    }

    fn read_number(&mut self) -> Result<Node, DecodeError> {
        let start = self.pos;
        let mut is_float = false;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error(DecodeErrorKind::InvalidNumber)),
        }

        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error(DecodeErrorKind::InvalidNumber));
            }
            self.skip_digits();
        }

        if let Some(b'e' | b'E') = self.peek() {
            is_float = true;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error(DecodeErrorKind::InvalidNumber));
            }
            self.skip_digits();
        }

        let lexeme = &self.text[start..self.pos];
        if is_float {
            match lexeme.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Node::Float(value)),
                _ => Err(DecodeError::at(DecodeErrorKind::InvalidNumber, start)),
            }
        } else {
            Integer::parse(lexeme)
                .map(Node::Integer)
                .ok_or_else(|| DecodeError::at(DecodeErrorKind::InvalidNumber, start))
        }
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn read_string(&mut self) -> Result<String, DecodeError> {
        self.expect(b'"')?;
        let mut out = String::new();
        let mut run_start = self.pos;

        loop {
            match self.peek() {
                None => return Err(self.error(DecodeErrorKind::UnexpectedEof)),
                Some(b'"') => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.read_escape(&mut out)?;
                    run_start = self.pos;
                }
                Some(byte) if byte < 0x20 => {
                    return Err(self.error(DecodeErrorKind::ControlCharacter));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn read_escape(&mut self, out: &mut String) -> Result<(), DecodeError> {
        let escape_start = self.pos;
        self.pos += 1;
        let Some(code) = self.peek() else {
            return Err(self.error(DecodeErrorKind::UnexpectedEof));
        };
        self.pos += 1;
        match code {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let ch = self.read_unicode_escape(escape_start)?;
                out.push(ch);
            }
            _ => return Err(DecodeError::at(DecodeErrorKind::InvalidEscape, escape_start)),
        }
        Ok(())
    }

    fn read_unicode_escape(&mut self, escape_start: usize) -> Result<char, DecodeError> {
        let first = self.read_hex4()?;
        let scalar = match first {
            0xD800..=0xDBFF => {
                if self.peek() != Some(b'\\') || self.data.get(self.pos + 1) != Some(&b'u') {
                    return Err(DecodeError::at(
                        DecodeErrorKind::LoneSurrogate,
                        escape_start,
                    ));
                }
                self.pos += 2;
                let second = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&second) {
                    return Err(DecodeError::at(
                        DecodeErrorKind::LoneSurrogate,
                        escape_start,
                    ));
                }
                0x10000 + ((u32::from(first) - 0xD800) << 10) + (u32::from(second) - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(DecodeError::at(
                    DecodeErrorKind::LoneSurrogate,
                    escape_start,
                ))
            }
            other => u32::from(other),
        };
        char::from_u32(scalar)
            .ok_or_else(|| DecodeError::at(DecodeErrorKind::InvalidEscape, escape_start))
    }

    fn read_hex4(&mut self) -> Result<u16, DecodeError> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let digit = match self.peek() {
                Some(byte @ b'0'..=b'9') => byte - b'0',
                Some(byte @ b'a'..=b'f') => byte - b'a' + 10,
                Some(byte @ b'A'..=b'F') => byte - b'A' + 10,
                None => return Err(self.error(DecodeErrorKind::UnexpectedEof)),
                Some(_) => return Err(self.error(DecodeErrorKind::InvalidEscape)),
            };
            value = (value << 4) | u16::from(digit);
            self.pos += 1;
        }
        Ok(value)
    }
}
