//! Node value model.
//!
//! # Responsibility
//! - Represent any scalar, sequence or keyed value found in a save.
//! - Keep the numeric kind (`Integer` vs `Float`) the save was written with.
//!
//! # Invariants
//! - `Keyed` preserves insertion order and holds unique keys.
//! - `Integer` text is canonical: optional `-`, no leading zeros, no `-0`.

use crate::model::path::Segment;
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};

/// Ordered key/value storage used by keyed nodes.
pub type KeyedMap = IndexMap<String, Node>;

/// Exact whole number of arbitrary range.
///
/// Stored as canonical decimal text so values wider than 64 bits survive a
/// load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integer(String);

impl Integer {
    /// Parses a decimal integer literal.
    ///
    /// Accepts an optional leading `-` followed by digits. Leading zeros are
    /// stripped and `-0` becomes `0`. Returns `None` for anything else.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            return Some(Self("0".to_string()));
        }
        if negative {
            Some(Self(format!("-{trimmed}")))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Canonical decimal text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the value when it fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Nearest double, used for display only.
    pub fn as_f64(&self) -> f64 {
        // A validated digit string always parses; huge values saturate.
        self.0.parse().unwrap_or(f64::NAN)
    }

    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i32> for Integer {
    fn from(value: i32) -> Self {
        Self(value.to_string())
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant tag of a `Node`, used for summaries and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Boolean,
    Integer,
    Float,
    Text,
    Sequence,
    Keyed,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Sequence => "sequence",
            Self::Keyed => "keyed",
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One position in the save tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Boolean(bool),
    Integer(Integer),
    Float(f64),
    Text(String),
    /// Order-significant list.
    Sequence(Vec<Node>),
    /// Order-significant mapping; order is part of the encoded bytes.
    Keyed(KeyedMap),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Null => NodeKind::Null,
            Self::Boolean(_) => NodeKind::Boolean,
            Self::Integer(_) => NodeKind::Integer,
            Self::Float(_) => NodeKind::Float,
            Self::Text(_) => NodeKind::Text,
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Keyed(_) => NodeKind::Keyed,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Reads either numeric kind as a double.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(value.as_f64()),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&KeyedMap> {
        match self {
            Self::Keyed(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_keyed_mut(&mut self) -> Option<&mut KeyedMap> {
        match self {
            Self::Keyed(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Self::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Number of direct children; `None` for scalars.
    pub fn child_count(&self) -> Option<usize> {
        match self {
            Self::Sequence(items) => Some(items.len()),
            Self::Keyed(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Immutable single-step lookup.
    pub fn child(&self, segment: &Segment) -> Option<&Node> {
        match self {
            Self::Keyed(map) => map.get(segment.as_key()?),
            Self::Sequence(items) => items.get(segment.as_index()?),
            _ => None,
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Integer(Integer::from(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Self::Sequence(value)
    }
}

impl From<KeyedMap> for Node {
    fn from(value: KeyedMap) -> Self {
        Self::Keyed(value)
    }
}
