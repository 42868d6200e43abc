//! Interchange text writer.
//!
//! # Responsibility
//! - Serialize `Node` trees through `serde` into JSON text.
//! - Reject values the save grammar cannot carry before writing a byte.
//!
//! # Invariants
//! - Keyed nodes serialize in insertion order.
//! - Integers are written verbatim; floats always carry `.` or an exponent.

use crate::codec::error::EncodeError;
use crate::model::document::Document;
use crate::model::node::{Integer, Node};
use crate::model::path::Path;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// No insignificant whitespace; the game's own writer uses this.
    Compact,
    /// Two-space indentation for human inspection.
    Pretty,
}

/// Writes a whole document. `max_depth` counts the top-level object, the
/// same way the reader does, so anything written here reads back.
pub fn write_document(
    document: &Document,
    layout: Layout,
    max_depth: usize,
) -> Result<Vec<u8>, EncodeError> {
    if max_depth == 0 {
        return Err(EncodeError::TooDeep {
            path: Path::root().to_string(),
            max_depth,
        });
    }
    for (name, node) in document.sections() {
        check_node(node, &Path::section(name.as_str()), 1, max_depth)?;
    }
    let root = SectionsRef(document);
    to_bytes(&root, layout)
}

/// Writes a single node with no nesting limit; used for display text.
pub fn write_node(node: &Node, layout: Layout) -> Result<Vec<u8>, EncodeError> {
    check_node(node, &Path::root(), 0, usize::MAX)?;
    to_bytes(node, layout)
}

/// Pretty text of one node, used by the raw view.
pub fn to_pretty_string(node: &Node) -> Result<String, EncodeError> {
    let bytes = write_node(node, Layout::Pretty)?;
    String::from_utf8(bytes).map_err(|err| EncodeError::Serialize(err.to_string()))
}

fn to_bytes<T: Serialize + ?Sized>(value: &T, layout: Layout) -> Result<Vec<u8>, EncodeError> {
    let bytes = match layout {
        Layout::Compact => serde_json::to_vec(value)?,
        Layout::Pretty => serde_json::to_vec_pretty(value)?,
    };
    Ok(bytes)
}

/// Rejects non-finite floats and containers nested past `max_depth`.
/// `depth` is the number of containers enclosing `node`.
fn check_node(node: &Node, path: &Path, depth: usize, max_depth: usize) -> Result<(), EncodeError> {
    let inner = match node {
        Node::Float(value) if !value.is_finite() => {
            return Err(EncodeError::NonFiniteFloat {
                path: path.to_string(),
            })
        }
        Node::Sequence(_) | Node::Keyed(_) => depth + 1,
        _ => return Ok(()),
    };
    if inner > max_depth {
        return Err(EncodeError::TooDeep {
            path: path.to_string(),
            max_depth,
        });
    }
    match node {
        Node::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                check_node(item, &path.clone().index(index), inner, max_depth)?;
            }
        }
        Node::Keyed(map) => {
            for (key, value) in map {
                check_node(value, &path.clone().key(key.as_str()), inner, max_depth)?;
            }
        }
        _ => {}
    }
    Ok(())
}

struct SectionsRef<'a>(&'a Document);

impl Serialize for SectionsRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sections = self.0.sections();
        let mut map = serializer.serialize_map(Some(sections.len()))?;
        for (name, node) in sections {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Boolean(value) => serializer.serialize_bool(*value),
            Node::Integer(value) => value.serialize(serializer),
            Node::Float(value) => serializer.serialize_f64(*value),
            Node::Text(value) => serializer.serialize_str(value),
            Node::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Keyed(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl Serialize for Integer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // `arbitrary_precision` keeps the digit text as-is, whatever its width.
        let number: serde_json::Number = self.as_str().parse().map_err(S::Error::custom)?;
        number.serialize(serializer)
    }
}
