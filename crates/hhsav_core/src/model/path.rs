//! Path addressing for document reads and writes.
//!
//! # Responsibility
//! - Describe a location inside a `Document` as keys and indices.
//! - Parse and render RFC 6901 JSON pointers for the raw editing view.
//!
//! # Invariants
//! - A pointer segment made only of canonical digits may address a
//!   sequence element; on a keyed node the same segment is a plain key.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// One step of a `Path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// Key form of this segment; explicit indices are never keys.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key.as_str()),
            Self::Index(_) => None,
        }
    }

    /// Index form of this segment.
    ///
    /// Keys qualify only when they are canonical decimal (`0`, `12`, not
    /// `012`), matching pointer semantics for arrays.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Key(key) => {
                let canonical = !key.is_empty()
                    && key.bytes().all(|b| b.is_ascii_digit())
                    && (key == "0" || !key.starts_with('0'));
                if canonical {
                    key.parse().ok()
                } else {
                    None
                }
            }
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => f.write_str(&key.replace('~', "~0").replace('/', "~1")),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Ordered list of segments, starting at a section name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Empty path. Addresses the document itself, which is not a node.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path to a top-level section.
    pub fn section(name: impl Into<String>) -> Self {
        Self::root().key(name)
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Parses an RFC 6901 pointer such as `/Bank/accounts/0/balance`.
    ///
    /// `""` is the root. Any other pointer must start with `/`.
    pub fn parse_pointer(pointer: &str) -> Result<Self, PathError> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = pointer.strip_prefix('/') else {
            return Err(PathError::InvalidPointer(pointer.to_string()));
        };

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            segments.push(Segment::Key(unescape_pointer_segment(raw, pointer)?));
        }
        Ok(Self { segments })
    }

    /// Renders the prefix made of the first `len` segments as a pointer.
    pub(crate) fn prefix_pointer(&self, len: usize) -> String {
        self.segments
            .iter()
            .take(len)
            .map(|segment| format!("/{segment}"))
            .collect()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl From<&[&str]> for Path {
    fn from(keys: &[&str]) -> Self {
        Self {
            segments: keys.iter().map(|key| Segment::Key((*key).to_string())).collect(),
        }
    }
}

fn unescape_pointer_segment(raw: &str, pointer: &str) -> Result<String, PathError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(PathError::InvalidPointer(pointer.to_string())),
        }
    }
    Ok(out)
}

/// Failure to address a node for reading or writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The empty path addresses the document, which cannot be replaced.
    EmptyPath,
    /// Pointer text is malformed (missing leading `/`, bad `~` escape).
    InvalidPointer(String),
    /// A keyed node on the way has no such key.
    MissingKey { path: String, key: String },
    /// Sequence index beyond the current length.
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    /// The node at `path` cannot be stepped into with `segment`.
    NotAddressable { path: String, segment: String },
}

impl PathError {
    pub(crate) fn not_addressable(path: &Path, depth: usize) -> Self {
        let segment = path
            .segments()
            .get(depth)
            .map(ToString::to_string)
            .unwrap_or_default();
        Self::NotAddressable {
            path: path.prefix_pointer(depth),
            segment,
        }
    }

    pub(crate) fn missing_key(path: &Path, depth: usize, key: &str) -> Self {
        Self::MissingKey {
            path: path.prefix_pointer(depth),
            key: key.to_string(),
        }
    }

    pub(crate) fn out_of_range(path: &Path, depth: usize, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            path: path.prefix_pointer(depth),
            index,
            len,
        }
    }
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "path is empty"),
            Self::InvalidPointer(pointer) => write!(f, "invalid pointer: `{pointer}`"),
            Self::MissingKey { path, key } => write!(f, "no key `{key}` at `{path}`"),
            Self::IndexOutOfRange { path, index, len } => write!(
                f,
                "index {index} out of range at `{path}` (length {len})"
            ),
            Self::NotAddressable { path, segment } => {
                write!(f, "path not addressable: `{segment}` under `{path}`")
            }
        }
    }
}

impl Error for PathError {}
