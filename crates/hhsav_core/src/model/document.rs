//! Document: the full in-memory save.
//!
//! # Responsibility
//! - Hold top-level sections in their original order.
//! - Provide checked path reads and value-replacing writes.
//!
//! # Invariants
//! - Writes never grow a sequence implicitly; growth is `insert`.
//! - A failed write leaves the document exactly as it was.
//! - Replacing an existing key keeps that key's position.

use crate::model::node::{KeyedMap, Node};
use crate::model::path::{Path, PathError, Segment};

/// Ordered mapping of section name to node tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    sections: KeyedMap,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from already ordered sections.
    pub fn from_sections(sections: KeyedMap) -> Self {
        Self { sections }
    }

    /// Views the whole document as one keyed node.
    pub fn to_node(&self) -> Node {
        Node::Keyed(self.sections.clone())
    }

    /// Inverse of `to_node`; `None` unless `node` is keyed.
    pub fn from_node(node: Node) -> Option<Self> {
        match node {
            Node::Keyed(sections) => Some(Self { sections }),
            _ => None,
        }
    }

    pub fn sections(&self) -> &KeyedMap {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Node> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Path-addressed read.
    pub fn get(&self, path: &Path) -> Option<&Node> {
        self.resolve(path).ok()
    }

    /// Path-addressed read that explains why a path does not resolve.
    pub fn resolve(&self, path: &Path) -> Result<&Node, PathError> {
        let (first, rest) = path.segments().split_first().ok_or(PathError::EmptyPath)?;
        let name = first
            .as_key()
            .ok_or_else(|| PathError::not_addressable(path, 0))?;
        let mut node = self
            .sections
            .get(name)
            .ok_or_else(|| PathError::missing_key(path, 0, name))?;

        for (offset, segment) in rest.iter().enumerate() {
            let depth = offset + 1;
            node = match node {
                Node::Keyed(map) => {
                    let key = segment
                        .as_key()
                        .ok_or_else(|| PathError::not_addressable(path, depth))?;
                    map.get(key)
                        .ok_or_else(|| PathError::missing_key(path, depth, key))?
                }
                Node::Sequence(items) => {
                    let index = segment
                        .as_index()
                        .ok_or_else(|| PathError::not_addressable(path, depth))?;
                    items
                        .get(index)
                        .ok_or_else(|| PathError::out_of_range(path, depth, index, items.len()))?
                }
                _ => return Err(PathError::not_addressable(path, depth)),
            };
        }
        Ok(node)
    }

    /// Exclusive access to the node at `path`.
    ///
    /// The borrow is tied to the document, so no second owner can exist
    /// while the caller holds it.
    pub fn resolve_mut(&mut self, path: &Path) -> Result<&mut Node, PathError> {
        self.resolve_prefix_mut(path, path.len())
    }

    /// Replaces the value at `path`.
    ///
    /// The final segment may name a new key of a keyed parent (appended at
    /// the end) or a new section when the path has a single segment. A
    /// sequence parent only accepts an existing index.
    pub fn set(&mut self, path: &Path, value: Node) -> Result<(), PathError> {
        let depth = path.len().checked_sub(1).ok_or(PathError::EmptyPath)?;
        let last = &path.segments()[depth];

        if depth == 0 {
            let name = last
                .as_key()
                .ok_or_else(|| PathError::not_addressable(path, 0))?;
            self.sections.insert(name.to_string(), value);
            return Ok(());
        }

        let parent = self.resolve_prefix_mut(path, depth)?;
        match parent {
            Node::Keyed(map) => {
                let key = last
                    .as_key()
                    .ok_or_else(|| PathError::not_addressable(path, depth))?;
                map.insert(key.to_string(), value);
                Ok(())
            }
            Node::Sequence(items) => {
                let index = last
                    .as_index()
                    .ok_or_else(|| PathError::not_addressable(path, depth))?;
                let len = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or_else(|| PathError::out_of_range(path, depth, index, len))?;
                *slot = value;
                Ok(())
            }
            _ => Err(PathError::not_addressable(path, depth)),
        }
    }

    /// Inserts `value` into the sequence at `path`, shifting later elements.
    ///
    /// `index == len` appends.
    pub fn insert(&mut self, path: &Path, index: usize, value: Node) -> Result<(), PathError> {
        let depth = path.len();
        let target = self.resolve_mut(path)?;
        let items = target
            .as_sequence_mut()
            .ok_or_else(|| PathError::NotAddressable {
                path: path.to_string(),
                segment: index.to_string(),
            })?;
        if index > items.len() {
            return Err(PathError::out_of_range(path, depth, index, items.len()));
        }
        items.insert(index, value);
        Ok(())
    }

    /// Removes and returns the node at `path`.
    ///
    /// Remaining keys keep their relative order.
    pub fn remove(&mut self, path: &Path) -> Result<Node, PathError> {
        let depth = path.len().checked_sub(1).ok_or(PathError::EmptyPath)?;
        let last = &path.segments()[depth];

        if depth == 0 {
            let name = last
                .as_key()
                .ok_or_else(|| PathError::not_addressable(path, 0))?;
            return self
                .sections
                .shift_remove(name)
                .ok_or_else(|| PathError::missing_key(path, 0, name));
        }

        let parent = self.resolve_prefix_mut(path, depth)?;
        match parent {
            Node::Keyed(map) => {
                let key = last
                    .as_key()
                    .ok_or_else(|| PathError::not_addressable(path, depth))?;
                map.shift_remove(key)
                    .ok_or_else(|| PathError::missing_key(path, depth, key))
            }
            Node::Sequence(items) => {
                let index = last
                    .as_index()
                    .ok_or_else(|| PathError::not_addressable(path, depth))?;
                if index >= items.len() {
                    return Err(PathError::out_of_range(path, depth, index, items.len()));
                }
                Ok(items.remove(index))
            }
            _ => Err(PathError::not_addressable(path, depth)),
        }
    }

    fn resolve_prefix_mut(&mut self, path: &Path, len: usize) -> Result<&mut Node, PathError> {
        let segments = &path.segments()[..len];
        let (first, rest) = segments.split_first().ok_or(PathError::EmptyPath)?;
        let name = first
            .as_key()
            .ok_or_else(|| PathError::not_addressable(path, 0))?;
        let mut node = self
            .sections
            .get_mut(name)
            .ok_or_else(|| PathError::missing_key(path, 0, name))?;
        for (offset, segment) in rest.iter().enumerate() {
            node = step_mut(node, path, offset + 1, segment)?;
        }
        Ok(node)
    }
}

fn step_mut<'a>(
    node: &'a mut Node,
    path: &Path,
    depth: usize,
    segment: &Segment,
) -> Result<&'a mut Node, PathError> {
    match node {
        Node::Keyed(map) => {
            let key = segment
                .as_key()
                .ok_or_else(|| PathError::not_addressable(path, depth))?;
            map.get_mut(key)
                .ok_or_else(|| PathError::missing_key(path, depth, key))
        }
        Node::Sequence(items) => {
            let index = segment
                .as_index()
                .ok_or_else(|| PathError::not_addressable(path, depth))?;
            let len = items.len();
            items
                .get_mut(index)
                .ok_or_else(|| PathError::out_of_range(path, depth, index, len))
        }
        _ => Err(PathError::not_addressable(path, depth)),
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::model::node::{KeyedMap, Node};
    use crate::model::path::{Path, PathError};

    fn sample() -> Document {
        let mut bank = KeyedMap::new();
        bank.insert(
            "accounts".to_string(),
            Node::Sequence(vec![Node::from(1_i64), Node::from(2_i64)]),
        );
        let mut sections = KeyedMap::new();
        sections.insert("Bank".to_string(), Node::Keyed(bank));
        sections.insert("Suspicion".to_string(), Node::from(3_i64));
        Document::from_sections(sections)
    }

    #[test]
    fn node_view_round_trips() {
        let doc = sample();
        assert_eq!(Document::from_node(doc.to_node()), Some(doc));
        assert_eq!(Document::from_node(Node::Null), None);
    }

    #[test]
    fn set_rejects_scalar_intermediate() {
        let mut doc = sample();
        let before = doc.clone();
        let err = doc
            .set(&Path::section("Suspicion").key("level"), Node::Null)
            .unwrap_err();
        assert!(matches!(err, PathError::NotAddressable { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn set_never_grows_sequences() {
        let mut doc = sample();
        let path = Path::section("Bank").key("accounts").index(2);
        let err = doc.set(&path, Node::Null).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfRange {
                path: "/Bank/accounts".to_string(),
                index: 2,
                len: 2
            }
        );

        let seq = Path::section("Bank").key("accounts");
        doc.insert(&seq, 2, Node::from(3_i64)).unwrap();
        assert_eq!(doc.get(&seq).unwrap().child_count(), Some(3));
    }

    #[test]
    fn remove_keeps_remaining_section_order() {
        let mut doc = sample();
        doc.set(&Path::section("Quests"), Node::Sequence(Vec::new()))
            .unwrap();
        doc.remove(&Path::section("Suspicion")).unwrap();
        let names: Vec<&str> = doc.section_names().collect();
        assert_eq!(names, vec!["Bank", "Quests"]);
    }

    #[test]
    fn empty_path_is_not_a_node() {
        let mut doc = sample();
        assert!(doc.get(&Path::root()).is_none());
        assert_eq!(
            doc.set(&Path::root(), Node::Null).unwrap_err(),
            PathError::EmptyPath
        );
    }
}
