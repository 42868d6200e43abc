//! Schema projections: typed lenses over known save sub-trees.
//!
//! # Responsibility
//! - Translate between keyed nodes and structured records.
//! - Write records back without touching keys the record does not model.
//!
//! # Invariants
//! - `write_at` never grows or shrinks the target sequence.
//! - A failed `write_at` leaves the document unchanged.

pub mod bank;

use crate::model::document::Document;
use crate::model::node::{KeyedMap, Node};
use crate::model::path::{Path, PathError};

/// A partial, lossless view of the elements of one sequence.
pub trait Projection {
    type Record;

    /// Location of the sequence of keyed elements this projection covers.
    fn sequence_path(&self) -> Path;

    /// Builds a record from one element. Missing keys become "not present".
    fn read_record(&self, fields: &KeyedMap) -> Self::Record;

    /// Applies the fields represented in `record` onto one element.
    fn write_record(&self, fields: &mut KeyedMap, record: &Self::Record);
}

/// Reads every element of the projected sequence, in order.
///
/// Elements that are not keyed nodes read as records with no fields present.
pub fn read<P: Projection>(projection: &P, document: &Document) -> Result<Vec<P::Record>, PathError> {
    let path = projection.sequence_path();
    let node = document.resolve(&path)?;
    let items = node.as_sequence().ok_or_else(|| PathError::NotAddressable {
        path: path.to_string(),
        segment: node.kind().label().to_string(),
    })?;

    let empty = KeyedMap::new();
    Ok(items
        .iter()
        .map(|item| projection.read_record(item.as_keyed().unwrap_or(&empty)))
        .collect())
}

/// Writes `record` onto element `index` of the projected sequence.
pub fn write_at<P: Projection>(
    projection: &P,
    document: &mut Document,
    index: usize,
    record: &P::Record,
) -> Result<(), PathError> {
    let path = projection.sequence_path();
    let node = document.resolve_mut(&path)?;
    let kind = node.kind();
    let items = node.as_sequence_mut().ok_or_else(|| PathError::NotAddressable {
        path: path.to_string(),
        segment: kind.label().to_string(),
    })?;

    let len = items.len();
    let element = items.get_mut(index).ok_or_else(|| PathError::IndexOutOfRange {
        path: path.to_string(),
        index,
        len,
    })?;
    match element {
        Node::Keyed(fields) => {
            projection.write_record(fields, record);
            Ok(())
        }
        _ => Err(PathError::NotAddressable {
            path: path.to_string(),
            segment: index.to_string(),
        }),
    }
}
