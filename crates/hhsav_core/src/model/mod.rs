//! In-memory save model.
//!
//! # Responsibility
//! - Define the closed `Node` union every consumer pattern-matches on.
//! - Own the ordered `Document` and its path-addressed read/write API.
//!
//! # Invariants
//! - `Integer` and `Float` never collapse into each other.
//! - Key order of every keyed node and of the document sections is kept.
//! - Mutation only happens through `Document` methods; no shared aliases.

pub mod document;
pub mod node;
pub mod path;
