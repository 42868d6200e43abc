//! Flutter-facing bindings for the save editor core.

pub mod api;
