//! Core engine for the HackHub save editor.
//! This crate is the single source of truth for save-format invariants.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod projection;
pub mod session;

pub use codec::error::{DecodeError, DecodeErrorKind, EncodeError};
pub use codec::{decode, decode_with, encode, encode_with, parse_value, CodecOptions, Format};
pub use config::EditorConfig;
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::document::Document;
pub use model::node::{Integer, KeyedMap, Node, NodeKind};
pub use model::path::{Path, PathError, Segment};
pub use projection::bank::{BankAccount, BankAccounts, BankSummary};
pub use projection::Projection;
pub use session::export::IoError;
pub use session::{SaveSource, SectionSummary, Session, SessionError, SessionResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
