//! Session controller: owner of the single live document.
//!
//! # Responsibility
//! - Load, edit and export exactly one document at a time.
//! - Surface every failure as a typed `SessionError`.
//!
//! # Invariants
//! - `Empty` -> `Loaded` only through a successful decode; a failed load
//!   keeps whatever state was there before.
//! - Edits and exports on `Empty` fail with `NoDocument`.
//! - Export never mutates the document and never persists implicitly.
//!
//! # See also
//! - `crate::codec` for the byte formats.

pub mod export;

use crate::codec::error::{DecodeError, EncodeError};
use crate::codec::{self, writer, Format};
use crate::config::EditorConfig;
use crate::model::document::Document;
use crate::model::node::{Node, NodeKind};
use crate::model::path::{Path, PathError};
use crate::projection::bank::{BankAccount, BankAccounts, BankSummary};
use export::IoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Instant;

pub type SessionResult<T> = Result<T, SessionError>;

/// Failure surfaced at the session boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// No document is loaded.
    NoDocument,
    /// Another load or export is still running.
    Busy,
    /// An edit carried a value the save cannot hold.
    InvalidValue(String),
    Decode(DecodeError),
    Encode(EncodeError),
    Path(PathError),
    Io(IoError),
}

impl SessionError {
    /// Stable machine-readable code for UI layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoDocument => "no_document",
            Self::Busy => "busy",
            Self::InvalidValue(_) => "invalid_value",
            Self::Decode(_) => "decode_failed",
            Self::Encode(_) => "encode_failed",
            Self::Path(_) => "path_error",
            Self::Io(IoError::Cancelled) => "cancelled",
            Self::Io(_) => "io_error",
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDocument => write!(f, "no document loaded"),
            Self::Busy => write!(f, "another save operation is in progress"),
            Self::InvalidValue(reason) => write!(f, "invalid value: {reason}"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "{err}"),
            Self::Path(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Path(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::NoDocument | Self::Busy | Self::InvalidValue(_) => None,
        }
    }
}

impl From<DecodeError> for SessionError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<EncodeError> for SessionError {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}

impl From<PathError> for SessionError {
    fn from(value: PathError) -> Self {
        Self::Path(value)
    }
}

impl From<IoError> for SessionError {
    fn from(value: IoError) -> Self {
        Self::Io(value)
    }
}

/// Where the live document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSource {
    /// File name or caller-supplied label.
    pub name: String,
    pub format: Format,
}

/// One row of the section picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSummary {
    pub name: String,
    pub kind: NodeKind,
    /// Direct children for containers, `None` for scalars.
    pub child_count: Option<usize>,
}

#[derive(Debug)]
struct LoadedSave {
    document: Document,
    source: SaveSource,
    dirty: bool,
}

/// Session state machine.
#[derive(Debug)]
enum SessionState {
    Empty,
    Loaded(LoadedSave),
}

/// Owner of the single live document.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    config: EditorConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Session {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            state: SessionState::Empty,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, SessionState::Loaded(_))
    }

    /// Whether edits were applied since the last load.
    pub fn is_dirty(&self) -> bool {
        match &self.state {
            SessionState::Loaded(save) => save.dirty,
            SessionState::Empty => false,
        }
    }

    pub fn source(&self) -> Option<&SaveSource> {
        match &self.state {
            SessionState::Loaded(save) => Some(&save.source),
            SessionState::Empty => None,
        }
    }

    /// Decodes `bytes` and, on success, replaces the live document.
    pub fn load_bytes(
        &mut self,
        bytes: &[u8],
        format: Format,
        source_name: impl Into<String>,
    ) -> SessionResult<&Document> {
        let started_at = Instant::now();
        info!(
            "event=save_load module=session status=start format={} bytes={}",
            format.label(),
            bytes.len()
        );

        let document = match codec::decode_with(bytes, format, &self.config.codec) {
            Ok(document) => document,
            Err(err) => {
                error!(
                    "event=save_load module=session status=error format={} duration_ms={} error_code=decode_failed offset={:?}",
                    format.label(),
                    started_at.elapsed().as_millis(),
                    err.offset()
                );
                return Err(err.into());
            }
        };

        info!(
            "event=save_load module=session status=ok format={} sections={} duration_ms={}",
            format.label(),
            document.len(),
            started_at.elapsed().as_millis()
        );
        self.state = SessionState::Loaded(LoadedSave {
            document,
            source: SaveSource {
                name: source_name.into(),
                format,
            },
            dirty: false,
        });
        self.document()
    }

    /// Reads and decodes a save file. Unknown extensions are read as the
    /// proprietary container.
    pub fn load_file(&mut self, path: impl AsRef<std::path::Path>) -> SessionResult<&Document> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| IoError::Read {
            path: path.to_path_buf(),
            cause: err.to_string(),
        })?;
        let format = Format::from_path(path).unwrap_or(Format::Proprietary);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.load_bytes(&bytes, format, name)
    }

    /// Drops the live document, returning to `Empty`.
    pub fn close(&mut self) {
        if self.is_loaded() {
            info!("event=save_close module=session status=ok");
        }
        self.state = SessionState::Empty;
    }

    pub fn document(&self) -> SessionResult<&Document> {
        match &self.state {
            SessionState::Loaded(save) => Ok(&save.document),
            SessionState::Empty => Err(SessionError::NoDocument),
        }
    }

    fn loaded_mut(&mut self) -> SessionResult<&mut LoadedSave> {
        match &mut self.state {
            SessionState::Loaded(save) => Ok(save),
            SessionState::Empty => Err(SessionError::NoDocument),
        }
    }

    /// Applies `edit` to the document; marks it dirty only on success.
    fn edit<T>(
        &mut self,
        edit: impl FnOnce(&mut Document) -> Result<T, PathError>,
    ) -> SessionResult<T> {
        let save = self.loaded_mut()?;
        let value = edit(&mut save.document)?;
        save.dirty = true;
        Ok(value)
    }

    pub fn get(&self, path: &Path) -> SessionResult<&Node> {
        Ok(self.document()?.resolve(path)?)
    }

    pub fn set(&mut self, path: &Path, value: Node) -> SessionResult<()> {
        self.edit(|document| document.set(path, value))
    }

    pub fn insert(&mut self, path: &Path, index: usize, value: Node) -> SessionResult<()> {
        self.edit(|document| document.insert(path, index, value))
    }

    pub fn remove(&mut self, path: &Path) -> SessionResult<Node> {
        self.edit(|document| document.remove(path))
    }

    pub fn section_names(&self) -> SessionResult<Vec<String>> {
        Ok(self
            .document()?
            .section_names()
            .map(str::to_string)
            .collect())
    }

    pub fn section_summaries(&self) -> SessionResult<Vec<SectionSummary>> {
        Ok(self
            .document()?
            .sections()
            .iter()
            .map(|(name, node)| SectionSummary {
                name: name.clone(),
                kind: node.kind(),
                child_count: node.child_count(),
            })
            .collect())
    }

    /// Indented interchange text of one section for the raw view.
    pub fn section_text(&self, name: &str) -> SessionResult<String> {
        let node = self.get(&Path::section(name))?;
        Ok(writer::to_pretty_string(node)?)
    }

    pub fn bank_accounts(&self) -> SessionResult<Vec<BankAccount>> {
        Ok(BankAccounts.read(self.document()?)?)
    }

    pub fn bank_summary(&self) -> SessionResult<BankSummary> {
        Ok(BankAccounts.summary(self.document()?)?)
    }

    /// Writes the represented fields of `record` onto account `index`.
    pub fn write_bank_account(&mut self, index: usize, record: &BankAccount) -> SessionResult<()> {
        if let Some(balance) = record.balance.filter(|balance| !balance.is_finite()) {
            warn!("event=bank_account_write module=session status=rejected index={index}");
            return Err(SessionError::InvalidValue(format!(
                "balance must be a finite number, got {balance}"
            )));
        }
        self.edit(|document| BankAccounts.write_at(document, index, record))?;
        info!("event=bank_account_write module=session status=ok index={index}");
        Ok(())
    }

    /// Encodes the live document. Pure read.
    pub fn export(&self, format: Format) -> SessionResult<Vec<u8>> {
        let document = self.document()?;
        let started_at = Instant::now();
        match codec::encode_with(document, format, &self.config.codec) {
            Ok(bytes) => {
                info!(
                    "event=save_encode module=session status=ok format={} bytes={} duration_ms={}",
                    format.label(),
                    bytes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(bytes)
            }
            Err(err) => {
                error!(
                    "event=save_encode module=session status=error format={} error_code=encode_failed error={}",
                    format.label(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Encodes and atomically writes the live document to `target`.
    pub fn export_to(
        &self,
        format: Format,
        target: impl AsRef<std::path::Path>,
    ) -> SessionResult<PathBuf> {
        let bytes = self.export(format)?;
        match export::write_atomically(target.as_ref(), &bytes) {
            Ok(path) => {
                info!(
                    "event=save_export module=session status=ok format={}",
                    format.label()
                );
                Ok(path)
            }
            Err(err) => {
                error!(
                    "event=save_export module=session status=error format={} error_code=write_failed",
                    format.label()
                );
                Err(err.into())
            }
        }
    }

    /// Suggested export file name for `format` at `timestamp_ms`.
    pub fn suggested_file_name(&self, format: Format, timestamp_ms: u128) -> SessionResult<String> {
        Ok(export::suggested_file_name(
            &self.config.file_prefix,
            format,
            timestamp_ms,
        )?)
    }
}
