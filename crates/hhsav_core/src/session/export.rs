//! File output for exports.
//!
//! # Responsibility
//! - Write encoded bytes so the target is either complete or untouched.
//! - Build suggested export file names.
//!
//! # Invariants
//! - Bytes go to a temp file in the target directory, which is then renamed
//!   over the target. A failure never leaves a partial target behind.
//! - A replaced target keeps its permissions; a new one gets the same mode
//!   a plain file create would (umask applied).

use crate::codec::Format;
use crate::config::is_valid_file_name;
use std::error::Error;
use std::fs::Permissions;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// File-level failure at the session boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoError {
    /// The user dismissed the file dialog.
    Cancelled,
    Read { path: PathBuf, cause: String },
    Write { path: PathBuf, cause: String },
    InvalidFileName(String),
}

impl Display for IoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "file selection cancelled"),
            Self::Read { path, cause } => {
                write!(f, "failed to read `{}`: {cause}", path.display())
            }
            Self::Write { path, cause } => {
                write!(f, "failed to write `{}`: {cause}", path.display())
            }
            Self::InvalidFileName(name) => write!(f, "invalid file name `{name}`"),
        }
    }
}

impl Error for IoError {}

/// Suggested name for an export, e.g. `hackhub_edited_1700000000000.hhsav`.
///
/// The container export is tagged `edited`, the interchange export `raw`.
pub fn suggested_file_name(
    prefix: &str,
    format: Format,
    timestamp_ms: u128,
) -> Result<String, IoError> {
    let tag = match format {
        Format::Proprietary => "edited",
        Format::Interchange => "raw",
    };
    let name = format!("{prefix}_{tag}_{timestamp_ms}.{}", format.extension());
    if !is_valid_file_name(&name) {
        return Err(IoError::InvalidFileName(name));
    }
    Ok(name)
}

/// Writes `bytes` to `target` atomically.
pub fn write_atomically(target: &Path, bytes: &[u8]) -> Result<PathBuf, IoError> {
    let write_error = |cause: String| IoError::Write {
        path: target.to_path_buf(),
        cause,
    };

    if target.file_name().is_none() {
        return Err(IoError::InvalidFileName(target.display().to_string()));
    }
    let directory = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let existing = std::fs::metadata(target)
        .ok()
        .map(|metadata| metadata.permissions());
    let mut builder = Builder::new();
    if let Some(mode) = new_file_permissions() {
        builder.permissions(mode);
    }
    let mut temp = builder
        .tempfile_in(directory)
        .map_err(|err| write_error(err.to_string()))?;
    if let Some(permissions) = existing {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|err| write_error(err.to_string()))?;
    }
    temp.write_all(bytes)
        .map_err(|err| write_error(err.to_string()))?;
    temp.as_file()
        .sync_all()
        .map_err(|err| write_error(err.to_string()))?;
    temp.persist(target)
        .map_err(|err| write_error(err.error.to_string()))?;

    Ok(target.to_path_buf())
}

/// Creation mode for temp files; the process umask still applies.
#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
