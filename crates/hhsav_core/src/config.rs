//! Editor configuration.
//!
//! # Responsibility
//! - Hold the few tunables the editor has (export naming, codec limits).
//! - Read optional overrides from the environment.
//!
//! # Invariants
//! - Configuration is never persisted.
//! - An invalid override falls back to the default and is logged.

use crate::codec::{CodecOptions, DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DEPTH};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_FILE_PREFIX: &str = "hackhub";
pub const FILE_PREFIX_ENV: &str = "HHSAV_FILE_PREFIX";
pub const COMPRESSION_LEVEL_ENV: &str = "HHSAV_COMPRESSION_LEVEL";

static FILE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid file name regex"));

/// Runtime settings for one editor process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Leading part of suggested export names (`<prefix>_edited_<ts>.hhsav`).
    pub file_prefix: String,
    pub codec: CodecOptions,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            codec: CodecOptions {
                max_depth: DEFAULT_MAX_DEPTH,
                compression_level: DEFAULT_COMPRESSION_LEVEL,
            },
        }
    }
}

impl EditorConfig {
    /// Defaults plus `HHSAV_FILE_PREFIX` / `HHSAV_COMPRESSION_LEVEL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(FILE_PREFIX_ENV) {
            let trimmed = raw.trim();
            if is_valid_file_name(trimmed) {
                config.file_prefix = trimmed.to_string();
            } else if !trimmed.is_empty() {
                warn!("event=config_override module=config status=rejected key={FILE_PREFIX_ENV}");
            }
        }

        if let Some(raw) = lookup(COMPRESSION_LEVEL_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(level) if level <= 9 => config.codec.compression_level = level,
                _ => warn!(
                    "event=config_override module=config status=rejected key={COMPRESSION_LEVEL_ENV}"
                ),
            }
        }

        config
    }
}

/// Whether `name` is a plain file name safe to suggest to a save dialog.
pub fn is_valid_file_name(name: &str) -> bool {
    FILE_NAME_RE.is_match(name) && name != "." && name != ".."
}
