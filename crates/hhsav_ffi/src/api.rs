//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose load/edit/export use-cases to the UI via FRB.
//! - Own the single live `Session` for this process.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - At most one call holds the session at a time; a call that finds it
//!   held is rejected with `busy`, never queued or interleaved.
//! - File dialogs live in the UI; a `None` path means the user cancelled.

use hhsav_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_value,
    ping as ping_inner, BankAccount, EditorConfig, Format, IoError, Path, Session, SessionError,
};
use log::warn;
use once_cell::sync::Lazy;
use std::sync::{Mutex, TryLockError};
use std::time::{SystemTime, UNIX_EPOCH};

static SESSION: Lazy<Mutex<Session>> =
    Lazy::new(|| Mutex::new(Session::new(EditorConfig::from_env())));

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive);
///   blank selects the build default (`debug` or `info`).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Stable failure code (`no_document`, `busy`, `decode_failed`, ...).
    pub error_code: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl SaveActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(context: &str, err: &SessionError) -> Self {
        Self {
            ok: false,
            error_code: Some(err.code().to_string()),
            message: format!("{context} failed: {err}"),
        }
    }
}

/// One row of the section picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionItem {
    pub name: String,
    /// Node kind label (`keyed|sequence|integer|...`).
    pub kind: String,
    pub child_count: Option<u32>,
}

/// Section list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionListResponse {
    pub ok: bool,
    pub items: Vec<SectionItem>,
    pub error_code: Option<String>,
    pub message: String,
}

/// Text payload envelope for raw-view reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub ok: bool,
    /// Indented JSON text on success.
    pub text: Option<String>,
    pub error_code: Option<String>,
    pub message: String,
}

impl TextResponse {
    fn from_result(context: &str, result: Result<String, SessionError>) -> Self {
        match result {
            Ok(text) => Self {
                ok: true,
                text: Some(text),
                error_code: None,
                message: String::new(),
            },
            Err(err) => Self {
                ok: false,
                text: None,
                error_code: Some(err.code().to_string()),
                message: format!("{context} failed: {err}"),
            },
        }
    }
}

/// Bank account row for the accounts table.
#[derive(Debug, Clone, PartialEq)]
pub struct BankAccountItem {
    pub index: u32,
    pub id: Option<String>,
    /// Holder name with the `Unknown` placeholder applied.
    pub display_name: String,
    pub provider: Option<String>,
    pub balance: Option<f64>,
    pub iban: Option<String>,
    pub is_mine: bool,
}

/// Bank accounts envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct BankAccountListResponse {
    pub ok: bool,
    pub items: Vec<BankAccountItem>,
    pub total: u32,
    pub mine: u32,
    pub error_code: Option<String>,
    pub message: String,
}

/// Export envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    /// Final written path on success.
    pub path: Option<String>,
    pub error_code: Option<String>,
    pub message: String,
}

/// Loads a save picked by the UI file dialog.
///
/// # FFI contract
/// - `path == None` means the dialog was cancelled (`cancelled`).
/// - A failed load keeps the previously loaded document.
#[flutter_rust_bridge::frb(sync)]
pub fn load_save(path: Option<String>) -> SaveActionResponse {
    let result = with_session(|session| {
        let path = path.ok_or(SessionError::Io(IoError::Cancelled))?;
        let sections = session.load_file(path.trim())?.len();
        Ok(sections)
    });
    match result {
        Ok(sections) => SaveActionResponse::success(format!("Loaded {sections} section(s).")),
        Err(err) => SaveActionResponse::failure("load_save", &err),
    }
}

/// Drops the loaded document.
#[flutter_rust_bridge::frb(sync)]
pub fn close_session() -> SaveActionResponse {
    match with_session(|session| {
        session.close();
        Ok(())
    }) {
        Ok(()) => SaveActionResponse::success("Session closed."),
        Err(err) => SaveActionResponse::failure("close_session", &err),
    }
}

/// Lists top-level sections in save order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_sections() -> SectionListResponse {
    match with_session(|session| session.section_summaries()) {
        Ok(summaries) => SectionListResponse {
            ok: true,
            items: summaries
                .into_iter()
                .map(|summary| SectionItem {
                    name: summary.name,
                    kind: summary.kind.label().to_string(),
                    child_count: summary.child_count.map(clamp_u32),
                })
                .collect(),
            error_code: None,
            message: String::new(),
        },
        Err(err) => SectionListResponse {
            ok: false,
            items: Vec::new(),
            error_code: Some(err.code().to_string()),
            message: format!("list_sections failed: {err}"),
        },
    }
}

/// Indented JSON for one section.
#[flutter_rust_bridge::frb(sync)]
pub fn section_json(name: String) -> TextResponse {
    TextResponse::from_result(
        "section_json",
        with_session(|session| session.section_text(name.as_str())),
    )
}

/// Indented JSON of the value at a JSON pointer (`/Bank/accounts/0`).
#[flutter_rust_bridge::frb(sync)]
pub fn get_value_json(pointer: String) -> TextResponse {
    TextResponse::from_result(
        "get_value_json",
        with_session(|session| {
            let path = Path::parse_pointer(pointer.as_str())?;
            let node = session.get(&path)?;
            Ok(hhsav_core::codec::writer::to_pretty_string(node)?)
        }),
    )
}

/// Replaces the value at a JSON pointer with parsed `json`.
///
/// Numbers keep the kind they are typed with: `3` is an integer, `3.0` a
/// float.
#[flutter_rust_bridge::frb(sync)]
pub fn set_value_json(pointer: String, json: String) -> SaveActionResponse {
    let result = with_session(|session| {
        let path = Path::parse_pointer(pointer.as_str())?;
        let value = parse_value(json.as_str())?;
        session.set(&path, value)
    });
    match result {
        Ok(()) => SaveActionResponse::success("Value updated."),
        Err(err) => SaveActionResponse::failure("set_value_json", &err),
    }
}

/// Lists bank accounts with header totals.
#[flutter_rust_bridge::frb(sync)]
pub fn list_bank_accounts() -> BankAccountListResponse {
    let result = with_session(|session| {
        let accounts = session.bank_accounts()?;
        let summary = session.bank_summary()?;
        Ok((accounts, summary))
    });
    match result {
        Ok((accounts, summary)) => BankAccountListResponse {
            ok: true,
            items: accounts
                .into_iter()
                .enumerate()
                .map(|(index, account)| to_bank_account_item(index, account))
                .collect(),
            total: clamp_u32(summary.total),
            mine: clamp_u32(summary.mine),
            error_code: None,
            message: String::new(),
        },
        Err(err) => BankAccountListResponse {
            ok: false,
            items: Vec::new(),
            total: 0,
            mine: 0,
            error_code: Some(err.code().to_string()),
            message: format!("list_bank_accounts failed: {err}"),
        },
    }
}

/// Applies the edit-modal fields to one account.
///
/// `None` leaves the corresponding key untouched. A non-finite balance is
/// rejected with `invalid_value`.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_bank_account(
    index: u32,
    holder_name: Option<String>,
    balance: Option<f64>,
) -> SaveActionResponse {
    let record = BankAccount {
        holder_name,
        balance,
        ..BankAccount::default()
    };
    match with_session(|session| session.write_bank_account(index as usize, &record)) {
        Ok(()) => SaveActionResponse::success("Account updated."),
        Err(err) => SaveActionResponse::failure("edit_bank_account", &err),
    }
}

/// Suggested file name for the save dialog (`hackhub_edited_<ts>.hhsav`).
///
/// `format` is the target extension (`hhsav|json`); anything else falls
/// back to the container format.
#[flutter_rust_bridge::frb(sync)]
pub fn suggested_file_name(format: String) -> String {
    let format = Format::from_extension(format.trim()).unwrap_or(Format::Proprietary);
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    match with_session(|session| session.suggested_file_name(format, timestamp_ms)) {
        Ok(name) => name,
        Err(err) => {
            warn!(
                "event=suggest_name module=ffi status=error error_code={}",
                err.code()
            );
            format!("save.{}", format.extension())
        }
    }
}

/// Writes the `.hhsav` container to the path picked by the UI.
#[flutter_rust_bridge::frb(sync)]
pub fn export_proprietary(path: Option<String>) -> ExportResponse {
    export_as(Format::Proprietary, path)
}

/// Writes indented JSON to the path picked by the UI.
#[flutter_rust_bridge::frb(sync)]
pub fn export_interchange(path: Option<String>) -> ExportResponse {
    export_as(Format::Interchange, path)
}

fn export_as(format: Format, path: Option<String>) -> ExportResponse {
    let result = with_session(|session| {
        session.document()?;
        let path = path.ok_or(SessionError::Io(IoError::Cancelled))?;
        session.export_to(format, path.trim())
    });
    match result {
        Ok(written) => ExportResponse {
            ok: true,
            path: Some(written.display().to_string()),
            error_code: None,
            message: match format {
                Format::Proprietary => "File saved successfully!".to_string(),
                Format::Interchange => "JSON exported successfully!".to_string(),
            },
        },
        Err(err) => ExportResponse {
            ok: false,
            path: None,
            error_code: Some(err.code().to_string()),
            message: format!("export {} failed: {err}", format.label()),
        },
    }
}

/// Runs `f` with exclusive access to the live session.
fn with_session<T>(
    f: impl FnOnce(&mut Session) -> Result<T, SessionError>,
) -> Result<T, SessionError> {
    let mut guard = match SESSION.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::WouldBlock) => {
            warn!("event=session_busy module=ffi status=rejected");
            return Err(SessionError::Busy);
        }
        // Edits are single value replacements; a panic cannot leave one half-applied.
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
    };
    f(&mut guard)
}

fn to_bank_account_item(index: usize, account: BankAccount) -> BankAccountItem {
    BankAccountItem {
        index: clamp_u32(index),
        display_name: account.display_name().to_string(),
        is_mine: account.is_primary(),
        id: account.id,
        provider: account.provider,
        balance: account.balance,
        iban: account.iban,
    }
}

fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        close_session, core_version, edit_bank_account, export_interchange, export_proprietary,
        get_value_json, init_logging, list_bank_accounts, list_sections, load_save, ping,
        section_json, set_value_json, suggested_file_name, with_session, SESSION,
    };
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::sync::Mutex;

    // Tests share the process-wide session; run them one at a time.
    static SERIAL: Mutex<()> = Mutex::new(());

    const SAVE_JSON: &str = r#"{"Bank":{"accounts":[{"id":"a1","accountName":"Alice","balance":500.0,"isMine":true},{"id":"b2","fullName":"Bob","balance":12}]},"Suspicion":3}"#;

    fn write_save(dir: &std::path::Path) -> String {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAVE_JSON.as_bytes()).unwrap();
        let path = dir.join("slot.hhsav");
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn load_edit_and_export_through_boundary() {
        let _serial = SERIAL.lock().unwrap_or_else(|err| err.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let source = write_save(dir.path());

        let loaded = load_save(Some(source));
        assert!(loaded.ok, "{}", loaded.message);

        let sections = list_sections();
        assert!(sections.ok);
        let names: Vec<&str> = sections.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Bank", "Suspicion"]);

        let accounts = list_bank_accounts();
        assert_eq!(accounts.total, 2);
        assert_eq!(accounts.mine, 1);
        assert_eq!(accounts.items[1].display_name, "Bob");

        let edited = edit_bank_account(1, None, Some(99.5));
        assert!(edited.ok, "{}", edited.message);
        let value = get_value_json("/Bank/accounts/1/balance".to_string());
        assert_eq!(value.text.as_deref(), Some("99.5"));

        let out = dir.path().join("out.json");
        let exported = export_interchange(Some(out.to_str().unwrap().to_string()));
        assert!(exported.ok, "{}", exported.message);
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("\"balance\": 99.5"));
        assert!(text.contains("\"Suspicion\": 3\n"));

        let section = section_json("Suspicion".to_string());
        assert_eq!(section.text.as_deref(), Some("3"));

        close_session();
    }

    #[test]
    fn cancelled_dialogs_and_empty_session_report_codes() {
        let _serial = SERIAL.lock().unwrap_or_else(|err| err.into_inner());
        close_session();

        let response = export_proprietary(Some("/tmp/never.hhsav".to_string()));
        assert_eq!(response.error_code.as_deref(), Some("no_document"));
        let response = list_sections();
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("no_document"));

        let response = load_save(None);
        assert_eq!(response.error_code.as_deref(), Some("cancelled"));

        let dir = tempfile::tempdir().unwrap();
        assert!(load_save(Some(write_save(dir.path()))).ok);
        let response = export_proprietary(None);
        assert_eq!(response.error_code.as_deref(), Some("cancelled"));

        let response = edit_bank_account(5, None, Some(1.0));
        assert_eq!(response.error_code.as_deref(), Some("path_error"));

        let response = edit_bank_account(0, None, Some(f64::NAN));
        assert_eq!(response.error_code.as_deref(), Some("invalid_value"));
        assert!(export_proprietary(Some(
            dir.path().join("after.hhsav").to_str().unwrap().to_string()
        ))
        .ok);

        let response = set_value_json("/Suspicion".to_string(), "{\"a\":1,\"a\":2}".to_string());
        assert_eq!(response.error_code.as_deref(), Some("decode_failed"));

        assert!(suggested_file_name("hhsav".to_string()).ends_with(".hhsav"));
        assert!(suggested_file_name("json".to_string()).ends_with(".json"));
        close_session();
    }

    #[test]
    fn concurrent_call_is_rejected_as_busy() {
        let _serial = SERIAL.lock().unwrap_or_else(|err| err.into_inner());
        let _held = SESSION.lock().unwrap_or_else(|err| err.into_inner());
        let response = load_save(Some("/tmp/whatever.hhsav".to_string()));
        assert_eq!(response.error_code.as_deref(), Some("busy"));
        assert_eq!(list_sections().error_code.as_deref(), Some("busy"));
        assert!(matches!(
            with_session(|_| Ok(())),
            Err(hhsav_core::SessionError::Busy)
        ));
    }
}
