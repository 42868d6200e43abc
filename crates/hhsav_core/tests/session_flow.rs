mod common;

use common::{game_container, SAMPLE_JSON};
use hhsav_core::{
    decode, BankAccount, EditorConfig, Format, IoError, Node, NodeKind, Path, Session,
    SessionError,
};

fn loaded_session() -> Session {
    let mut session = Session::new(EditorConfig::default());
    session
        .load_bytes(&game_container(SAMPLE_JSON), Format::Proprietary, "slot1.hhsav")
        .unwrap();
    session
}

#[test]
fn load_edit_export_reload_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("slot1.hhsav");
    std::fs::write(&source, game_container(SAMPLE_JSON)).unwrap();

    let mut session = Session::default();
    session.load_file(&source).unwrap();
    assert_eq!(session.source().unwrap().name, "slot1.hhsav");
    assert_eq!(session.source().unwrap().format, Format::Proprietary);

    let edit = BankAccount {
        holder_name: Some("Alice Cooper".to_string()),
        balance: Some(9_999.99),
        ..BankAccount::default()
    };
    session.write_bank_account(0, &edit).unwrap();
    assert!(session.is_dirty());

    let edited = session.document().unwrap().clone();
    let container = session
        .export_to(Format::Proprietary, dir.path().join("out.hhsav"))
        .unwrap();
    let json = session
        .export_to(Format::Interchange, dir.path().join("out.json"))
        .unwrap();

    let mut reloaded = Session::default();
    assert_eq!(reloaded.load_file(&container).unwrap(), &edited);
    assert_eq!(reloaded.load_file(&json).unwrap(), &edited);
    assert_eq!(reloaded.source().unwrap().format, Format::Interchange);

    let accounts = reloaded.bank_accounts().unwrap();
    assert_eq!(accounts[0].holder_name.as_deref(), Some("Alice Cooper"));
    assert_eq!(accounts[0].balance, Some(9_999.99));
}

#[test]
fn malformed_load_keeps_previous_document() {
    let mut session = loaded_session();
    let before = session.document().unwrap().clone();

    let mut truncated = game_container(r#"{"Suspicion":9}"#);
    truncated.truncate(truncated.len() - 4);
    let err = session
        .load_bytes(&truncated, Format::Proprietary, "broken.hhsav")
        .unwrap_err();
    assert!(matches!(err, SessionError::Decode(_)));

    assert_eq!(session.document().unwrap(), &before);
    assert_eq!(session.source().unwrap().name, "slot1.hhsav");
}

#[test]
fn malformed_load_on_empty_session_stays_empty() {
    let mut session = Session::default();
    let err = session
        .load_bytes(b"not a save", Format::Proprietary, "junk")
        .unwrap_err();
    assert_eq!(err.code(), "decode_failed");
    assert!(!session.is_loaded());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::default();
    let err = session.load_file(dir.path().join("nope.hhsav")).unwrap_err();
    assert!(matches!(err, SessionError::Io(IoError::Read { .. })));
}

#[test]
fn failed_export_leaves_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.hhsav");
    let mut session = loaded_session();
    session
        .set(
            &Path::section("Quests").index(0).key("progress"),
            Node::Float(f64::INFINITY),
        )
        .unwrap();

    let err = session.export_to(Format::Proprietary, &target).unwrap_err();
    assert!(matches!(err, SessionError::Encode(_)));
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn raw_view_lists_sections_and_renders_text() {
    let session = loaded_session();
    let summaries = session.section_summaries().unwrap();
    assert_eq!(summaries.len(), 6);
    assert_eq!(summaries[0].name, "AppStore");
    assert_eq!(summaries[0].kind, NodeKind::Keyed);
    assert_eq!(summaries[0].child_count, Some(2));
    assert_eq!(summaries[4].kind, NodeKind::Integer);
    assert_eq!(summaries[4].child_count, None);

    let text = session.section_text("Terminal").unwrap();
    assert_eq!(
        text,
        "{\n  \"history\": [\n    \"ls\",\n    \"cat notes.txt\"\n  ],\n  \"cwd\": \"/home\"\n}"
    );
    assert!(matches!(
        session.section_text("Nope"),
        Err(SessionError::Path(_))
    ));
}

#[test]
fn raw_pointer_edits_go_through_the_session() {
    let mut session = loaded_session();
    let pointer = Path::parse_pointer("/AppStore/purchasedItems/0").unwrap();
    session.set(&pointer, Node::from("vpn_basic")).unwrap();
    assert_eq!(session.get(&pointer).unwrap(), &Node::from("vpn_basic"));

    let list = Path::parse_pointer("/AppStore/unlockedMarketItems").unwrap();
    session.insert(&list, 0, Node::from("exploit_kit")).unwrap();
    assert_eq!(session.get(&list).unwrap().child_count(), Some(1));

    let beyond = Path::parse_pointer("/AppStore/unlockedMarketItems/3").unwrap();
    assert!(matches!(
        session.set(&beyond, Node::Null),
        Err(SessionError::Path(_))
    ));

    let bytes = session.export(Format::Interchange).unwrap();
    let reloaded = decode(&bytes, Format::Interchange).unwrap();
    assert_eq!(reloaded, *session.document().unwrap());
}

#[test]
fn export_does_not_change_state() {
    let session = loaded_session();
    let before = session.document().unwrap().clone();
    session.export(Format::Proprietary).unwrap();
    session.export(Format::Interchange).unwrap();
    assert_eq!(session.document().unwrap(), &before);
    assert!(!session.is_dirty());
}

#[test]
fn suggested_names_use_configured_prefix() {
    let config = EditorConfig {
        file_prefix: "slot".to_string(),
        ..EditorConfig::default()
    };
    let session = Session::new(config);
    assert_eq!(
        session.suggested_file_name(Format::Proprietary, 7).unwrap(),
        "slot_edited_7.hhsav"
    );
    assert_eq!(
        session.suggested_file_name(Format::Interchange, 7).unwrap(),
        "slot_raw_7.json"
    );
}

#[test]
fn edits_nested_past_the_depth_limit_fail_to_export() {
    let mut session = Session::default();
    session
        .load_bytes(br#"{"a":null}"#, Format::Interchange, "deep.json")
        .unwrap();

    // The raw view accepts a value at the full limit on its own...
    let text = format!("{}{}", "[".repeat(512), "]".repeat(512));
    let value = hhsav_core::parse_value(&text).unwrap();
    session.set(&Path::section("a"), value).unwrap();

    // ...but under a section it sits one level too deep to read back.
    for format in [Format::Proprietary, Format::Interchange] {
        let err = session.export(format).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Encode(hhsav_core::EncodeError::TooDeep { max_depth: 512, .. })
        ));
    }

    let text = format!("{}{}", "[".repeat(511), "]".repeat(511));
    let value = hhsav_core::parse_value(&text).unwrap();
    session.set(&Path::section("a"), value).unwrap();
    for format in [Format::Proprietary, Format::Interchange] {
        let bytes = session.export(format).unwrap();
        assert_eq!(decode(&bytes, format).unwrap(), *session.document().unwrap());
    }
}
