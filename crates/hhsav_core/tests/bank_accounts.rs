mod common;

use common::{game_container, inflate, SAMPLE_JSON};
use hhsav_core::{
    decode, encode, BankAccount, BankAccounts, BankSummary, Format, Node, Path, PathError,
};

fn sample_doc() -> hhsav_core::Document {
    decode(&game_container(SAMPLE_JSON), Format::Proprietary).unwrap()
}

#[test]
fn read_maps_each_account_in_order() {
    let accounts = BankAccounts.read(&sample_doc()).unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(
        accounts[0],
        BankAccount {
            id: Some("a1".to_string()),
            holder_name: Some("Alice".to_string()),
            provider: Some("NeoBank".to_string()),
            balance: Some(500.0),
            iban: Some("DE00".to_string()),
            is_mine: Some(true),
        }
    );
    assert_eq!(accounts[1].holder_name.as_deref(), Some("Bob"));
    assert_eq!(accounts[1].provider, None);
    assert_eq!(accounts[1].balance, Some(-20.0));
}

#[test]
fn balance_edit_changes_nothing_else() {
    let mut doc = sample_doc();
    let edit = BankAccount {
        balance: Some(250.5),
        ..BankAccount::default()
    };
    BankAccounts.write_at(&mut doc, 0, &edit).unwrap();

    let payload = inflate(&encode(&doc, Format::Proprietary).unwrap());
    let expected = SAMPLE_JSON.replacen("\"balance\":500.0", "\"balance\":250.5", 1);
    assert_eq!(payload, expected);
}

#[test]
fn unmodeled_keys_survive_a_full_record_write() {
    let mut doc = sample_doc();
    let mut record = BankAccounts.read(&doc).unwrap().remove(1);
    record.holder_name = Some("Robert".to_string());
    record.balance = Some(10.0);
    BankAccounts.write_at(&mut doc, 1, &record).unwrap();

    let element = doc
        .get(&Path::section("Bank").key("accounts").index(1))
        .and_then(Node::as_keyed)
        .unwrap();
    let keys: Vec<&str> = element.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["id", "fullName", "balance", "IBAN", "isMine", "futureField"]
    );
    assert_eq!(element.get("fullName"), Some(&Node::from("Robert")));
    assert_eq!(element.get("balance"), Some(&Node::Float(10.0)));

    let future = element.get("futureField").and_then(Node::as_keyed).unwrap();
    assert_eq!(future.get("tier"), Some(&Node::from(2_i64)));
    assert!(!element.contains_key("accountName"));
    assert!(!element.contains_key("provider"));
}

#[test]
fn write_beyond_sequence_fails_and_leaves_document_unchanged() {
    let mut doc = sample_doc();
    let before = doc.clone();
    let edit = BankAccount {
        balance: Some(1.0),
        ..BankAccount::default()
    };

    let err = BankAccounts.write_at(&mut doc, 5, &edit).unwrap_err();
    assert_eq!(
        err,
        PathError::IndexOutOfRange {
            path: "/Bank/accounts".to_string(),
            index: 5,
            len: 2,
        }
    );
    assert_eq!(doc, before);
}

#[test]
fn single_account_scenario_exports_expected_json() {
    let input = br#"{"Bank":{"accounts":[{"id":"a1","accountName":"Alice","balance":500.0,"IBAN":"DE00","isMine":true}]}}"#;
    let mut doc = decode(input, Format::Interchange).unwrap();

    let accounts = BankAccounts.read(&doc).unwrap();
    assert_eq!(accounts.len(), 1);

    let mut record = accounts[0].clone();
    record.balance = Some(250.5);
    BankAccounts.write_at(&mut doc, 0, &record).unwrap();

    let text = String::from_utf8(encode(&doc, Format::Interchange).unwrap()).unwrap();
    let expected = r#"{
  "Bank": {
    "accounts": [
      {
        "id": "a1",
        "accountName": "Alice",
        "balance": 250.5,
        "IBAN": "DE00",
        "isMine": true
      }
    ]
  }
}"#;
    assert_eq!(text, expected);
}

#[test]
fn summary_counts_primary_accounts() {
    assert_eq!(
        BankAccounts.summary(&sample_doc()).unwrap(),
        BankSummary { total: 2, mine: 1 }
    );
}

#[test]
fn missing_bank_section_is_a_path_error() {
    let doc = decode(br#"{"Suspicion":1}"#, Format::Interchange).unwrap();
    assert!(matches!(
        BankAccounts.read(&doc),
        Err(PathError::MissingKey { .. })
    ));
}

#[test]
fn non_sequence_accounts_is_not_addressable() {
    let mut doc = decode(br#"{"Bank":{"accounts":{}}}"#, Format::Interchange).unwrap();
    assert!(matches!(
        BankAccounts.read(&doc),
        Err(PathError::NotAddressable { .. })
    ));
    assert!(matches!(
        BankAccounts.write_at(&mut doc, 0, &BankAccount::default()),
        Err(PathError::NotAddressable { .. })
    ));
}

#[test]
fn writing_back_unchanged_records_is_a_no_op() {
    let inputs: [&[u8]; 2] = [
        br#"{"Bank":{"accounts":[{"accountName":null,"fullName":"Bob"},{"accountName":"","fullName":"Carol"},{"accountName":"","balance":7}]}}"#,
        SAMPLE_JSON.as_bytes(),
    ];
    for input in inputs {
        let mut doc = decode(input, Format::Interchange).unwrap();
        let before = doc.clone();
        let accounts = BankAccounts.read(&doc).unwrap();
        for (index, record) in accounts.iter().enumerate() {
            BankAccounts.write_at(&mut doc, index, record).unwrap();
        }
        assert_eq!(doc, before);
    }
}

#[test]
fn empty_account_name_falls_back_and_edits_follow_it() {
    let input = br#"{"Bank":{"accounts":[{"accountName":"","fullName":"Carol"}]}}"#;
    let mut doc = decode(input, Format::Interchange).unwrap();
    let mut record = BankAccounts.read(&doc).unwrap().remove(0);
    assert_eq!(record.display_name(), "Carol");

    record.holder_name = Some("Caroline".to_string());
    BankAccounts.write_at(&mut doc, 0, &record).unwrap();
    let element = doc
        .get(&Path::section("Bank").key("accounts").index(0))
        .and_then(Node::as_keyed)
        .unwrap();
    assert_eq!(element.get("accountName"), Some(&Node::from("")));
    assert_eq!(element.get("fullName"), Some(&Node::from("Caroline")));
}
