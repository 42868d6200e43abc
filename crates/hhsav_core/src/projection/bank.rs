//! Bank account projection over `Bank/accounts`.
//!
//! # Responsibility
//! - Expose each account element as a `BankAccount` record.
//! - Apply record edits while keeping unknown account keys intact.
//!
//! # Invariants
//! - `None` means "not represented": the key is neither read-coerced nor
//!   written.
//! - Holder name reads the first of `accountName`, `fullName` holding
//!   non-empty text, and writes go back to that same key.
//! - Writing back an unchanged record leaves the element unchanged.
//! - A changed balance is written as a `Float` node.

use crate::model::document::Document;
use crate::model::node::{KeyedMap, Node};
use crate::model::path::{Path, PathError};
use crate::projection::{self, Projection};
use log::warn;

pub const BANK_SECTION: &str = "Bank";
pub const ACCOUNTS_KEY: &str = "accounts";

const ID_KEY: &str = "id";
const ACCOUNT_NAME_KEY: &str = "accountName";
const FULL_NAME_KEY: &str = "fullName";
const PROVIDER_KEY: &str = "provider";
const BALANCE_KEY: &str = "balance";
const IBAN_KEY: &str = "IBAN";
const IS_MINE_KEY: &str = "isMine";

/// Structured view of one bank account element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BankAccount {
    /// Stable identifier, when the save has one.
    pub id: Option<String>,
    pub holder_name: Option<String>,
    pub provider: Option<String>,
    /// Signed; Integer and Float sources both read as `f64`.
    pub balance: Option<f64>,
    pub iban: Option<String>,
    /// Marks the player's own account.
    pub is_mine: Option<bool>,
}

impl BankAccount {
    /// Name for display; mirrors the editor's `Unknown` placeholder.
    pub fn display_name(&self) -> &str {
        self.holder_name.as_deref().unwrap_or("Unknown")
    }

    pub fn is_primary(&self) -> bool {
        self.is_mine.unwrap_or(false)
    }
}

/// Aggregate figures for the bank view header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankSummary {
    pub total: usize,
    pub mine: usize,
}

/// Projection of `Bank/accounts` onto `BankAccount`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BankAccounts;

impl Projection for BankAccounts {
    type Record = BankAccount;

    fn sequence_path(&self) -> Path {
        Path::section(BANK_SECTION).key(ACCOUNTS_KEY)
    }

    fn read_record(&self, fields: &KeyedMap) -> BankAccount {
        BankAccount {
            id: text_field(fields, ID_KEY),
            holder_name: holder_name_source(fields).and_then(|key| text_field(fields, key)),
            provider: text_field(fields, PROVIDER_KEY),
            balance: fields.get(BALANCE_KEY).and_then(Node::as_number),
            iban: text_field(fields, IBAN_KEY),
            is_mine: fields.get(IS_MINE_KEY).and_then(Node::as_bool),
        }
    }

    fn write_record(&self, fields: &mut KeyedMap, record: &BankAccount) {
        set_text(fields, ID_KEY, record.id.as_deref());
        if let Some(name) = record.holder_name.as_deref() {
            let key = holder_name_target(fields);
            fields.insert(key.to_string(), Node::from(name));
        }
        set_text(fields, PROVIDER_KEY, record.provider.as_deref());
        if let Some(balance) = record.balance {
            write_balance(fields, balance);
        }
        set_text(fields, IBAN_KEY, record.iban.as_deref());
        if let Some(is_mine) = record.is_mine {
            fields.insert(IS_MINE_KEY.to_string(), Node::Boolean(is_mine));
        }
    }
}

impl BankAccounts {
    pub fn read(&self, document: &Document) -> Result<Vec<BankAccount>, PathError> {
        projection::read(self, document)
    }

    pub fn write_at(
        &self,
        document: &mut Document,
        index: usize,
        record: &BankAccount,
    ) -> Result<(), PathError> {
        projection::write_at(self, document, index, record)
    }

    pub fn summary(&self, document: &Document) -> Result<BankSummary, PathError> {
        let accounts = self.read(document)?;
        Ok(BankSummary {
            total: accounts.len(),
            mine: accounts.iter().filter(|account| account.is_primary()).count(),
        })
    }
}

/// Key the holder name is read from: the first of `accountName`,
/// `fullName` holding non-empty text.
fn holder_name_source(fields: &KeyedMap) -> Option<&'static str> {
    [ACCOUNT_NAME_KEY, FULL_NAME_KEY].into_iter().find(|key| {
        fields
            .get(*key)
            .and_then(Node::as_str)
            .is_some_and(|name| !name.is_empty())
    })
}

/// Key that receives holder name edits: the read source, else whichever
/// name key already exists, else `accountName`.
fn holder_name_target(fields: &KeyedMap) -> &'static str {
    holder_name_source(fields).unwrap_or_else(|| {
        if fields.contains_key(ACCOUNT_NAME_KEY) || !fields.contains_key(FULL_NAME_KEY) {
            ACCOUNT_NAME_KEY
        } else {
            FULL_NAME_KEY
        }
    })
}

/// An equal stored number is left as is, so an Integer keeps its kind.
fn write_balance(fields: &mut KeyedMap, balance: f64) {
    match fields.get(BALANCE_KEY) {
        Some(current) if current.as_number() == Some(balance) => return,
        Some(Node::Integer(_)) => warn!(
            "event=balance_kind_narrowed module=projection status=warn from=integer to=float"
        ),
        _ => {}
    }
    fields.insert(BALANCE_KEY.to_string(), Node::Float(balance));
}

fn text_field(fields: &KeyedMap, key: &str) -> Option<String> {
    fields.get(key).and_then(Node::as_str).map(str::to_string)
}

fn set_text(fields: &mut KeyedMap, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), Node::from(value));
    }
}
