use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{EntryDate, Month, RecordId};

/// Which table a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Transaction,
    Memo,
}

impl RecordKind {
    /// Value of the record-type attribute used to filter queries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Memo => "memo",
        }
    }
}

/// A persisted ledger entry, partitioned by month and sorted by `"{date}#{id}"`.
pub trait LedgerRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    fn id(&self) -> RecordId;

    fn date(&self) -> &EntryDate;

    fn month(&self) -> Month {
        self.date().month()
    }

    fn entry_key(&self) -> String {
        format!("{}#{}", self.date(), self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoTag {
    Info,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: RecordId,
    pub date: EntryDate,
    pub amount: i64,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub category: String,
    #[serde(default)]
    pub note: String,
    pub payer: String,
}

impl LedgerRecord for Transaction {
    const KIND: RecordKind = RecordKind::Transaction;

    fn id(&self) -> RecordId {
        self.id
    }

    fn date(&self) -> &EntryDate {
        &self.date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub id: RecordId,
    pub date: EntryDate,
    pub title: String,
    pub body: String,
    pub tag: MemoTag,
}

impl LedgerRecord for Memo {
    const KIND: RecordKind = RecordKind::Memo;

    fn id(&self) -> RecordId {
        self.id
    }

    fn date(&self) -> &EntryDate {
        &self.date
    }
}

/// Body of `POST /api/transactions`. Every field is optional so that missing
/// fields surface as a validation error rather than a decode failure.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionPayload {
    pub date: Option<String>,
    pub amount: Option<i64>,
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub payer: Option<String>,
}

impl TryFrom<TransactionPayload> for Transaction {
    type Error = ValidationError;

    fn try_from(p: TransactionPayload) -> Result<Self, Self::Error> {
        let date = required(p.date, "date")?.parse::<EntryDate>()?;
        let amount = p.amount.ok_or(ValidationError::MissingField("amount"))?;
        let entry_type = p.entry_type.ok_or(ValidationError::MissingField("type"))?;
        Ok(Self {
            id: RecordId::generate(),
            date,
            amount,
            entry_type,
            category: required(p.category, "category")?,
            note: p.note.unwrap_or_default(),
            payer: required(p.payer, "payer")?,
        })
    }
}

/// Body of `POST /api/memos`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MemoPayload {
    pub date: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub tag: Option<MemoTag>,
}

impl TryFrom<MemoPayload> for Memo {
    type Error = ValidationError;

    fn try_from(p: MemoPayload) -> Result<Self, Self::Error> {
        let date = required(p.date, "date")?.parse::<EntryDate>()?;
        Ok(Self {
            id: RecordId::generate(),
            date,
            title: required(p.title, "title")?,
            body: required(p.body, "body")?,
            tag: p.tag.ok_or(ValidationError::MissingField("tag"))?,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ValidationError::MissingField(field))
}
