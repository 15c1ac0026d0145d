use std::collections::BTreeMap;
use std::future::Future;
use std::sync::RwLock;

use serde_json::Value;

use super::records::{LedgerRecord, RecordKind};
use crate::types::Month;

/// Attribute names written alongside every record.
const PARTITION_KEY: &str = "month";
const SORT_KEY: &str = "entryId";
const RECORD_TYPE_KEY: &str = "recordType";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("Table name is not configured for {0} records")]
    TableNotConfigured(&'static str),

    #[error("Record encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Table names per record kind.
#[derive(Debug, Clone)]
pub struct LedgerTables {
    pub transactions: String,
    pub memos: String,
}

impl LedgerTables {
    /// Resolve the table for `kind`, refusing blank names.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotConfigured`] if the name is blank.
    pub fn table_for(&self, kind: RecordKind) -> Result<&str, StoreError> {
        let name = match kind {
            RecordKind::Transaction => &self.transactions,
            RecordKind::Memo => &self.memos,
        };
        if name.trim().is_empty() {
            return Err(StoreError::TableNotConfigured(kind.as_str()));
        }
        Ok(name)
    }
}

impl Default for LedgerTables {
    fn default() -> Self {
        Self {
            transactions: "transactions".into(),
            memos: "memos".into(),
        }
    }
}

/// Month-partitioned record persistence.
///
/// # Example
///
/// ```rust,ignore
/// impl LedgerStore for DynamoLedger {
///     async fn query_by_month<R: LedgerRecord>(&self, month: &Month) -> Result<Vec<R>, StoreError> {
///         self.query(R::KIND, month.as_str()).await
///     }
///
///     async fn put_item<R: LedgerRecord>(&self, record: &R) -> Result<(), StoreError> {
///         self.put(R::KIND, record).await
///     }
/// }
/// ```
pub trait LedgerStore: Send + Sync + 'static {
    /// All records of kind `R` in `month`, ordered by sort key.
    fn query_by_month<R: LedgerRecord>(
        &self,
        month: &Month,
    ) -> impl Future<Output = Result<Vec<R>, StoreError>> + Send;

    /// Insert a single record.
    fn put_item<R: LedgerRecord>(
        &self,
        record: &R,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ItemKey {
    table: String,
    month: String,
    entry_key: String,
}

/// In-process [`LedgerStore`] keeping items as JSON documents.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    tables: LedgerTables,
    items: RwLock<BTreeMap<ItemKey, Value>>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new(tables: LedgerTables) -> Self {
        Self {
            tables,
            items: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored items across all tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for MemoryLedger {
    async fn query_by_month<R: LedgerRecord>(&self, month: &Month) -> Result<Vec<R>, StoreError> {
        let table = self.tables.table_for(R::KIND)?;
        let items = self
            .items
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        items
            .iter()
            .filter(|(key, _)| key.table == table && key.month == month.as_str())
            .filter(|(_, item)| {
                item.get(RECORD_TYPE_KEY).and_then(Value::as_str) == Some(R::KIND.as_str())
            })
            .map(|(_, item)| serde_json::from_value(item.clone()).map_err(StoreError::from))
            .collect()
    }

    async fn put_item<R: LedgerRecord>(&self, record: &R) -> Result<(), StoreError> {
        let table = self.tables.table_for(R::KIND)?.to_string();
        let month = record.month();
        let entry_key = record.entry_key();

        let mut item = serde_json::to_value(record)?;
        if let Value::Object(map) = &mut item {
            map.insert(PARTITION_KEY.into(), Value::from(month.as_str()));
            map.insert(SORT_KEY.into(), Value::from(entry_key.as_str()));
            map.insert(RECORD_TYPE_KEY.into(), Value::from(R::KIND.as_str()));
        }

        let key = ItemKey {
            table,
            month: month.into(),
            entry_key,
        };
        self.items
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .insert(key, item);
        Ok(())
    }
}
