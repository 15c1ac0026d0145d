//! Month-scoped transaction and memo records.

mod records;
mod store;

pub use records::{
    EntryType, LedgerRecord, Memo, MemoPayload, MemoTag, RecordKind, Transaction,
    TransactionPayload,
};
pub use store::{LedgerStore, LedgerTables, MemoryLedger, StoreError};
