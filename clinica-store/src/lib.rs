pub mod error;
pub mod redb_store;
pub mod sqlite_audit;
pub mod sqlite_store;

pub use error::{Result, StoreError};
pub use redb_store::RedbStore;
pub use sqlite_audit::{AuditEntry, AuditLog, AuditRow, Operation};
pub use sqlite_store::SqliteStore;
