use clinica_core::ClinicaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported filter on {kind}: {fields}")]
    UnsupportedFilter { kind: String, fields: String },

    #[error("Store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for ClinicaError {
    fn from(err: StoreError) -> Self {
        ClinicaError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_storage_error() {
        let err: ClinicaError = StoreError::Poisoned.into();
        assert!(matches!(err, ClinicaError::Storage(_)));
        assert_eq!(err.code(), "storage");
    }
}
