//! ReDB-based consultation storage
//!
//! Key: internal document id (UUID). Value: the consultation as JSON.
//! Lookups by field scan the table and evaluate the filter in memory.

use crate::error::{Result, StoreError};
use clinica_core::Consultation;
use clinica_core::store::{DocumentStore, Filter};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

const CONSULTATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("consultations");

/// ReDB-backed consultation store
pub struct RedbStore {
    db: Database,
}

#[allow(clippy::result_large_err)]
impl RedbStore {
    /// Open the store (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path)?;

        // Initialize table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CONSULTATIONS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Raw document by id
    pub fn load(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONSULTATIONS)?;

        match table.get(id)? {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    /// Write a document under its id, replacing any previous value
    pub fn put(&self, id: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CONSULTATIONS)?;
            table.insert(id, data)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Write a document only if its id is already present
    pub fn put_existing(&self, id: &str, data: &[u8]) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let replaced = {
            let mut table = write_txn.open_table(CONSULTATIONS)?;
            let present = table.get(id)?.is_some();
            if present {
                table.insert(id, data)?;
            }
            present
        };
        write_txn.commit()?;
        Ok(replaced)
    }

    pub fn remove(&self, id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(CONSULTATIONS)?;
            table.remove(id)?.is_some()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Every stored consultation
    pub fn scan(&self) -> Result<Vec<Consultation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONSULTATIONS)?;

        let mut consultations = Vec::new();
        for entry in table.range::<&str>(..)? {
            let (_, value) = entry?;
            consultations.push(serde_json::from_slice(value.value())?);
        }
        Ok(consultations)
    }

    pub fn count(&self) -> Result<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONSULTATIONS)?;
        Ok(table.len()?)
    }
}

impl DocumentStore for RedbStore {
    fn insert_consultation(&self, consultation: &Consultation) -> clinica_core::Result<()> {
        let data = serde_json::to_vec(consultation).map_err(StoreError::from)?;
        self.put(&consultation.id, &data)?;
        Ok(())
    }

    fn find_consultations(&self, filter: &Filter) -> clinica_core::Result<Vec<Consultation>> {
        let mut found = Vec::new();
        for consultation in self.scan()? {
            let document = serde_json::to_value(&consultation).map_err(StoreError::from)?;
            if filter.matches(&document) {
                found.push(consultation);
            }
        }
        Ok(found)
    }

    fn replace_consultation(&self, consultation: &Consultation) -> clinica_core::Result<bool> {
        let data = serde_json::to_vec(consultation).map_err(StoreError::from)?;
        Ok(self.put_existing(&consultation.id, &data)?)
    }

    fn delete_consultation(&self, id: &str) -> clinica_core::Result<bool> {
        Ok(self.remove(id)?)
    }
}
