//! Store abstractions consumed by the services
//!
//! Relational records (accounts, doctors, patients, appointments) go through
//! [`RecordStore`]; consultations go through [`DocumentStore`]. Lookups return
//! `Option`/`Vec`, a miss is never an error.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::model::Consultation;

/// A record type held by a [`RecordStore`]
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Kind name, also used in messages and links
    const KIND: &'static str;

    /// Serialized field names that may appear in a [`Filter`]
    const FILTERABLE: &'static [&'static str];

    /// Whether the store assigns the key on insert
    const GENERATED_KEY: bool = true;

    /// Identifier as stored
    fn key(&self) -> String;

    /// Receive a store-generated key. Natural-key records ignore it.
    fn assign_key(&mut self, _key: i64) {}
}

/// Conjunction of field equality clauses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(&'static str, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `field == value`
    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.clauses.push((field, value.into()));
        self
    }

    pub fn clauses(&self) -> &[(&'static str, Value)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the filter against a serialized record
    pub fn matches(&self, document: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| document.get(*field) == Some(expected))
    }

    /// Field names this filter uses that `R` does not allow
    pub fn unknown_fields<R: Record>(&self) -> Vec<&'static str> {
        self.clauses
            .iter()
            .map(|(field, _)| *field)
            .filter(|field| !R::FILTERABLE.contains(field))
            .collect()
    }
}

/// Relational store: point lookups, equality filters, create, replace, delete
pub trait RecordStore: Send + Sync {
    /// Look up a record by key
    fn get<R: Record>(&self, key: &str) -> Result<Option<R>>;

    /// All records matching the filter (every record for an empty filter)
    fn find<R: Record>(&self, filter: &Filter) -> Result<Vec<R>>;

    /// Persist a new record, assigning its key if the kind uses generated keys
    fn insert<R: Record>(&self, record: R) -> Result<R>;

    /// Replace an existing record. Returns false if the key is unknown.
    fn update<R: Record>(&self, record: &R) -> Result<bool>;

    /// Delete by key. Returns false if the key is unknown.
    fn delete<R: Record>(&self, key: &str) -> Result<bool>;

    /// First record matching the filter
    fn find_one<R: Record>(&self, filter: &Filter) -> Result<Option<R>> {
        Ok(self.find(filter)?.into_iter().next())
    }
}

/// Document store for consultations
pub trait DocumentStore: Send + Sync {
    fn insert_consultation(&self, consultation: &Consultation) -> Result<()>;

    /// Documents matching the filter, in no particular order
    fn find_consultations(&self, filter: &Filter) -> Result<Vec<Consultation>>;

    /// Replace the document with the same internal id
    fn replace_consultation(&self, consultation: &Consultation) -> Result<bool>;

    fn delete_consultation(&self, id: &str) -> Result<bool>;
}
