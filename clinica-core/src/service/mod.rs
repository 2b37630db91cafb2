//! Resource handlers
//!
//! Each operation runs `validate → check conflicts → persist` against the
//! store traits and returns the stored entity or a typed failure. Shaping and
//! HTTP mapping happen in the server.

pub mod accounts;
pub mod appointments;
pub mod consultations;
pub mod doctors;
pub mod patients;

use serde_json::Value;
use std::collections::HashMap;

use crate::error::{ClinicaError, Result};
use crate::store::{Filter, Record, RecordStore};

/// Query-string parameters of a list request
pub type Params = HashMap<String, String>;

/// Load a record or fail with not found
pub fn require<R: Record, S: RecordStore>(store: &S, key: &str) -> Result<R> {
    store
        .get::<R>(key)?
        .ok_or_else(|| ClinicaError::not_found(R::KIND, key))
}

/// Records matching the filter; an empty result is a not found
pub fn find_matching<R: Record, S: RecordStore>(store: &S, filter: &Filter) -> Result<Vec<R>> {
    let found = store.find::<R>(filter)?;
    if found.is_empty() {
        return Err(ClinicaError::not_found(R::KIND, describe(filter)));
    }
    Ok(found)
}

/// Replace a record that was loaded earlier in the same operation
pub(crate) fn save<R: Record, S: RecordStore>(store: &S, record: &R) -> Result<()> {
    if store.update(record)? {
        Ok(())
    } else {
        Err(ClinicaError::not_found(R::KIND, record.key()))
    }
}

/// Delete by key, failing with not found if nothing was removed
pub fn remove<R: Record, S: RecordStore>(store: &S, key: &str) -> Result<()> {
    if store.delete::<R>(key)? {
        tracing::info!(kind = R::KIND, id = key, "Record deleted");
        Ok(())
    } else {
        Err(ClinicaError::not_found(R::KIND, key))
    }
}

/// Non-empty parameter value
pub(crate) fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn describe(filter: &Filter) -> String {
    if filter.is_empty() {
        return "no records".to_string();
    }
    filter
        .clauses()
        .iter()
        .map(|(field, value)| match value {
            Value::String(s) => format!("{}={}", field, s),
            other => format!("{}={}", field, other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
