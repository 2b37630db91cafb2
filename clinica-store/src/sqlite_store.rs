//! SQLite-based record storage
//!
//! Schema:
//!   - records: JSON document per (kind, id)
//!   - sequences: last generated id per kind
//!
//! Equality filters are evaluated with `json_extract`; both the JSON path and
//! the compared value are bound as parameters.

use crate::error::{Result, StoreError};
use clinica_core::store::{Filter, Record, RecordStore};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Transaction, params, params_from_iter};
use serde_json::Value;
use std::ops::Deref;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed store for accounts, doctors, patients and appointments
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

#[allow(clippy::result_large_err)]
impl SqliteStore {
    /// Open the store (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for read-write concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                kind TEXT NOT NULL,
                id TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (kind, id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sequences (
                kind TEXT PRIMARY KEY,
                last INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Raw JSON of one record
    pub fn load(&self, kind: &str, id: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        select_value(&conn, kind, id)
    }

    /// Raw JSON of every record of `kind` matching the filter, oldest first
    pub fn select(&self, kind: &str, filter: &Filter) -> Result<Vec<String>> {
        let mut sql = String::from("SELECT value FROM records WHERE kind = ?");
        let mut bound = vec![SqlValue::Text(kind.to_string())];
        for (field, value) in filter.clauses() {
            sql.push_str(" AND json_extract(value, ?) = ?");
            bound.push(SqlValue::Text(format!("$.{}", field)));
            bound.push(to_sql_value(value));
        }
        sql.push_str(" ORDER BY rowid");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bound), |row| row.get::<_, String>(0))?;

        let mut values = Vec::new();
        for value in rows {
            values.push(value?);
        }
        Ok(values)
    }

    /// Replace the JSON of an existing record
    pub fn replace(&self, kind: &str, id: &str, value: &str) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute(
            "UPDATE records SET value = ? WHERE kind = ? AND id = ?",
            params![value, kind, id],
        )?;
        Ok(rows > 0)
    }

    pub fn remove(&self, kind: &str, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute(
            "DELETE FROM records WHERE kind = ? AND id = ?",
            params![kind, id],
        )?;
        Ok(rows > 0)
    }

    /// Record counts by kind
    pub fn count_by_kind(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT kind, COUNT(*) FROM records GROUP BY kind ORDER BY kind")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    /// Execute multiple operations atomically within an SQLite transaction
    pub fn in_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TransactionOps<'_>) -> Result<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let ops = TransactionOps { tx: &tx };
        let result = f(&ops)?;
        tx.commit()?;
        Ok(result)
    }
}

/// Operations available within a transaction
pub struct TransactionOps<'a> {
    tx: &'a Transaction<'a>,
}

#[allow(clippy::result_large_err)]
impl<'a> TransactionOps<'a> {
    /// Reserve the next generated id for `kind`, starting at 1
    pub fn next_id(&self, kind: &str) -> Result<i64> {
        let conn = self.tx.deref();
        conn.execute(
            "INSERT OR IGNORE INTO sequences (kind, last) VALUES (?, 0)",
            params![kind],
        )?;
        conn.execute(
            "UPDATE sequences SET last = last + 1 WHERE kind = ?",
            params![kind],
        )?;
        let id = conn.query_row(
            "SELECT last FROM sequences WHERE kind = ?",
            params![kind],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(id)
    }

    /// Insert a new record. Fails if the key is already taken.
    pub fn insert(&self, kind: &str, id: &str, value: &str) -> Result<()> {
        let conn = self.tx.deref();
        conn.execute(
            "INSERT INTO records (kind, id, value) VALUES (?, ?, ?)",
            params![kind, id, value],
        )?;
        Ok(())
    }

    pub fn load(&self, kind: &str, id: &str) -> Result<Option<String>> {
        select_value(self.tx.deref(), kind, id)
    }
}

fn select_value(conn: &Connection, kind: &str, id: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM records WHERE kind = ? AND id = ?")?;
    let result = stmt.query_row(params![kind, id], |row| row.get::<_, String>(0));

    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// SQL value that `json_extract` yields for a JSON scalar
fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn decode<R: Record>(raw: &str) -> Result<R> {
    Ok(serde_json::from_str(raw)?)
}

impl RecordStore for SqliteStore {
    fn get<R: Record>(&self, key: &str) -> clinica_core::Result<Option<R>> {
        match self.load(R::KIND, key)? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    fn find<R: Record>(&self, filter: &Filter) -> clinica_core::Result<Vec<R>> {
        let unknown = filter.unknown_fields::<R>();
        if !unknown.is_empty() {
            return Err(StoreError::UnsupportedFilter {
                kind: R::KIND.to_string(),
                fields: unknown.join(", "),
            }
            .into());
        }

        let mut records = Vec::new();
        for raw in self.select(R::KIND, filter)? {
            records.push(decode(&raw)?);
        }
        Ok(records)
    }

    fn insert<R: Record>(&self, mut record: R) -> clinica_core::Result<R> {
        let stored = self.in_transaction(|ops| {
            if R::GENERATED_KEY {
                record.assign_key(ops.next_id(R::KIND)?);
            }
            let value = serde_json::to_string(&record)?;
            ops.insert(R::KIND, &record.key(), &value)?;
            Ok(record)
        })?;
        tracing::debug!(kind = R::KIND, id = %stored.key(), "Record inserted");
        Ok(stored)
    }

    fn update<R: Record>(&self, record: &R) -> clinica_core::Result<bool> {
        let value = serde_json::to_string(record).map_err(StoreError::from)?;
        Ok(self.replace(R::KIND, &record.key(), &value)?)
    }

    fn delete<R: Record>(&self, key: &str) -> clinica_core::Result<bool> {
        Ok(self.remove(R::KIND, key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinica_core::{Appointment, ClinicaError, Doctor, Patient};

    fn doctor(email: &str, speciality: &str) -> Doctor {
        Doctor {
            id: 0,
            last_name: "Ionescu".to_string(),
            first_name: "Maria".to_string(),
            email: email.to_string(),
            phone_number: "0722000111".to_string(),
            speciality: speciality.to_string(),
        }
    }

    fn patient(cnp: &str) -> Patient {
        Patient {
            cnp: cnp.to_string(),
            last_name: "Popescu".to_string(),
            first_name: "Ion".to_string(),
            email: format!("{}@example.com", cnp),
            phone_number: "0712345678".to_string(),
            age: 28,
            birthday: "1996-01-01".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_generated_ids_per_kind() {
        let store = SqliteStore::open(":memory:").unwrap();

        let first = store.insert(doctor("a@clinica.ro", "Cardiolog")).unwrap();
        let second = store.insert(doctor("b@clinica.ro", "Neurolog")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let appointment = store
            .insert(Appointment {
                id: 0,
                patient_id: "1960101123456".to_string(),
                doctor_id: first.id,
                date: "2024-03-10".to_string(),
                status: "Onorata".to_string(),
            })
            .unwrap();
        assert_eq!(appointment.id, 1);
    }

    #[test]
    fn test_get_round_trip() {
        let store = SqliteStore::open(":memory:").unwrap();
        let inserted = store.insert(patient("1960101123456")).unwrap();

        let fetched: Option<Patient> = store.get("1960101123456").unwrap();
        assert_eq!(fetched, Some(inserted));
        let missing: Option<Patient> = store.get("2960101123456").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_natural_key_collision_fails() {
        let store = SqliteStore::open(":memory:").unwrap();
        store.insert(patient("1960101123456")).unwrap();
        let err = store.insert(patient("1960101123456")).unwrap_err();
        assert!(matches!(err, ClinicaError::Storage(_)));
    }

    #[test]
    fn test_find_with_json_filters() {
        let store = SqliteStore::open(":memory:").unwrap();
        store.insert(doctor("a@clinica.ro", "Cardiolog")).unwrap();
        store.insert(doctor("b@clinica.ro", "Neurolog")).unwrap();
        store.insert(doctor("c@clinica.ro", "Neurolog")).unwrap();

        let neuro: Vec<Doctor> = store
            .find(&Filter::new().eq("speciality", "Neurolog"))
            .unwrap();
        let emails: Vec<&str> = neuro.iter().map(|d| d.email.as_str()).collect();
        assert_eq!(emails, vec!["b@clinica.ro", "c@clinica.ro"]);

        let all: Vec<Doctor> = store.find(&Filter::new()).unwrap();
        assert_eq!(all.len(), 3);

        let by_id: Vec<Appointment> = store.find(&Filter::new().eq("doctor_id", 2)).unwrap();
        assert!(by_id.is_empty());
    }

    #[test]
    fn test_find_camel_case_fields() {
        let store = SqliteStore::open(":memory:").unwrap();
        store.insert(patient("1960101123456")).unwrap();
        let found: Vec<Patient> = store
            .find(&Filter::new().eq("lastName", "Popescu").eq("firstName", "Ion"))
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_find_rejects_unknown_field() {
        let store = SqliteStore::open(":memory:").unwrap();
        let result = store.find::<Doctor>(&Filter::new().eq("password", "x"));
        assert!(matches!(result, Err(ClinicaError::Storage(_))));
    }

    #[test]
    fn test_update_and_delete() {
        let store = SqliteStore::open(":memory:").unwrap();
        let mut stored = store.insert(doctor("a@clinica.ro", "Cardiolog")).unwrap();

        stored.speciality = "Pediatru".to_string();
        assert!(store.update(&stored).unwrap());
        let fetched: Option<Doctor> = store.get("1").unwrap();
        assert_eq!(fetched.unwrap().speciality, "Pediatru");

        assert!(store.delete::<Doctor>("1").unwrap());
        assert!(!store.delete::<Doctor>("1").unwrap());

        let ghost = doctor("z@clinica.ro", "Ortoped");
        assert!(!store.update(&ghost).unwrap());
    }

    #[test]
    fn test_in_transaction_rollback() {
        let store = SqliteStore::open(":memory:").unwrap();

        let result: Result<()> = store.in_transaction(|ops| {
            ops.next_id("Doctor")?;
            ops.insert("Doctor", "1", r#"{"id":1}"#)?;
            ops.insert("Doctor", "1", r#"{"id":1}"#)
        });

        assert!(result.is_err());
        assert_eq!(store.load("Doctor", "1").unwrap(), None);
        assert!(store.count_by_kind().unwrap().is_empty());
    }

    #[test]
    fn test_count_by_kind() {
        let store = SqliteStore::open(":memory:").unwrap();
        store.insert(doctor("a@clinica.ro", "Cardiolog")).unwrap();
        store.insert(patient("1960101123456")).unwrap();
        store.insert(patient("2960101123456")).unwrap();

        let counts = store.count_by_kind().unwrap();
        assert_eq!(
            counts,
            vec![("Doctor".to_string(), 1), ("Patient".to_string(), 2)]
        );
    }
}
