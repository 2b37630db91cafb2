//! SQLite-based audit log
//!
//! Separate file for easy management and rotation.

use crate::error::Result;
use rusqlite::{Connection, params};
use std::path::Path;

/// Operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }
}

/// One recorded request outcome
#[derive(Debug, Clone, Default)]
pub struct AuditEntry {
    pub kind: Option<String>,
    pub record_id: Option<String>,
    pub query_string: Option<String>,
    pub client_ip: Option<String>,
    /// `None` on success
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// Row returned by [`AuditLog::recent_entries`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub timestamp: String,
    pub operation: String,
    pub kind: Option<String>,
    pub record_id: Option<String>,
    pub result: String,
}

/// Audit log
pub struct AuditLog {
    conn: Connection,
}

#[allow(clippy::result_large_err)]
impl AuditLog {
    /// Open the audit log (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let audit = Self { conn };
        audit.initialize()?;
        Ok(audit)
    }

    /// Initialize tables
    fn initialize(&self) -> Result<()> {
        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL DEFAULT (datetime('now')),
                operation TEXT NOT NULL,
                kind TEXT,
                record_id TEXT,
                query_string TEXT,
                client_ip TEXT,
                result TEXT NOT NULL,
                error_code TEXT,
                error_message TEXT
            )
            "#,
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_audit_record ON audit_log(kind, record_id)",
            [],
        )?;

        Ok(())
    }

    /// Record an audit log entry
    pub fn log(&self, operation: Operation, entry: &AuditEntry) -> Result<()> {
        let result = if entry.error_code.is_none() {
            "success"
        } else {
            "error"
        };

        self.conn.execute(
            r#"
            INSERT INTO audit_log
            (operation, kind, record_id, query_string, client_ip,
             result, error_code, error_message)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                operation.as_str(),
                entry.kind,
                entry.record_id,
                entry.query_string,
                entry.client_ip,
                result,
                entry.error_code,
                entry.error_message,
            ],
        )?;

        Ok(())
    }

    /// Most recent entries first
    pub fn recent_entries(&self, limit: usize) -> Result<Vec<AuditRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, operation, kind, record_id, result
            FROM audit_log
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(AuditRow {
                timestamp: row.get(0)?,
                operation: row.get(1)?,
                kind: row.get(2)?,
                record_id: row.get(3)?,
                result: row.get(4)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log() {
        let audit = AuditLog::open(":memory:").unwrap();

        audit
            .log(
                Operation::Create,
                &AuditEntry {
                    kind: Some("Patient".to_string()),
                    record_id: Some("1960101123456".to_string()),
                    client_ip: Some("127.0.0.1".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        audit
            .log(
                Operation::Read,
                &AuditEntry {
                    kind: Some("Doctor".to_string()),
                    record_id: Some("999".to_string()),
                    error_code: Some("not-found".to_string()),
                    error_message: Some("Doctor not found: 999".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let count: i32 = audit
            .conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn test_recent_entries() {
        let audit = AuditLog::open(":memory:").unwrap();

        let doctor = AuditEntry {
            kind: Some("Doctor".to_string()),
            record_id: Some("1".to_string()),
            ..Default::default()
        };
        audit.log(Operation::Create, &doctor).unwrap();
        audit.log(Operation::Read, &doctor).unwrap();
        audit
            .log(
                Operation::Update,
                &AuditEntry {
                    error_code: Some("conflict".to_string()),
                    ..doctor.clone()
                },
            )
            .unwrap();

        let entries = audit.recent_entries(10).unwrap();
        assert_eq!(entries.len(), 3);
        // Most recent first
        assert_eq!(entries[0].operation, "update");
        assert_eq!(entries[0].result, "error");
        assert_eq!(entries[2].result, "success");
    }
}
