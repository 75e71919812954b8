use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use tracing::debug;

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::error::{LedgerError, Result};
use crate::schema::{DependencyResolver, TableSchema};

/// Owns the SQLite connection backing a ledger
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and ensure the schema exists
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        // WAL lets readers proceed while a writer holds the lock
        conn.execute_batch(
            "PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        debug!(path = ?db_path, "opened ledger database");
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        let tables = DependencyResolver::new()
            .creation_order()
            .map_err(LedgerError::Schema)?;
        store.create_tables(&tables)?;
        Ok(store)
    }

    /// Create all tables for the given schemas, skipping those that exist
    pub fn create_tables(&self, schemas: &[&TableSchema]) -> Result<()> {
        debug!(count = schemas.len(), "ensuring tables");

        for schema in schemas {
            let sql = generate_create_table(schema);
            self.conn.execute(&sql, [])?;

            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, [])?;
            }
        }

        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction. The write lock is taken up front so
    /// validation reads and the following writes see the same state.
    pub fn write(&mut self) -> Result<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    /// Count rows in a table
    pub fn row_count(&self, table: &TableSchema) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }
}
