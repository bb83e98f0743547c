//! erlix-store: Transactional in-memory content store for the erlix
//! indexing engine.
//!
//! Uses rusqlite with bundled SQLite, an in-memory database, and an embedded
//! schema. Four tables back the index: documents, module_index, signatures,
//! and symbol_refs (the reverse reference index). The store is the single
//! source of truth for all indexed facts; it is rebuilt from source on every
//! process start.

use erlix_core::ErlixError;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

mod documents;
mod refs;
mod signatures;

pub use refs::Occurrence;
pub use signatures::Signature;

const SCHEMA: &str = include_str!("schema.sql");

/// SQLite-backed store for documents, module identities, signatures, and
/// references.
///
/// Wraps `rusqlite::Connection` in a `Mutex` to satisfy `Send + Sync`. All
/// reads and writes go through the same lock, so a reader can never observe
/// a half-applied multi-table transaction.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open a fresh in-memory store with the schema applied.
    pub fn open_in_memory() -> Result<Self, ErlixError> {
        let conn = Connection::open_in_memory().map_err(|e| ErlixError::Store(e.to_string()))?;

        // 5s busy timeout
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the connection lock, converting poisoning into a loud error
    /// rather than a deadlock or panic.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, ErlixError> {
        self.conn
            .lock()
            .map_err(|e| ErlixError::LockPoisoned(e.to_string()))
    }

    /// Run `f` inside a single transaction with exclusive write access across
    /// all tables. Either every write in `f` becomes visible atomically, or
    /// none does: an `Err` from `f` rolls the transaction back.
    ///
    /// Transactions do not nest.
    pub fn transact<T, F>(&self, f: F) -> Result<T, ErlixError>
    where
        F: FnOnce(&StoreTx<'_>) -> Result<T, ErlixError>,
    {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| ErlixError::Store(e.to_string()))?;
        let value = f(&StoreTx { tx: &tx })?;
        tx.commit().map_err(|e| ErlixError::Store(e.to_string()))?;
        Ok(value)
    }

    /// Compute the SHA-256 content fingerprint of raw source bytes, used to
    /// detect unchanged content and skip re-indexing.
    pub fn content_fingerprint(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        format!("{:x}", hasher.finalize())
    }

    /// Get table counts.
    pub fn stats(&self) -> Result<StoreStats, ErlixError> {
        let conn = self.lock()?;

        let count = |table: &str| -> Result<usize, ErlixError> {
            let n: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .map_err(|e| ErlixError::Store(e.to_string()))?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            documents: count("documents")?,
            modules: count("module_index")?,
            signatures: count("signatures")?,
            references: count("symbol_refs")?,
        })
    }
}

/// Write handle passed to [`Store::transact`] closures.
pub struct StoreTx<'a> {
    pub(crate) tx: &'a rusqlite::Transaction<'a>,
}

/// Table counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub documents: usize,
    pub modules: usize,
    pub signatures: usize,
    pub references: usize,
}
