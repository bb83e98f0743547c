//! Type-signature operations.

use crate::{Store, StoreTx};
use erlix_core::ErlixError;
use rusqlite::{params, OptionalExtension};

/// One `-spec` entry: the parsed type-signature tree of a module function,
/// stored as the front-end produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub module: String,
    pub name: String,
    pub arity: u32,
    pub tree: serde_json::Value,
}

impl Store {
    /// Fetch the signature tree for a fully qualified function key.
    pub fn signature(
        &self,
        module: &str,
        name: &str,
        arity: u32,
    ) -> Result<Option<serde_json::Value>, ErlixError> {
        let conn = self.lock()?;

        let tree: Option<String> = conn
            .query_row(
                "SELECT tree FROM signatures WHERE module = ?1 AND name = ?2 AND arity = ?3",
                params![module, name, arity],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        match tree {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// All signatures recorded for a module, ordered by name and arity.
    pub fn signatures_for_module(&self, module: &str) -> Result<Vec<Signature>, ErlixError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT name, arity, tree FROM signatures WHERE module = ?1
                 ORDER BY name, arity",
            )
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        let rows = stmt
            .query_map(params![module], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| ErlixError::Store(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        let mut signatures = Vec::with_capacity(rows.len());
        for (name, arity, json) in rows {
            signatures.push(Signature {
                module: module.to_string(),
                name,
                arity: arity as u32,
                tree: serde_json::from_str(&json)?,
            });
        }
        Ok(signatures)
    }
}

impl StoreTx<'_> {
    /// Insert or replace a signature entry.
    pub fn put_signature(&self, signature: &Signature) -> Result<(), ErlixError> {
        let tree_json = serde_json::to_string(&signature.tree)?;
        self.tx
            .execute(
                "INSERT OR REPLACE INTO signatures (module, name, arity, tree)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    signature.module,
                    signature.name,
                    signature.arity,
                    tree_json,
                ],
            )
            .map_err(|e| ErlixError::Store(e.to_string()))?;
        Ok(())
    }
}
