//! Reverse reference index: symbol key -> occurrences.

use crate::{Store, StoreTx};
use erlix_core::{ErlixError, Location, Range, SymbolKey};
use rusqlite::params;

/// One recorded occurrence of a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub location: Location,
    pub range: Range,
}

/// Flatten a symbol key into its table columns. The kind column keeps the
/// three namespaces disjoint; module and arity are NULL outside the function
/// namespace.
fn key_columns(key: &SymbolKey) -> (&'static str, Option<&str>, &str, Option<u32>) {
    match key {
        SymbolKey::Function {
            module,
            name,
            arity,
        } => ("function", Some(module.as_str()), name.as_str(), Some(*arity)),
        SymbolKey::Macro { name } => ("macro", None, name.as_str(), None),
        SymbolKey::Record { name } => ("record", None, name.as_str(), None),
    }
}

impl Store {
    /// All occurrences recorded for a symbol key, ordered by location and
    /// position.
    pub fn references(&self, key: &SymbolKey) -> Result<Vec<Occurrence>, ErlixError> {
        let (kind, module, name, arity) = key_columns(key);
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT location, start_line, start_column, end_line, end_column
                 FROM symbol_refs
                 WHERE kind = ?1 AND name = ?2 AND module IS ?3 AND arity IS ?4
                 ORDER BY location, start_line, start_column",
            )
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        let occurrences = stmt
            .query_map(params![kind, name, module, arity], |row| {
                Ok(Occurrence {
                    location: Location::new(row.get::<_, String>(0)?),
                    range: Range::new(
                        row.get::<_, i64>(1)? as u32,
                        row.get::<_, i64>(2)? as u32,
                        row.get::<_, i64>(3)? as u32,
                        row.get::<_, i64>(4)? as u32,
                    ),
                })
            })
            .map_err(|e| ErlixError::Store(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        Ok(occurrences)
    }
}

impl StoreTx<'_> {
    /// Delete every reference entry recorded for a location. Run before
    /// inserting the fresh set so stale entries from the prior version of
    /// the document never persist. Returns the number of purged entries.
    pub fn purge_references(&self, location: &Location) -> Result<usize, ErlixError> {
        self.tx
            .execute(
                "DELETE FROM symbol_refs WHERE location = ?1",
                params![location.as_str()],
            )
            .map_err(|e| ErlixError::Store(e.to_string()))
    }

    /// Record one occurrence of a symbol.
    pub fn put_reference(
        &self,
        key: &SymbolKey,
        location: &Location,
        range: &Range,
    ) -> Result<(), ErlixError> {
        let (kind, module, name, arity) = key_columns(key);
        self.tx
            .execute(
                "INSERT INTO symbol_refs
                 (kind, module, name, arity, location,
                  start_line, start_column, end_line, end_column)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    kind,
                    module,
                    name,
                    arity,
                    location.as_str(),
                    range.start.line,
                    range.start.column,
                    range.end.line,
                    range.end.column,
                ],
            )
            .map_err(|e| ErlixError::Store(e.to_string()))?;
        Ok(())
    }
}
