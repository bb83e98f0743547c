//! Document and module-index operations.

use crate::{Store, StoreTx};
use erlix_core::{Document, ErlixError, Location, Poi, UnitKind};
use rusqlite::{params, OptionalExtension};

impl Store {
    /// Fetch the full document stored at a location.
    pub fn get_document(&self, location: &Location) -> Result<Option<Document>, ErlixError> {
        let conn = self.lock()?;

        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT module, kind, fingerprint, pois FROM documents WHERE location = ?1",
                params![location.as_str()],
                |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                },
            )
            .optional()
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        match row {
            Some((module, kind, fingerprint, pois_json)) => {
                let kind: UnitKind = kind.parse()?;
                let pois: Vec<Poi> = serde_json::from_str(&pois_json)?;
                Ok(Some(Document {
                    location: location.clone(),
                    module,
                    kind,
                    fingerprint,
                    pois,
                }))
            }
            None => Ok(None),
        }
    }

    /// Fetch just the content fingerprint stored at a location. Cheaper than
    /// [`Store::get_document`] for the unchanged-content check.
    pub fn document_fingerprint(
        &self,
        location: &Location,
    ) -> Result<Option<String>, ErlixError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT fingerprint FROM documents WHERE location = ?1",
            params![location.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| ErlixError::Store(e.to_string()))
    }

    /// All indexed locations, ordered.
    pub fn list_locations(&self) -> Result<Vec<Location>, ErlixError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT location FROM documents ORDER BY location")
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        let locations = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ErlixError::Store(e.to_string()))?
            .collect::<Result<Vec<String>, _>>()
            .map_err(|e| ErlixError::Store(e.to_string()))?;

        Ok(locations.into_iter().map(Location::new).collect())
    }

    /// Resolve a unit identity (module or header name) to its owning
    /// location.
    pub fn module_location(&self, module: &str) -> Result<Option<Location>, ErlixError> {
        let conn = self.lock()?;
        let location: Option<String> = conn
            .query_row(
                "SELECT location FROM module_index WHERE module = ?1",
                params![module],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ErlixError::Store(e.to_string()))?;
        Ok(location.map(Location::new))
    }
}

impl StoreTx<'_> {
    /// Insert or replace the document at its location.
    pub fn put_document(&self, document: &Document) -> Result<(), ErlixError> {
        let pois_json = serde_json::to_string(&document.pois)?;
        self.tx
            .execute(
                "INSERT OR REPLACE INTO documents (location, module, kind, fingerprint, pois)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    document.location.as_str(),
                    document.module,
                    document.kind.to_string(),
                    document.fingerprint,
                    pois_json,
                ],
            )
            .map_err(|e| ErlixError::Store(e.to_string()))?;
        Ok(())
    }

    /// Upsert the identity mapping for a unit. Last writer wins.
    pub fn put_module_location(
        &self,
        module: &str,
        location: &Location,
    ) -> Result<(), ErlixError> {
        self.tx
            .execute(
                "INSERT OR REPLACE INTO module_index (module, location) VALUES (?1, ?2)",
                params![module, location.as_str()],
            )
            .map_err(|e| ErlixError::Store(e.to_string()))?;
        Ok(())
    }
}
