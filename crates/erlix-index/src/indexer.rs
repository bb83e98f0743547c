//! Indexing pipeline orchestrator.
//!
//! Resolves files against the configured search roots, detects unchanged
//! content via fingerprint comparison, and commits parsed documents plus
//! their derived facts into the store in one transaction.

use crate::pool::WorkerPool;
use erlix_core::{
    Document, ErlixConfig, ErlixError, Location, PoiData, SymbolKey, UnitParser,
};
use erlix_store::{Signature, Store};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Whether an indexing request runs inline or on the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Sync,
    Async,
}

/// The indexing engine. Holds no mutable state of its own; every fact lives
/// in the store, so concurrent calls for different locations proceed
/// independently and racing commits for the same location resolve to
/// last-writer-wins inside the store transaction.
pub struct Indexer {
    inner: Arc<IndexerInner>,
    pool: WorkerPool,
}

struct IndexerInner {
    store: Arc<Store>,
    parser: Arc<dyn UnitParser>,
    config: ErlixConfig,
}

impl Indexer {
    /// Create an indexer with its worker pool sized from the configuration.
    pub fn new(store: Arc<Store>, parser: Arc<dyn UnitParser>, config: ErlixConfig) -> Self {
        let pool = WorkerPool::new(config.indexing.pool_size);
        Self {
            inner: Arc::new(IndexerInner {
                store,
                parser,
                config,
            }),
            pool,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    pub fn config(&self) -> &ErlixConfig {
        &self.inner.config
    }

    /// Locate `path` among the configured search roots, read it, and index
    /// it either inline (`Sync`) or on the worker pool (`Async`). Locate and
    /// read errors surface synchronously in both modes; in `Async` mode,
    /// parse and commit failures are logged on the worker instead of being
    /// returned.
    ///
    /// Returns the canonical location of the file.
    pub fn index_file(&self, path: &Path, mode: IndexMode) -> Result<Location, ErlixError> {
        let resolved = self.inner.resolve(path)?;
        let source = std::fs::read(&resolved).map_err(|source| ErlixError::Read {
            path: resolved.clone(),
            source,
        })?;
        let location = Location::from_path(&resolved);

        match mode {
            IndexMode::Sync => self.inner.index_location(&location, &source)?,
            IndexMode::Async => {
                let inner = Arc::clone(&self.inner);
                let task_location = location.clone();
                self.pool.submit(move || {
                    if let Err(err) = inner.index_location(&task_location, &source) {
                        tracing::error!("Failed to index {}: {}", task_location, err);
                    }
                });
            }
        }

        Ok(location)
    }

    /// Index raw content for a location. Idempotent: byte-identical content
    /// is detected via its fingerprint and skipped without any store
    /// mutation.
    pub fn index_location(&self, location: &Location, source: &[u8]) -> Result<(), ErlixError> {
        self.inner.index_location(location, source)
    }
}

impl IndexerInner {
    /// Resolve a requested path to a readable file. Absolute paths are taken
    /// as-is; relative paths are tried against each search root in order.
    fn resolve(&self, path: &Path) -> Result<PathBuf, ErlixError> {
        if path.is_absolute() {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            return Err(ErlixError::NotFound(path.to_path_buf()));
        }

        for root in self.config.paths.search_roots() {
            let candidate = root.join(path);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        Err(ErlixError::NotFound(path.to_path_buf()))
    }

    fn index_location(&self, location: &Location, source: &[u8]) -> Result<(), ErlixError> {
        let fingerprint = Store::content_fingerprint(source);

        // Read-then-decide: the comparison runs outside the transaction, so
        // two racing callers may both recompute. Redundant work, never an
        // inconsistent store.
        if self.store.document_fingerprint(location)?.as_deref() == Some(fingerprint.as_str()) {
            tracing::debug!("Unchanged content at {}, skipping", location);
            return Ok(());
        }

        let facts = self.parser.parse(location, source)?;
        let document = Document {
            location: location.clone(),
            module: facts.module,
            kind: facts.kind,
            fingerprint,
            pois: facts.pois,
        };
        self.commit(&document)?;

        tracing::debug!(
            "Indexed {} as {} ({} pois)",
            document.location,
            document.module,
            document.pois.len()
        );
        Ok(())
    }

    /// Install a new document version and all facts derived from it in one
    /// transaction: the document row, its identity mapping, its signatures,
    /// and its references. References recorded by the prior version of this
    /// location are purged before the fresh set is inserted.
    fn commit(&self, document: &Document) -> Result<(), ErlixError> {
        self.store
            .transact(|tx| {
                tx.put_document(document)?;
                tx.put_module_location(&document.module, &document.location)?;

                for poi in &document.pois {
                    if let PoiData::Spec { name, arity, tree } = &poi.data {
                        tx.put_signature(&Signature {
                            module: document.module.clone(),
                            name: name.clone(),
                            arity: *arity,
                            tree: tree.clone(),
                        })?;
                    }
                }

                tx.purge_references(&document.location)?;
                for poi in &document.pois {
                    if let Some(key) = SymbolKey::from_poi(&poi.data, &document.module) {
                        tx.put_reference(&key, &document.location, &poi.range)?;
                    }
                }

                Ok(())
            })
            .map_err(|err| ErlixError::Commit {
                location: document.location.clone(),
                reason: err.to_string(),
            })
    }
}
