//! erlix-index: Indexing pipeline for the erlix language-tooling engine.
//!
//! Ingests Erlang source units, extracts symbol-level facts through the
//! front-end parser boundary, and maintains the queryable index in
//! `erlix-store`. Change detection via SHA-256 fingerprints avoids redundant
//! re-indexing; commits are atomic multi-table transactions so readers never
//! observe a half-updated document.
//!
//! # Architecture
//!
//! - **indexer** — pipeline orchestrator: resolution, change detection, commit
//! - **pool** — fixed-size worker pool for asynchronous indexing tasks
//! - **walker** — directory enumeration feeding the indexer

pub mod indexer;
pub mod pool;
pub mod walker;

pub use indexer::{IndexMode, Indexer};
pub use pool::WorkerPool;
pub use walker::{index_directory, index_project, WalkStats, INDEXABLE_EXTENSIONS};
