//! Directory walking: enumerate indexable units under a root and feed them
//! to the indexer.
//!
//! Walks respect `.gitignore` rules (via the `ignore` crate) and the
//! configured excluded directory names. Directory-wide runs are synchronous
//! by design so startup indexing finishes with deterministic counts before
//! dependent features come up.

use crate::{IndexMode, Indexer};
use ignore::WalkBuilder;
use std::path::Path;

/// File extensions of indexable source and header units.
pub const INDEXABLE_EXTENSIONS: &[&str] = &["erl", "hrl"];

/// Aggregate result of a directory-wide indexing run. Per-file causes are
/// only available in the logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub succeeded: usize,
    pub failed: usize,
}

impl WalkStats {
    fn absorb(&mut self, other: WalkStats) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// Check if a path's extension marks it as an indexable unit.
pub fn is_indexable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| INDEXABLE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Check if a path is inside one of the excluded directories.
fn is_excluded(path: &Path, exclude_dirs: &[String]) -> bool {
    path.components().any(|component| {
        matches!(
            component,
            std::path::Component::Normal(name)
                if name.to_str().is_some_and(|n| exclude_dirs.iter().any(|e| e == n))
        )
    })
}

/// Index every eligible file under `root` synchronously, returning aggregate
/// counts. Per-file failures are logged and counted; they never abort the
/// walk.
pub fn index_directory(indexer: &Indexer, root: &Path) -> WalkStats {
    let exclude_dirs = &indexer.config().paths.exclude_dirs;
    let mut stats = WalkStats::default();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("Walk error: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        if !is_indexable(path) || is_excluded(path, exclude_dirs) {
            continue;
        }

        match indexer.index_file(path, IndexMode::Sync) {
            Ok(_) => stats.succeeded += 1,
            Err(err) => {
                tracing::warn!("Failed to index {}: {}", path.display(), err);
                stats.failed += 1;
            }
        }
    }

    tracing::info!(
        "Indexed {}: {} succeeded, {} failed",
        root.display(),
        stats.succeeded,
        stats.failed
    );

    stats
}

/// Bulk-index the configured project layout: application roots always,
/// dependency roots and the OTP tree when their toggles allow. Blocks until
/// every file is processed.
pub fn index_project(indexer: &Indexer) -> WalkStats {
    let paths = indexer.config().paths.clone();
    let indexing = indexer.config().indexing.clone();
    let mut stats = WalkStats::default();

    for dir in &paths.app_dirs {
        stats.absorb(index_directory(indexer, dir));
    }

    if indexing.index_deps {
        for dir in &paths.deps_dirs {
            stats.absorb(index_directory(indexer, dir));
        }
    }

    if indexing.index_otp {
        if let Some(dir) = &paths.otp_dir {
            stats.absorb(index_directory(indexer, dir));
        }
    }

    stats
}
