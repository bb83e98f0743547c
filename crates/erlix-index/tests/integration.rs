//! Integration tests for erlix-index: full pipeline runs over real
//! directories with a stub front-end parser.

use erlix_core::{
    ErlixConfig, ErlixError, FunctionTarget, Location, Poi, PoiData, Range, SymbolKey, UnitFacts,
    UnitKind, UnitParser,
};
use erlix_index::{index_directory, IndexMode, Indexer};
use erlix_store::Store;
use std::path::PathBuf;
use std::sync::Arc;

// ── Stub Front-End ─────────────────────────────────────────────────────────

/// Line-oriented stand-in for the real parser. One fact per line:
///
///   module <name> | header <name>
///   spec <name>/<arity>
///   call <name>/<arity> | call <module>:<name>/<arity>
///   fun <name>/<arity> | fun <module>:<name>/<arity>
///   macro <NAME>
///   record-new <name> | record-get <name>
///
/// Blank lines and `%` comments are skipped; anything else is a parse error.
struct LineParser;

fn name_arity(raw: &str, location: &Location) -> Result<(String, u32), ErlixError> {
    raw.rsplit_once('/')
        .and_then(|(name, arity)| Some((name.to_string(), arity.parse().ok()?)))
        .ok_or_else(|| ErlixError::Parse {
            location: location.clone(),
            reason: format!("expected name/arity, got: {raw}"),
        })
}

fn function_target(raw: &str, location: &Location) -> Result<FunctionTarget, ErlixError> {
    match raw.split_once(':') {
        Some((module, fun)) => {
            let (name, arity) = name_arity(fun, location)?;
            Ok(FunctionTarget::Remote {
                module: module.to_string(),
                name,
                arity,
            })
        }
        None => {
            let (name, arity) = name_arity(raw, location)?;
            Ok(FunctionTarget::Local { name, arity })
        }
    }
}

impl UnitParser for LineParser {
    fn parse(&self, location: &Location, source: &[u8]) -> Result<UnitFacts, ErlixError> {
        let text = String::from_utf8_lossy(source);
        let mut module = None;
        let mut kind = UnitKind::Module;
        let mut pois = Vec::new();

        for (idx, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }

            let range = Range::new(idx as u32 + 1, 1, idx as u32 + 1, line.len() as u32 + 1);
            let data = match line.split_once(' ') {
                Some(("module", name)) => {
                    module = Some(name.to_string());
                    continue;
                }
                Some(("header", name)) => {
                    module = Some(name.to_string());
                    kind = UnitKind::Header;
                    continue;
                }
                Some(("spec", rest)) => {
                    let (name, arity) = name_arity(rest, location)?;
                    PoiData::Spec {
                        name,
                        arity,
                        tree: serde_json::json!({"raw": rest}),
                    }
                }
                Some(("call", rest)) => PoiData::Application {
                    target: function_target(rest, location)?,
                },
                Some(("fun", rest)) => PoiData::ImplicitFun {
                    target: function_target(rest, location)?,
                },
                Some(("macro", name)) => PoiData::MacroUse {
                    name: name.to_string(),
                },
                Some(("record-new", name)) => PoiData::RecordConstruct {
                    name: name.to_string(),
                },
                Some(("record-get", name)) => PoiData::RecordAccess {
                    name: name.to_string(),
                },
                _ => {
                    return Err(ErlixError::Parse {
                        location: location.clone(),
                        reason: format!("unrecognized line: {line}"),
                    })
                }
            };
            pois.push(Poi::new(data, range));
        }

        let module = module.ok_or_else(|| ErlixError::Parse {
            location: location.clone(),
            reason: "no module declaration".to_string(),
        })?;

        Ok(UnitFacts { module, kind, pois })
    }
}

// ── Fixtures ───────────────────────────────────────────────────────────────

struct Fixture {
    dir: PathBuf,
    store: Arc<Store>,
    indexer: Indexer,
}

impl Fixture {
    fn new(name: &str) -> Self {
        Self::with_config(name, ErlixConfig::default())
    }

    fn with_config(name: &str, mut config: ErlixConfig) -> Self {
        let dir = std::env::temp_dir().join(format!("erlix_it_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        config.indexing.pool_size = 1;
        let store = Arc::new(Store::open_in_memory().unwrap());
        let indexer = Indexer::new(Arc::clone(&store), Arc::new(LineParser), config);
        Self {
            dir,
            store,
            indexer,
        }
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn fun_key(module: &str, name: &str, arity: u32) -> SymbolKey {
    SymbolKey::Function {
        module: module.to_string(),
        name: name.to_string(),
        arity,
    }
}

// ── Directory Walks ────────────────────────────────────────────────────────

#[test]
fn walk_counts_successes_and_failures() {
    let fixture = Fixture::new("walk_counts");
    fixture.write("src/a.erl", "module a\ncall lists:map/2\n");
    fixture.write("src/b.erl", "module b\nspec init/1\n");
    fixture.write("src/c.erl", "module c\n");
    fixture.write("src/broken1.erl", "this is not a unit\n");
    fixture.write("src/broken2.erl", "module d\ncall nonsense\n");
    // Not an indexable extension; must not affect the counts
    fixture.write("src/notes.txt", "module ghost\n");

    let stats = index_directory(&fixture.indexer, &fixture.dir);

    assert_eq!(stats.succeeded, 3);
    assert_eq!(stats.failed, 2);
    assert_eq!(fixture.store.stats().unwrap().documents, 3);
    assert!(fixture.store.module_location("ghost").unwrap().is_none());
}

#[test]
fn rewalking_an_unchanged_tree_mutates_nothing() {
    let fixture = Fixture::new("rewalk");
    fixture.write("src/a.erl", "module a\ncall b:go/0\n");
    fixture.write("src/b.erl", "module b\nspec go/0\n");

    let first = index_directory(&fixture.indexer, &fixture.dir);
    let before = fixture.store.stats().unwrap();

    let second = index_directory(&fixture.indexer, &fixture.dir);
    let after = fixture.store.stats().unwrap();

    assert_eq!(first.succeeded, 2);
    // Unchanged files short-circuit on the fingerprint but still count as
    // successfully indexed
    assert_eq!(second.succeeded, 2);
    assert_eq!(second.failed, 0);
    assert_eq!(before, after);
}

#[test]
fn excluded_directories_are_skipped() {
    let mut config = ErlixConfig::default();
    config.paths.exclude_dirs = vec!["_build".to_string()];
    let fixture = Fixture::with_config("exclude", config);
    fixture.write("src/a.erl", "module a\n");
    fixture.write("_build/default/lib/dep/src/vendored.erl", "module vendored\n");

    let stats = index_directory(&fixture.indexer, &fixture.dir);

    assert_eq!(stats.succeeded, 1);
    assert!(fixture.store.module_location("a").unwrap().is_some());
    assert!(fixture.store.module_location("vendored").unwrap().is_none());
}

#[test]
fn headers_index_alongside_modules() {
    let fixture = Fixture::new("headers");
    fixture.write("include/records.hrl", "header records\nmacro TIMEOUT\n");
    fixture.write("src/a.erl", "module a\nmacro TIMEOUT\n");

    let stats = index_directory(&fixture.indexer, &fixture.dir);
    assert_eq!(stats.succeeded, 2);

    let header_location = fixture.store.module_location("records").unwrap().unwrap();
    let document = fixture
        .store
        .get_document(&header_location)
        .unwrap()
        .unwrap();
    assert_eq!(document.kind, UnitKind::Header);

    let occurrences = fixture
        .store
        .references(&SymbolKey::Macro {
            name: "TIMEOUT".to_string(),
        })
        .unwrap();
    assert_eq!(occurrences.len(), 2);
}

// ── Async Dispatch ─────────────────────────────────────────────────────────

#[test]
fn async_tasks_on_a_single_executor_all_complete() {
    let fixture = Fixture::new("async_dispatch");
    let a = fixture.write("src/a.erl", "module a\n");
    let b = fixture.write("src/b.erl", "module b\n");
    let c = fixture.write("src/c.erl", "module c\n");

    let store = Arc::clone(&fixture.store);
    for path in [&a, &b, &c] {
        fixture
            .indexer
            .index_file(path, IndexMode::Async)
            .expect("locate and read must succeed synchronously");
    }

    // Dropping the fixture tears down the indexer, which joins the pool
    drop(fixture);

    assert_eq!(store.stats().unwrap().documents, 3);
    for module in ["a", "b", "c"] {
        assert!(store.module_location(module).unwrap().is_some());
    }
}

#[test]
fn async_parse_failures_do_not_reach_the_caller() {
    let fixture = Fixture::new("async_failure");
    let broken = fixture.write("src/broken.erl", "total garbage\n");

    // Locate and read succeed, so the submission itself succeeds
    let location = fixture
        .indexer
        .index_file(&broken, IndexMode::Async)
        .unwrap();

    let store = Arc::clone(&fixture.store);
    drop(fixture);

    assert!(store.get_document(&location).unwrap().is_none());
    assert_eq!(store.stats().unwrap().documents, 0);
}

// ── Lookups ────────────────────────────────────────────────────────────────

#[test]
fn lookup_roundtrip_by_unit_identity() {
    let fixture = Fixture::new("lookup_roundtrip");
    let path = fixture.write("src/myapp_srv.erl", "module myapp_srv\nspec start_link/0\n");

    let location = fixture
        .indexer
        .index_file(&path, IndexMode::Sync)
        .unwrap();

    assert_eq!(
        fixture.store.module_location("myapp_srv").unwrap(),
        Some(location.clone())
    );
    assert!(fixture.store.module_location("unindexed").unwrap().is_none());

    let signatures = fixture.store.signatures_for_module("myapp_srv").unwrap();
    assert_eq!(signatures.len(), 1);
    assert_eq!(signatures[0].name, "start_link");
    assert_eq!(signatures[0].arity, 0);

    let document = fixture.store.get_document(&location).unwrap().unwrap();
    assert_eq!(document.module, "myapp_srv");
    assert_eq!(document.kind, UnitKind::Module);
}

#[test]
fn find_references_across_units() {
    let fixture = Fixture::new("find_references");
    fixture.write("src/owner.erl", "module owner\nspec handle/2\n");
    fixture.write("src/caller_a.erl", "module caller_a\ncall owner:handle/2\n");
    fixture.write(
        "src/caller_b.erl",
        "module caller_b\ncall owner:handle/2\nfun owner:handle/2\n",
    );

    index_directory(&fixture.indexer, &fixture.dir);

    let occurrences = fixture
        .store
        .references(&fun_key("owner", "handle", 2))
        .unwrap();
    assert_eq!(occurrences.len(), 3);

    let locations: Vec<_> = occurrences
        .iter()
        .map(|o| o.location.as_str().to_string())
        .collect();
    assert!(locations[0].contains("caller_a"));
    assert!(locations[1].contains("caller_b"));
    assert!(locations[2].contains("caller_b"));
}

// ── Re-Index Semantics ─────────────────────────────────────────────────────

#[test]
fn reindex_purges_exactly_the_stale_references() {
    let fixture = Fixture::new("reindex_purge");
    let location = Location::new("/virtual/src/m.erl");

    fixture
        .indexer
        .index_location(
            &location,
            b"module m\ncall gone/1\nmacro OLD\nrecord-new legacy\n",
        )
        .unwrap();
    fixture
        .indexer
        .index_location(
            &location,
            b"module m\ncall kept/1\nmacro OLD\nrecord-get legacy\n",
        )
        .unwrap();

    // Renamed or removed symbols leave no trace
    assert!(fixture
        .store
        .references(&fun_key("m", "gone", 1))
        .unwrap()
        .is_empty());

    // Surviving symbols carry exactly the fresh occurrence set
    assert_eq!(
        fixture
            .store
            .references(&fun_key("m", "kept", 1))
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        fixture
            .store
            .references(&SymbolKey::Macro {
                name: "OLD".to_string()
            })
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        fixture
            .store
            .references(&SymbolKey::Record {
                name: "legacy".to_string()
            })
            .unwrap()
            .len(),
        1
    );

    // The whole index still holds a single document for the location
    assert_eq!(fixture.store.stats().unwrap().documents, 1);
    assert_eq!(fixture.store.stats().unwrap().references, 3);
}

#[test]
fn reindex_of_another_location_leaves_neighbors_untouched() {
    let fixture = Fixture::new("reindex_neighbors");
    let a = Location::new("/virtual/src/a.erl");
    let b = Location::new("/virtual/src/b.erl");

    fixture
        .indexer
        .index_location(&a, b"module a\ncall shared:go/0\n")
        .unwrap();
    fixture
        .indexer
        .index_location(&b, b"module b\ncall shared:go/0\n")
        .unwrap();
    fixture
        .indexer
        .index_location(&a, b"module a\n")
        .unwrap();

    let occurrences = fixture
        .store
        .references(&fun_key("shared", "go", 0))
        .unwrap();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].location, b);
}

#[test]
fn moved_module_wins_the_identity_mapping() {
    let fixture = Fixture::new("moved_module");
    let old = Location::new("/virtual/src/old/m.erl");
    let new = Location::new("/virtual/src/new/m.erl");

    fixture
        .indexer
        .index_location(&old, b"module m\n")
        .unwrap();
    fixture
        .indexer
        .index_location(&new, b"module m\n%% moved\n")
        .unwrap();

    // Last writer wins on the identity mapping
    assert_eq!(fixture.store.module_location("m").unwrap(), Some(new));
}
