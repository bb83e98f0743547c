use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ErlixError;

// ── Locations ───────────────────────────────────────────────────────────────

/// Canonical identifier for one source unit: the absolute path of the file,
/// canonicalized where possible. The indexing key for every table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    /// Build a location from an arbitrary string. Intended for stored values
    /// and tests; file-derived locations should go through [`Location::from_path`].
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derive the canonical location of a file on disk. Falls back to the
    /// path as given when canonicalization fails (e.g., the file vanished
    /// between discovery and indexing).
    pub fn from_path(path: &Path) -> Self {
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Self(canonical.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Source units ────────────────────────────────────────────────────────────

/// Kind of a source unit: a module (`.erl`) or a header (`.hrl`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Module,
    Header,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Header => write!(f, "header"),
        }
    }
}

impl std::str::FromStr for UnitKind {
    type Err = ErlixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "module" => Ok(Self::Module),
            "header" => Ok(Self::Header),
            _ => Err(ErlixError::Store(format!("invalid unit kind: {s}"))),
        }
    }
}

// ── Source ranges ───────────────────────────────────────────────────────────

/// 1-based position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Half-open range `[start, end)` in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position {
                line: start_line,
                column: start_column,
            },
            end: Position {
                line: end_line,
                column: end_column,
            },
        }
    }
}

// ── Points of interest ──────────────────────────────────────────────────────

/// A call target: either local (name/arity, qualified with the enclosing
/// module at key-derivation time) or remote (already module-qualified).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum FunctionTarget {
    Local { name: String, arity: u32 },
    Remote {
        module: String,
        name: String,
        arity: u32,
    },
}

/// Payload of a point of interest, one variant per extracted fact kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoiData {
    /// A `-spec` attribute: the parsed type-signature tree is stored as the
    /// front-end produced it.
    Spec {
        name: String,
        arity: u32,
        tree: serde_json::Value,
    },
    /// A call site.
    Application { target: FunctionTarget },
    /// An implicit fun reference: `fun f/1` or `fun m:f/1`.
    ImplicitFun { target: FunctionTarget },
    /// A `?MACRO` use.
    MacroUse { name: String },
    /// A `#rec.field` access.
    RecordAccess { name: String },
    /// A `#rec{..}` construction.
    RecordConstruct { name: String },
}

/// A point of interest extracted from parsed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub data: PoiData,
    pub range: Range,
}

impl Poi {
    pub fn new(data: PoiData, range: Range) -> Self {
        Self { data, range }
    }
}

// ── Symbol keys ─────────────────────────────────────────────────────────────

/// Lookup key for the reference index. The three namespaces are disjoint, so
/// a record named `state` never collides with a function named `state`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "namespace", rename_all = "snake_case")]
pub enum SymbolKey {
    Function {
        module: String,
        name: String,
        arity: u32,
    },
    Macro { name: String },
    Record { name: String },
}

impl SymbolKey {
    /// Derive the reference key for a POI, qualifying local call targets with
    /// the enclosing unit's identity. Returns `None` for POI kinds that do
    /// not produce references (specs).
    pub fn from_poi(data: &PoiData, enclosing_module: &str) -> Option<SymbolKey> {
        match data {
            PoiData::Spec { .. } => None,
            PoiData::Application { target } | PoiData::ImplicitFun { target } => {
                Some(match target {
                    FunctionTarget::Local { name, arity } => SymbolKey::Function {
                        module: enclosing_module.to_string(),
                        name: name.clone(),
                        arity: *arity,
                    },
                    FunctionTarget::Remote {
                        module,
                        name,
                        arity,
                    } => SymbolKey::Function {
                        module: module.clone(),
                        name: name.clone(),
                        arity: *arity,
                    },
                })
            }
            PoiData::MacroUse { name } => Some(SymbolKey::Macro { name: name.clone() }),
            PoiData::RecordAccess { name } | PoiData::RecordConstruct { name } => {
                Some(SymbolKey::Record { name: name.clone() })
            }
        }
    }
}

impl std::fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function {
                module,
                name,
                arity,
            } => write!(f, "{module}:{name}/{arity}"),
            Self::Macro { name } => write!(f, "?{name}"),
            Self::Record { name } => write!(f, "#{name}"),
        }
    }
}

// ── Documents ───────────────────────────────────────────────────────────────

/// A parsed source unit with its extracted facts. Replaced wholesale on
/// re-index; a new Document always fully supersedes the old one for its
/// location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub location: Location,
    /// Logical identity of the unit (module or header name).
    pub module: String,
    pub kind: UnitKind,
    /// SHA-256 hex digest of the raw source bytes.
    pub fingerprint: String,
    pub pois: Vec<Poi>,
}

/// What the front-end extracts from raw source: everything a [`Document`]
/// needs except the location and fingerprint, which the indexer supplies.
#[derive(Debug, Clone)]
pub struct UnitFacts {
    pub module: String,
    pub kind: UnitKind,
    pub pois: Vec<Poi>,
}
