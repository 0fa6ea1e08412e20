//! Active overlay selection
//!
//! The engine itself never decides which overlay is active; this module
//! implements the selection precedence consumed from the run context:
//! explicit override, then query-style parameter, then static configuration,
//! then a previously persisted selection, then none (base only).
//!
//! A non-empty selection from any of the first three sources is persisted
//! for later runs; an empty one (explicit reset) clears the persisted value.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SelectionError;

/// Conventional name of the query-style parameter carrying the overlay.
pub const QUERY_PARAM: &str = "FIXTURES_OVERLAY";

/// Where the winning selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Explicit override passed at test/bootstrap time
    Explicit,
    /// Query-style parameter on the current run context
    QueryParam,
    /// Static configuration value
    StaticConfig,
    /// Previously persisted selection
    Persisted,
    /// Nothing selected; base only
    Default,
}

impl SelectionSource {
    /// Human-readable description for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            SelectionSource::Explicit => "explicit override",
            SelectionSource::QueryParam => "query parameter",
            SelectionSource::StaticConfig => "static configuration",
            SelectionSource::Persisted => "persisted selection",
            SelectionSource::Default => "default",
        }
    }
}

/// The resolved selection: the active overlay name (if any) and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Active overlay name; `None` means base only.
    pub name: Option<String>,
    /// Which source won.
    pub source: SelectionSource,
}

/// Candidate values gathered from the run context, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct SelectionInput {
    /// Explicit override (an empty string is an explicit reset).
    pub explicit: Option<String>,
    /// Query-style parameter value.
    pub query_param: Option<String>,
    /// Static configuration value.
    pub static_config: Option<String>,
}

/// Persists the selected overlay between runs.
pub trait SelectionStore {
    /// The persisted name, if any.
    fn load(&self) -> Result<Option<String>, SelectionError>;
    /// Persist `name` for later runs.
    fn save(&self, name: &str) -> Result<(), SelectionError>;
    /// Drop any persisted name.
    fn clear(&self) -> Result<(), SelectionError>;
}

/// Resolve the active overlay from `input` and `store`.
///
/// The first present value among explicit / query parameter / static config
/// wins; non-empty winners are persisted, empty ones clear the store and
/// fall back to base. When none is present, the store's value applies
/// without being rewritten.
pub fn select(
    input: &SelectionInput,
    store: &dyn SelectionStore,
) -> Result<Selection, SelectionError> {
    let winner = [
        (&input.explicit, SelectionSource::Explicit),
        (&input.query_param, SelectionSource::QueryParam),
        (&input.static_config, SelectionSource::StaticConfig),
    ]
    .into_iter()
    .find_map(|(value, source)| value.as_ref().map(|name| (name.clone(), source)));

    if let Some((name, source)) = winner {
        if name.is_empty() {
            store.clear()?;
            return Ok(Selection { name: None, source });
        }
        store.save(&name)?;
        return Ok(Selection {
            name: Some(name),
            source,
        });
    }

    match store.load()? {
        Some(name) if !name.is_empty() => Ok(Selection {
            name: Some(name),
            source: SelectionSource::Persisted,
        }),
        _ => Ok(Selection {
            name: None,
            source: SelectionSource::Default,
        }),
    }
}

/// In-memory store for tests and single-run embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: RefCell<Option<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Create a store with a pre-persisted value.
    pub fn with_value(name: &str) -> Self {
        MemoryStore {
            value: RefCell::new(Some(name.to_string())),
        }
    }
}

impl SelectionStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, SelectionError> {
        Ok(self.value.borrow().clone())
    }

    fn save(&self, name: &str) -> Result<(), SelectionError> {
        *self.value.borrow_mut() = Some(name.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SelectionError> {
        *self.value.borrow_mut() = None;
        Ok(())
    }
}

/// Store backed by a single plain-text file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store at `path`; the file may not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileStore {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SelectionStore for FileStore {
    fn load(&self) -> Result<Option<String>, SelectionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let name = raw.trim();
                Ok((!name.is_empty()).then(|| name.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, name: &str) -> Result<(), SelectionError> {
        fs::write(&self.path, name)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SelectionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
