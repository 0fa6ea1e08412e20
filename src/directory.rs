//! Module directories
//!
//! The engine never touches the filesystem itself; it queries a
//! `ModuleDirectory` for raw exported data by logical path. Logical paths
//! follow the fixture tree conventions:
//!
//! - `<model>` — base overlay fixture layer
//! - `overlays/<name>/_config` — overlay configuration object
//! - `overlays/<name>/<model>` — overlay fixture layer

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::DirectoryError;

/// Resolves logical paths to raw exported data.
pub trait ModuleDirectory {
    /// Every logical path this directory knows, in unspecified order.
    fn list(&self) -> Vec<String>;

    /// The raw exported data for `path`, if present.
    fn load(&self, path: &str) -> Option<Value>;

    /// Whether `path` exists.
    fn has(&self, path: &str) -> bool {
        self.load(path).is_some()
    }
}

/// In-memory module directory for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    modules: BTreeMap<String, Value>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        MemoryDirectory::default()
    }

    /// Builder-style module registration.
    pub fn with_module(mut self, path: &str, data: Value) -> Self {
        self.insert(path, data);
        self
    }

    /// Register (or replace) a module.
    pub fn insert(&mut self, path: &str, data: Value) {
        self.modules.insert(path.to_string(), data);
    }
}

impl ModuleDirectory for MemoryDirectory {
    fn list(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    fn load(&self, path: &str) -> Option<Value> {
        self.modules.get(path).cloned()
    }

    fn has(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }
}

/// Module directory backed by a tree of `.json` files.
///
/// The whole tree is read once at open time; a file at
/// `<root>/overlays/demo/contact.json` becomes the logical path
/// `overlays/demo/contact`. Non-JSON files are ignored.
#[derive(Debug)]
pub struct FsDirectory {
    root: PathBuf,
    modules: BTreeMap<String, Value>,
}

impl FsDirectory {
    /// Read every `.json` file under `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let root = root.as_ref().to_path_buf();
        let mut modules = BTreeMap::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(logical) = logical_path(&root, path) else {
                continue;
            };
            let raw = fs::read_to_string(path)?;
            let data = serde_json::from_str(&raw).map_err(|source| DirectoryError::Json {
                path: logical.clone(),
                source,
            })?;
            modules.insert(logical, data);
        }
        Ok(FsDirectory { root, modules })
    }

    /// The directory's root path.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModuleDirectory for FsDirectory {
    fn list(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    fn load(&self, path: &str) -> Option<Value> {
        self.modules.get(path).cloned()
    }

    fn has(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }
}

/// Strip the root prefix and the `.json` extension, normalizing separators.
fn logical_path(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
