//! fixture-overlay - Mock data backend with named, inheriting overlays
//!
//! A fixture tree holds a base dataset plus zero or more named overlays;
//! each overlay can add, override, or delete records per model and may
//! include other overlays. The engine resolves an overlay's inclusion graph
//! into a deterministic, cycle-free merge chain and folds it into a single
//! provenance-tagged dataset per model.

pub mod directory;
pub mod engine;
pub mod error;
pub mod merge;
pub mod overlay;
pub mod record;
pub mod registry;
pub mod selection;

pub use directory::{FsDirectory, MemoryDirectory, ModuleDirectory};
pub use engine::OverlayEngine;
pub use error::{ConfigError, DirectoryError, FixtureError, SelectionError, ValidationError};
pub use overlay::{overlay_label, OverlayConfig, BASE_OVERLAY};
pub use record::{Record, RecordTagger, DELETED_FLAG, META_FIELD};
pub use registry::FixtureRegistry;
pub use selection::{
    select, FileStore, MemoryStore, Selection, SelectionInput, SelectionSource, SelectionStore,
};
