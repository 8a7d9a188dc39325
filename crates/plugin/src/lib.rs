//! Plugin seams for the jarweave merge pass.
//!
//! The merge pass in `jarweave-core` only knows archive entries and byte
//! streams. Everything that understands compiled classes lives behind the
//! traits defined here and is supplied by a language plugin
//! (see `jarweave-java`).

pub mod inject;
pub mod model;
pub mod rules;
pub mod scan;

pub use inject::InjectorRewriter;
pub use model::{FlowTaskMap, MergedMetadata, RouteMapSet};
pub use rules::{HolderKind, HolderRules};
pub use scan::{ClassScanner, ScanResult};

/// Error type for plugin operations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
