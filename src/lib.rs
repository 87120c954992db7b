//! MPD Patcher: selector resolution and operation extraction for MPEG-DASH
//! manifest patches.
//!
//! A patch document carries an ordered list of `add`, `remove` and `replace`
//! edits, each addressed by a restricted XPath selector. This crate turns a
//! parsed patch into [`PatchOperation`] values and resolves selectors against a
//! live manifest tree. Applying the edits is left to the caller.
//!
//! # Architecture
//!
//! - [`xpath`]: selector grammar and resolution against an [`Element`] tree.
//! - [`document`]: the normalized element tree and the x2js JSON boundary.
//! - [`patch`]: metadata and operation extraction.
//! - [`config`]: engine configuration loaded from TOML.
//!
//! # Example
//!
//! ```
//! use mpd_patcher::{Element, OperationKind, PatchManifestModel};
//!
//! let manifest = Element::new("MPD")
//!     .with_child(Element::new("Period").with_attribute("id", "p1"));
//! let patch = Element::new("Patch").with_child(
//!     Element::new("remove").with_attribute("sel", "/MPD/Period[@id=\"p1\"]"),
//! );
//!
//! let model = PatchManifestModel::default();
//! let operations = model.patch_operations(&patch).unwrap();
//! assert_eq!(operations[0].kind(), OperationKind::Remove);
//!
//! let target = operations[0].resolve(&manifest).unwrap();
//! assert_eq!(target.target, &manifest);
//! ```

pub mod config;
pub mod document;
pub mod patch;
pub mod xpath;

// Re-exports
pub use config::{ConfigError, EngineConfig};
pub use document::{DocumentError, DocumentOptions, Element, ElementGroups};
pub use patch::{
    Diagnostic, DiagnosticReason, Extraction, MalformedSelectorPolicy, OperationKind, PatchError,
    PatchManifestModel, PatchMetadata, PatchOperation, PatchValue,
};
pub use xpath::{PathComponent, Predicate, ResolvedTarget, Selector, SelectorError};
