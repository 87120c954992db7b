//! Normalized element trees for manifests and patch documents.
//!
//! XML parsing itself happens upstream; this module consumes the x2js-style
//! JSON that parser emits and normalizes it once into [`Element`] trees.

pub mod element;
pub mod errors;
pub mod x2js;

pub use element::{Element, ElementGroups};
pub use errors::DocumentError;
pub use x2js::{
    document_from_json, element_from_json, load_from_path, load_from_str, DocumentOptions,
};
