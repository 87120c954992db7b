//! Restricted XPath selectors for MPD patch documents.
//!
//! Only the subset used by DASH manifest patches is understood: a sequence
//! of `/`-separated components, each an element or `@attribute` name with at
//! most one predicate (`[2]` or `[@id="p1"]`). Anything richer is rejected at
//! parse time instead of being approximated.

pub mod errors;
pub mod resolve;
pub mod selector;

pub use errors::SelectorError;
pub use resolve::ResolvedTarget;
pub use selector::{AttributeMatch, PathComponent, Predicate, Selector, ATTRIBUTE_SENTINEL};
