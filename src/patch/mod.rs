//! Extraction of add/remove/replace operations from MPD patch documents.

pub mod diagnostic;
pub mod errors;
pub mod model;
pub mod operation;

pub use diagnostic::{Diagnostic, DiagnosticReason};
pub use errors::PatchError;
pub use model::{Extraction, MalformedSelectorPolicy, PatchManifestModel, PatchMetadata};
pub use operation::{OperationKind, PatchOperation, PatchValue};
