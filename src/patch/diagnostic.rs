//! Diagnostics for patch nodes that extraction skipped.

use crate::xpath::SelectorError;
use std::fmt;

/// A patch child node that did not become an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Index of the node among the patch root's element children, in source
    /// order (`#text` entries of `__children` are not counted)
    pub index: usize,
    pub reason: DiagnosticReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticReason {
    /// Node tag is not `add`, `remove` or `replace`
    UnsupportedKind { kind: String },
    /// Selector failed to parse and the policy is to skip
    MalformedSelector { error: SelectorError },
}

impl Diagnostic {
    pub fn unsupported_kind(index: usize, kind: impl Into<String>) -> Self {
        Self {
            index,
            reason: DiagnosticReason::UnsupportedKind { kind: kind.into() },
        }
    }

    pub fn malformed_selector(index: usize, error: SelectorError) -> Self {
        Self {
            index,
            reason: DiagnosticReason::MalformedSelector { error },
        }
    }

    /// Emit this diagnostic as a `tracing` warning.
    pub fn log(&self) {
        match &self.reason {
            DiagnosticReason::UnsupportedKind { kind } => {
                tracing::warn!(
                    index = self.index,
                    kind = %kind,
                    "ignoring patch node of unsupported type"
                );
            }
            DiagnosticReason::MalformedSelector { error } => {
                tracing::warn!(
                    index = self.index,
                    error = %error,
                    "skipping patch node with malformed selector"
                );
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            DiagnosticReason::UnsupportedKind { kind } => {
                write!(f, "node {}: ignoring unsupported type '{kind}'", self.index)
            }
            DiagnosticReason::MalformedSelector { error } => {
                write!(f, "node {}: skipped, {error}", self.index)
            }
        }
    }
}
