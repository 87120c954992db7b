use crate::document::{Element, ElementGroups};
use crate::patch::errors::PatchError;
use crate::xpath::{ResolvedTarget, Selector};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
    Remove,
    Replace,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Add => "add",
            OperationKind::Remove => "remove",
            OperationKind::Replace => "replace",
        }
    }

    /// Add and remove act on the parent's child list; replace acts in place.
    pub fn is_sibling_operation(self) -> bool {
        matches!(self, OperationKind::Add | OperationKind::Remove)
    }
}

impl FromStr for OperationKind {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(OperationKind::Add),
            "remove" => Ok(OperationKind::Remove),
            "replace" => Ok(OperationKind::Replace),
            other => Err(PatchError::UnsupportedOperationKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload carried by an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PatchValue {
    /// New attribute value, for selectors ending in `@attr`
    Text(String),
    /// Replacement or inserted elements, grouped by tag
    Elements(ElementGroups),
}

impl PatchValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PatchValue::Text(text) => Some(text),
            PatchValue::Elements(_) => None,
        }
    }

    pub fn as_elements(&self) -> Option<&ElementGroups> {
        match self {
            PatchValue::Text(_) => None,
            PatchValue::Elements(groups) => Some(groups),
        }
    }
}

/// One normalized edit from a patch document, ready for an applier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOperation {
    kind: OperationKind,
    selector: Selector,
    value: PatchValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<String>,
}

impl PatchOperation {
    pub fn new(kind: OperationKind, selector: Selector, value: PatchValue) -> Self {
        Self {
            kind,
            selector,
            value,
            position: None,
        }
    }

    /// Attach the raw `pos` hint. Ignored for anything but [`OperationKind::Add`].
    pub fn with_position(mut self, position: Option<String>) -> Self {
        if self.kind == OperationKind::Add {
            self.position = position;
        }
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn value(&self) -> &PatchValue {
        &self.value
    }

    /// Verbatim `pos` hint (`prepend`, `before`, `after`, ...); only set for adds.
    pub fn position(&self) -> Option<&str> {
        self.position.as_deref()
    }

    /// Locate this operation's target in `root`, using the sibling context its kind implies.
    pub fn resolve<'a>(&'a self, root: &'a Element) -> Option<ResolvedTarget<'a>> {
        self.selector.resolve(root, self.kind.is_sibling_operation())
    }
}
