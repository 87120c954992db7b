use crate::document::DocumentOptions;
use crate::patch::{MalformedSelectorPolicy, PatchManifestModel};
use serde::Deserialize;
use thiserror::Error;

const RESERVED_PREFIXES: &[&str] = &["__", "#"];

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default)]
    pub document: DocumentSection,
    #[serde(default)]
    pub extraction: ExtractionSection,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.document.root.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "document.root",
            });
        }

        let prefix = &self.document.attribute_prefix;
        if RESERVED_PREFIXES
            .iter()
            .any(|reserved| prefix.starts_with(reserved))
        {
            issues.push(ValidationIssue::InvalidValue {
                field: "document.attribute_prefix",
                message: format!("'{prefix}' collides with parser bookkeeping keys"),
            });
        }
        if prefix.chars().any(char::is_whitespace) {
            issues.push(ValidationIssue::InvalidValue {
                field: "document.attribute_prefix",
                message: "whitespace not allowed".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions {
            attribute_prefix: self.document.attribute_prefix.clone(),
            ordered_root: false,
        }
    }

    /// Options for patch documents, whose root children must keep source order.
    pub fn patch_document_options(&self) -> DocumentOptions {
        DocumentOptions {
            ordered_root: true,
            ..self.document_options()
        }
    }

    pub fn patch_model(&self) -> PatchManifestModel {
        PatchManifestModel::new(self.extraction.malformed_selector)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DocumentSection {
    #[serde(default)]
    pub attribute_prefix: String,
    /// Expected name of the manifest root element
    #[serde(default = "default_root")]
    pub root: String,
}

impl Default for DocumentSection {
    fn default() -> Self {
        Self {
            attribute_prefix: String::new(),
            root: default_root(),
        }
    }
}

fn default_root() -> String {
    "MPD".to_string()
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ExtractionSection {
    #[serde(default)]
    pub malformed_selector: MalformedSelectorPolicy,
}

/// Every problem found in one config, reported together.
#[derive(Error, Debug, Clone)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ValidationIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("config missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}
