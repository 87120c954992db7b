use crate::document::Element;
use crate::patch::diagnostic::Diagnostic;
use crate::patch::errors::PatchError;
use crate::patch::operation::{OperationKind, PatchOperation, PatchValue};
use crate::xpath::Selector;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PUBLISH_TIME: &str = "publishTime";
pub const ORIGINAL_PUBLISH_TIME: &str = "originalPublishTime";
pub const MPD_ID: &str = "mpdId";
pub const SELECTOR_FIELD: &str = "sel";
pub const POSITION_FIELD: &str = "pos";

/// What extraction does with a patch node whose `sel` does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedSelectorPolicy {
    /// Fail the whole patch document
    #[default]
    Abort,
    /// Drop the node and report a diagnostic
    Skip,
}

/// Document-level fields of a patch, read once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchMetadata {
    pub publish_time: Option<DateTime<Utc>>,
    pub original_publish_time: Option<DateTime<Utc>>,
    pub mpd_id: Option<String>,
}

impl PatchMetadata {
    pub fn from_patch(patch: &Element) -> Self {
        Self {
            publish_time: timestamp_field(patch, PUBLISH_TIME),
            original_publish_time: timestamp_field(patch, ORIGINAL_PUBLISH_TIME),
            mpd_id: patch
                .attribute(MPD_ID)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        }
    }
}

/// Operations pulled out of a patch, plus the nodes that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub operations: Vec<PatchOperation>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Reads metadata and operations out of parsed patch documents.
///
/// Holds no per-document state; one model can serve any number of patches,
/// from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchManifestModel {
    policy: MalformedSelectorPolicy,
}

impl PatchManifestModel {
    pub fn new(policy: MalformedSelectorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MalformedSelectorPolicy {
        self.policy
    }

    pub fn publish_time(&self, patch: &Element) -> Option<DateTime<Utc>> {
        timestamp_field(patch, PUBLISH_TIME)
    }

    pub fn original_publish_time(&self, patch: &Element) -> Option<DateTime<Utc>> {
        timestamp_field(patch, ORIGINAL_PUBLISH_TIME)
    }

    pub fn mpd_id<'a>(&self, patch: &'a Element) -> Option<&'a str> {
        patch.attribute(MPD_ID).filter(|id| !id.is_empty())
    }

    pub fn metadata(&self, patch: &Element) -> PatchMetadata {
        PatchMetadata::from_patch(patch)
    }

    /// Operations in document order. Skipped nodes are logged as warnings.
    pub fn patch_operations(&self, patch: &Element) -> Result<Vec<PatchOperation>, PatchError> {
        let extraction = self.extract(patch)?;
        for diagnostic in &extraction.diagnostics {
            diagnostic.log();
        }
        Ok(extraction.operations)
    }

    /// Like [`patch_operations`](Self::patch_operations), but hands skipped
    /// nodes back to the caller instead of logging them.
    pub fn extract(&self, patch: &Element) -> Result<Extraction, PatchError> {
        let mut extraction = Extraction::default();

        for (index, node) in patch.children().iter().enumerate() {
            let kind = match node.name().parse::<OperationKind>() {
                Ok(kind) => kind,
                Err(_) => {
                    extraction
                        .diagnostics
                        .push(Diagnostic::unsupported_kind(index, node.name()));
                    continue;
                }
            };

            let selector_text = node.attribute(SELECTOR_FIELD).unwrap_or_default();
            let selector = match Selector::parse(selector_text) {
                Ok(selector) => selector,
                Err(source) => match self.policy {
                    MalformedSelectorPolicy::Abort => {
                        return Err(PatchError::MalformedSelector { index, source });
                    }
                    MalformedSelectorPolicy::Skip => {
                        extraction
                            .diagnostics
                            .push(Diagnostic::malformed_selector(index, source));
                        continue;
                    }
                },
            };

            let value = if selector.targets_attribute() {
                PatchValue::Text(node.text().unwrap_or_default().to_string())
            } else {
                PatchValue::Elements(node.group_children_by_name())
            };

            let mut operation = PatchOperation::new(kind, selector, value);
            if kind == OperationKind::Add {
                operation =
                    operation.with_position(node.attribute(POSITION_FIELD).map(str::to_string));
            }
            extraction.operations.push(operation);
        }

        tracing::debug!(
            operations = extraction.operations.len(),
            skipped = extraction.diagnostics.len(),
            "extracted patch operations"
        );
        Ok(extraction)
    }
}

fn timestamp_field(patch: &Element, field: &str) -> Option<DateTime<Utc>> {
    let raw = patch.attribute(field)?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        tracing::warn!(field, value = raw, "ignoring unparseable patch timestamp");
    }
    parsed
}

/// xs:dateTime as used in MPDs; a missing offset is read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
