use crate::xpath::SelectorError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("patch operation {index} has a malformed selector: {source}")]
    MalformedSelector {
        index: usize,
        #[source]
        source: SelectorError,
    },

    #[error("unsupported patch operation kind '{kind}'")]
    UnsupportedOperationKind { kind: String },
}
