use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document must be an object with exactly one root element key")]
    MissingRoot,

    #[error("unexpected {found} while reading element '{element}'")]
    UnexpectedValue {
        element: String,
        found: &'static str,
    },

    #[error("children of '{element}' ({tags}) carry no document order; expected a __children list")]
    UnorderedChildren { element: String, tags: String },

    #[error("failed to read document from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
