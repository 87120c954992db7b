use crate::config::schema::{EngineConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml_edit::de::Error),

    #[error("invalid config: {0}")]
    Validation(#[from] ValidationError),

    /// Any of the above, raised while loading a specific file
    #[error("{path}: {source}")]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<ConfigError>,
    },
}

/// Deserialize and validate an engine config. An empty string yields the defaults.
pub fn load_from_str(input: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml_edit::de::from_str(input)?;
    config.validate()?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|source| ConfigError::InFile {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::MalformedSelectorPolicy;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.document.root, "MPD");
        assert_eq!(
            config.extraction.malformed_selector,
            MalformedSelectorPolicy::Abort
        );
    }

    #[test]
    fn parses_all_sections() {
        let config = load_from_str(
            r#"
[document]
attribute_prefix = "_"
root = "MPD"

[extraction]
malformed_selector = "skip"
"#,
        )
        .unwrap();

        assert_eq!(config.document_options().attribute_prefix, "_");
        assert_eq!(config.patch_model().policy(), MalformedSelectorPolicy::Skip);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = load_from_str("[extraction]\nmalformed_selector = \"ignore\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn validation_reports_every_issue() {
        let err = load_from_str("[document]\nroot = \"\"\nattribute_prefix = \"__\"\n").unwrap_err();
        match err {
            ConfigError::Validation(source) => assert_eq!(source.issues.len(), 2),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn load_from_path_names_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[document]\nroot = \"\"\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("engine.toml"), "{message}");
        assert!(message.contains("document.root"), "{message}");
        match err {
            ConfigError::InFile { source, .. } => {
                assert!(matches!(*source, ConfigError::Validation(_)))
            }
            other => panic!("expected error tied to the file, got {other}"),
        }

        let missing = load_from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
