//! Materialize [`Element`] trees from x2js-shaped JSON.
//!
//! The upstream XML parser exposes a repeated child `X` both as `X` and as
//! `X_asArray`, keeps element text under `__text`, and may record document
//! order in `__children`. All of that is folded into plain ordered children
//! here, so nothing downstream probes for either form.

use crate::document::element::Element;
use crate::document::errors::DocumentError;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

pub const TEXT_KEY: &str = "__text";
pub const CHILDREN_KEY: &str = "__children";
pub const ARRAY_SUFFIX: &str = "_asArray";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Prefix the parser puts on attribute keys. Empty means every scalar
    /// field is an attribute.
    pub attribute_prefix: String,
    /// Require `__children` on the root whenever it holds more than one child
    /// tag. Set for patch documents, whose operation order is significant and
    /// cannot be recovered from the keyed form.
    pub ordered_root: bool,
}

pub fn load_from_str(input: &str, options: &DocumentOptions) -> Result<Element, DocumentError> {
    let value: Value = serde_json::from_str(input)?;
    document_from_json(&value, options)
}

pub fn load_from_path(
    path: impl AsRef<Path>,
    options: &DocumentOptions,
) -> Result<Element, DocumentError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents, options)
}

/// Unwrap a `{"MPD": {...}}` document object into its root element.
pub fn document_from_json(
    value: &Value,
    options: &DocumentOptions,
) -> Result<Element, DocumentError> {
    let Value::Object(map) = value else {
        return Err(DocumentError::MissingRoot);
    };

    let mut roots = map
        .iter()
        .filter(|(key, _)| !is_bookkeeping(key) && !key.ends_with(ARRAY_SUFFIX));
    match (roots.next(), roots.next()) {
        (Some((name, root)), None) => {
            let element = element_from_json(name, root, options)?;
            if options.ordered_root && !has_child_order(root) {
                let tags: BTreeSet<&str> = element.children().iter().map(Element::name).collect();
                if tags.len() > 1 {
                    return Err(DocumentError::UnorderedChildren {
                        element: name.clone(),
                        tags: tags.into_iter().collect::<Vec<_>>().join(", "),
                    });
                }
            }
            Ok(element)
        }
        _ => Err(DocumentError::MissingRoot),
    }
}

fn has_child_order(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.contains_key(CHILDREN_KEY))
}

pub fn element_from_json(
    name: &str,
    value: &Value,
    options: &DocumentOptions,
) -> Result<Element, DocumentError> {
    match value {
        Value::Object(map) => element_from_object(name, map, options),
        Value::Null => Ok(Element::new(name)),
        Value::Array(_) => Err(DocumentError::UnexpectedValue {
            element: name.to_string(),
            found: "array",
        }),
        scalar => {
            let mut element = Element::new(name);
            if let Some(text) = scalar_text(scalar) {
                element = element.with_text(text);
            }
            Ok(element)
        }
    }
}

fn element_from_object(
    name: &str,
    map: &Map<String, Value>,
    options: &DocumentOptions,
) -> Result<Element, DocumentError> {
    let mut element = Element::new(name);
    if let Some(text) = map.get(TEXT_KEY).and_then(scalar_text) {
        element.append_text(&text);
    }

    match map.get(CHILDREN_KEY) {
        Some(Value::Array(entries)) => {
            let mut child_names = HashSet::new();
            for entry in entries {
                let Value::Object(entry) = entry else {
                    return Err(DocumentError::UnexpectedValue {
                        element: name.to_string(),
                        found: value_kind(entry),
                    });
                };
                for (key, child) in entry {
                    // #text, #comment and #cdata-section are not structural
                    if key.starts_with('#') {
                        continue;
                    }
                    child_names.insert(key.as_str());
                    push_children(&mut element, key, child, options)?;
                }
            }

            for (key, value) in map {
                if is_bookkeeping(key)
                    || key.ends_with(ARRAY_SUFFIX)
                    || child_names.contains(key.as_str())
                {
                    continue;
                }
                if let Some(text) = scalar_text(value) {
                    if options.attribute_prefix.is_empty() {
                        element.set_attribute(key.as_str(), text);
                    } else if let Some(attribute) = key.strip_prefix(&options.attribute_prefix) {
                        element.set_attribute(attribute, text);
                    }
                }
            }
        }
        Some(other) => {
            return Err(DocumentError::UnexpectedValue {
                element: name.to_string(),
                found: value_kind(other),
            });
        }
        None => {
            for (key, value) in map {
                if is_bookkeeping(key) {
                    continue;
                }
                if let Some(base) = key.strip_suffix(ARRAY_SUFFIX) {
                    push_children(&mut element, base, value, options)?;
                    continue;
                }
                if map.contains_key(&format!("{key}{ARRAY_SUFFIX}")) {
                    continue;
                }
                match value {
                    Value::Object(_) | Value::Array(_) => {
                        push_children(&mut element, key, value, options)?;
                    }
                    Value::Null => {}
                    scalar => insert_scalar(&mut element, key, scalar, options),
                }
            }
        }
    }

    Ok(element)
}

fn push_children(
    element: &mut Element,
    name: &str,
    value: &Value,
    options: &DocumentOptions,
) -> Result<(), DocumentError> {
    match value {
        Value::Array(items) => {
            for item in items {
                element.push_child(element_from_json(name, item, options)?);
            }
        }
        other => element.push_child(element_from_json(name, other, options)?),
    }
    Ok(())
}

fn insert_scalar(element: &mut Element, key: &str, value: &Value, options: &DocumentOptions) {
    let Some(text) = scalar_text(value) else {
        return;
    };
    if options.attribute_prefix.is_empty() {
        element.set_attribute(key, text);
    } else if let Some(attribute) = key.strip_prefix(&options.attribute_prefix) {
        element.set_attribute(attribute, text);
    } else {
        // text-only child element, e.g. <BaseURL>...</BaseURL>
        element.push_child(Element::new(key).with_text(text));
    }
}

fn is_bookkeeping(key: &str) -> bool {
    key.starts_with("__") || key.starts_with('#')
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> DocumentOptions {
        DocumentOptions::default()
    }

    #[test]
    fn prefers_array_form_over_singular() {
        let value = json!({
            "MPD": {
                "type": "dynamic",
                "Period": { "id": "p2" },
                "Period_asArray": [{ "id": "p1" }, { "id": "p2" }]
            }
        });

        let mpd = document_from_json(&value, &options()).unwrap();
        assert_eq!(mpd.name(), "MPD");
        assert_eq!(mpd.attribute("type"), Some("dynamic"));
        let ids: Vec<_> = mpd
            .children_named("Period")
            .filter_map(|p| p.attribute("id"))
            .collect();
        assert_eq!(ids, ["p1", "p2"]);
    }

    #[test]
    fn singular_child_becomes_one_element_sequence() {
        let value = json!({ "MPD": { "Period": { "id": "only" } } });
        let mpd = document_from_json(&value, &options()).unwrap();
        assert_eq!(mpd.children_named("Period").count(), 1);
    }

    #[test]
    fn ordered_children_skip_text_entries() {
        let value = json!({
            "Patch": {
                "mpdId": "live",
                "__children": [
                    { "#text": "\n  " },
                    { "add": { "sel": "/MPD/Period", "__text": "" } },
                    { "#text": "\n  " },
                    { "remove": { "sel": "/MPD/Period[1]" } }
                ],
                "add": { "sel": "/MPD/Period" },
                "remove": { "sel": "/MPD/Period[1]" }
            }
        });

        let patch = document_from_json(&value, &options()).unwrap();
        let names: Vec<_> = patch.children().iter().map(Element::name).collect();
        assert_eq!(names, ["add", "remove"]);
        assert_eq!(patch.attribute("mpdId"), Some("live"));
        assert!(patch.attribute("add").is_none());
    }

    #[test]
    fn attribute_prefix_separates_text_children() {
        let options = DocumentOptions {
            attribute_prefix: "_".to_string(),
            ..DocumentOptions::default()
        };
        let value = json!({
            "MPD": { "_type": "static", "BaseURL": "https://cdn.example/", "mediaPresentationDuration": 3 }
        });

        let mpd = document_from_json(&value, &options).unwrap();
        assert_eq!(mpd.attribute("type"), Some("static"));
        assert_eq!(
            mpd.first_child("BaseURL").and_then(Element::text),
            Some("https://cdn.example/")
        );
        assert_eq!(
            mpd.first_child("mediaPresentationDuration").and_then(Element::text),
            Some("3")
        );
    }

    #[test]
    fn rejects_documents_without_single_root() {
        assert!(matches!(
            load_from_str("[]", &options()),
            Err(DocumentError::MissingRoot)
        ));
        assert!(matches!(
            load_from_str(r#"{"MPD": {}, "Patch": {}}"#, &options()),
            Err(DocumentError::MissingRoot)
        ));
        assert!(matches!(
            load_from_str("{", &options()),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn ordered_root_rejects_mixed_tags_without_child_order() {
        let strict = DocumentOptions {
            ordered_root: true,
            ..DocumentOptions::default()
        };
        let keyed = r#"{"Patch": {
            "replace": { "sel": "/MPD/@publishTime", "__text": "2020-01-01T00:00:10Z" },
            "add": { "sel": "/MPD/Period" }
        }}"#;

        match load_from_str(keyed, &strict) {
            Err(DocumentError::UnorderedChildren { element, tags }) => {
                assert_eq!(element, "Patch");
                assert_eq!(tags, "add, replace");
            }
            other => panic!("expected unordered children error, got {other:?}"),
        }
        assert_eq!(load_from_str(keyed, &options()).unwrap().children().len(), 2);
    }

    #[test]
    fn ordered_root_accepts_single_tag_or_child_order() {
        let strict = DocumentOptions {
            ordered_root: true,
            ..DocumentOptions::default()
        };
        let single_tag = r#"{"Patch": {
            "remove": { "sel": "/MPD/Period[2]" },
            "remove_asArray": [{ "sel": "/MPD/Period[1]" }, { "sel": "/MPD/Period[2]" }]
        }}"#;
        let patch = load_from_str(single_tag, &strict).unwrap();
        let selectors: Vec<_> = patch
            .children()
            .iter()
            .filter_map(|c| c.attribute("sel"))
            .collect();
        assert_eq!(selectors, ["/MPD/Period[1]", "/MPD/Period[2]"]);

        let ordered = r#"{"Patch": { "__children": [
            { "replace": { "sel": "/MPD/@publishTime" } },
            { "add": { "sel": "/MPD/Period" } }
        ]}}"#;
        let patch = load_from_str(ordered, &strict).unwrap();
        let names: Vec<_> = patch.children().iter().map(Element::name).collect();
        assert_eq!(names, ["replace", "add"]);
    }
}
