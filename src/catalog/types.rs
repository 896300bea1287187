use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Raw tag value as stored: an array, a JSON-encoded string, or a
    /// comma-separated string. Use [`parse_tags`] to read it.
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Catalog {
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub sources: HashMap<String, Vec<Source>>,
}

impl Catalog {
    pub fn sources_of(&self, collection_id: &str) -> &[Source] {
        self.sources
            .get(collection_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every distinct tag across all sources, sorted for stable UI order.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags = self
            .sources
            .values()
            .flatten()
            .flat_map(|source| parse_tags(source.tags.as_ref()))
            .collect::<Vec<_>>();
        tags.sort();
        tags.dedup();
        tags
    }
}

/// Tag values arrive in three shapes depending on how the record was
/// written: a proper array, a JSON-encoded string, or a comma-separated
/// string. Parse in that priority order; anything unreadable degrades to an
/// empty set rather than an error.
pub fn parse_tags(raw: Option<&Value>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|tag| tag.trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .collect(),
        Value::String(text) => {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
                return items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|tag| tag.trim().to_owned())
                    .filter(|tag| !tag.is_empty())
                    .collect();
            }

            text.split(',')
                .map(|tag| tag.trim().to_owned())
                .filter(|tag| !tag.is_empty())
                .collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{Catalog, parse_tags};

    #[test]
    fn parse_tags_from_array() {
        let raw = json!(["guide", " notes "]);
        assert_eq!(parse_tags(Some(&raw)), vec!["guide", "notes"]);
    }

    #[test]
    fn parse_tags_from_json_encoded_string() {
        let raw = Value::String(r#"["guide","paper"]"#.to_owned());
        assert_eq!(parse_tags(Some(&raw)), vec!["guide", "paper"]);
    }

    #[test]
    fn parse_tags_from_comma_separated_string() {
        let raw = Value::String("guide, paper,,draft".to_owned());
        assert_eq!(parse_tags(Some(&raw)), vec!["guide", "paper", "draft"]);
    }

    #[test]
    fn parse_tags_degrades_to_empty() {
        assert!(parse_tags(None).is_empty());
        assert!(parse_tags(Some(&json!(42))).is_empty());
        assert!(parse_tags(Some(&json!([1, 2]))).is_empty());
    }

    #[test]
    fn catalog_decodes_and_collects_tags() {
        let catalog: Catalog = serde_json::from_str(
            r#"{
                "collections": [{"id": "c1", "name": "Docs"}],
                "sources": {
                    "c1": [
                        {"id": "s1", "name": "Intro", "type": "file", "tags": ["guide"]},
                        {"id": "s2", "name": "Spec", "tags": "guide, reference"}
                    ]
                }
            }"#,
        )
        .expect("catalog decodes");

        assert_eq!(catalog.collections.len(), 1);
        assert_eq!(catalog.sources_of("c1").len(), 2);
        assert_eq!(catalog.sources_of("missing").len(), 0);
        assert_eq!(catalog.all_tags(), vec!["guide", "reference"]);
    }
}
