use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The top level of a message schema document.
///
/// Version entries are kept as raw JSON so their keys can be checked before any
/// schema under them is deserialized; `parser` turns them into [`RawSchema`]s.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Document {
    /// Document identifier, used as the base of every `$ref` URL.
    pub id: String,
    /// Message type name -> version string -> message schema.
    pub schemas: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

/// `type` may be written as a single tag or as a list of tags.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TypeTags {
    Single(String),
    Many(Vec<String>),
}

impl TypeTags {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TypeTags::Single(tag) => vec![tag],
            TypeTags::Many(tags) => tags,
        }
    }
}

/// `items` is either one schema for every element or a positional list (tuple form).
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum Items {
    Schema(Box<RawSchema>),
    Tuple(Vec<RawSchema>),
}

/// A single schema object, as written in the document.
/// Keywords that don't influence the generated types are ignored.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawSchema {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub types: Option<TypeTags>,
    pub properties: Option<BTreeMap<String, RawSchema>>,
    pub items: Option<Items>,
    #[serde(default)]
    pub required: Vec<String>,
    pub description: Option<String>,
    pub format: Option<String>,
}
