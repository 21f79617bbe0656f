use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use crate::deserializer::{Document, Items, RawSchema};
use crate::error::{Error, Result};
use crate::formats::FormatRegistry;

/// Pointer prefix of the only area `$ref`s may point into.
pub const DEFINITIONS_PREFIX: &str = "/definitions/";

pub const NULL_TAG: &str = "null";

/// Index of a node in a [`SchemaGraph`]. Two fields share a type exactly when
/// they resolve to the same `NodeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A normalized schema node. `reference` is already dereferenced: it points at
/// the final target of a `$ref` chain, never at another reference node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// JSON pointer of the location this node was read from.
    pub pointer: String,
    pub types: Vec<String>,
    pub properties: Option<BTreeMap<String, NodeId>>,
    pub items: Option<NodeId>,
    pub reference: Option<NodeId>,
    pub required: BTreeSet<String>,
    pub description: Option<String>,
    pub format: Option<String>,
}

impl SchemaNode {
    pub fn is_required(&self, property: &str) -> bool {
        self.required.contains(property)
    }

    /// The single non-null type tag of this node, or `None` when the tag list
    /// is anything other than one tag or one tag unioned with "null".
    pub fn primary_type(&self) -> Option<&str> {
        match self.types.as_slice() {
            [only] => Some(only.as_str()),
            [first, second] if first == NULL_TAG => Some(second.as_str()),
            [first, second] if second == NULL_TAG => Some(first.as_str()),
            _ => None,
        }
    }
}

/// Arena holding every node of one document. Immutable once loaded.
#[derive(Debug, Default)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        SchemaGraph::default()
    }

    pub fn push(&mut self, node: SchemaNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    /// The node a reference points to, or the node itself.
    pub fn target(&self, id: NodeId) -> NodeId {
        self.node(id).reference.unwrap_or(id)
    }

    /// Nullability is read from the referenced node, never from the reference site.
    pub fn allows_null(&self, id: NodeId) -> bool {
        self.node(self.target(id))
            .types
            .iter()
            .any(|t| t == NULL_TAG)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Identifies one version of one message type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct MessageSchema {
    pub key: MessageKey,
    pub major: u32,
    pub root: NodeId,
}

/// A loaded document. `messages` is sorted by message type, then version string.
#[derive(Debug)]
pub struct LoadedDocument {
    pub id: String,
    pub graph: SchemaGraph,
    pub messages: Vec<MessageSchema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Json,
    Yaml,
}

impl Syntax {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Syntax::Yaml,
            _ => Syntax::Json,
        }
    }
}

/// Extracts the major version from a `<major>` or `<major>.*` version key.
pub fn major_version(version: &str) -> Result<u32> {
    let major = version.strip_suffix(".*").unwrap_or(version);
    if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::BadVersionString(version.to_string()));
    }
    major
        .parse()
        .map_err(|_| Error::BadVersionString(version.to_string()))
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Splits a definitions pointer into its path segments, e.g.
/// `/definitions/vehicle/1.0` -> `["vehicle", "1.0"]`.
pub fn definition_path(pointer: &str) -> Option<Vec<String>> {
    pointer.strip_prefix(DEFINITIONS_PREFIX).map(|rest| {
        rest.split('/')
            .map(|t| t.replace("~1", "/").replace("~0", "~"))
            .collect()
    })
}

/// Parses a schema document and builds its node graph.
pub fn load(text: &str, syntax: Syntax, formats: &FormatRegistry) -> Result<LoadedDocument> {
    let value: Value = match syntax {
        Syntax::Json => serde_json::from_str(text)
            .map_err(|e| Error::UnreadableInput(format!("not valid JSON: {e}")))?,
        Syntax::Yaml => serde_yaml::from_str(text)
            .map_err(|e| Error::UnreadableInput(format!("not valid YAML: {e}")))?,
    };
    let document: Document = serde_json::from_value(value.clone())
        .map_err(|e| Error::UnreadableInput(e.to_string()))?;

    let mut loader = Loader {
        root: &value,
        id: &document.id,
        formats,
        graph: SchemaGraph::new(),
        by_pointer: HashMap::new(),
        ref_chain: HashSet::new(),
    };
    let mut messages = Vec::new();
    for (message, versions) in &document.schemas {
        // every version key of a message type is checked before any schema is read
        let majors = versions
            .keys()
            .map(|version| major_version(version))
            .collect::<Result<Vec<_>>>()?;
        for ((version, raw), major) in versions.iter().zip(majors) {
            let pointer = format!(
                "/schemas/{}/{}",
                escape_pointer_token(message),
                escape_pointer_token(version)
            );
            let schema: RawSchema = serde_json::from_value(raw.clone()).map_err(|e| {
                Error::UnreadableInput(format!("schema for {message} v{version}: {e}"))
            })?;
            let root = loader.node_at(&pointer, &schema)?;
            messages.push(MessageSchema {
                key: MessageKey {
                    message: message.clone(),
                    version: version.clone(),
                },
                major,
                root,
            });
        }
    }
    debug!(
        "loaded {} message schemas, {} schema nodes",
        messages.len(),
        loader.graph.len()
    );
    Ok(LoadedDocument {
        id: document.id.clone(),
        graph: loader.graph,
        messages,
    })
}

struct Loader<'a> {
    root: &'a Value,
    id: &'a str,
    formats: &'a FormatRegistry,
    graph: SchemaGraph,
    by_pointer: HashMap<String, NodeId>,
    /// Pointers of reference nodes whose own `$ref` is being followed.
    ref_chain: HashSet<String>,
}

impl Loader<'_> {
    /// Builds (or reuses) the node read from `pointer`.
    fn node_at(&mut self, pointer: &str, raw: &RawSchema) -> Result<NodeId> {
        if let Some(id) = self.by_pointer.get(pointer) {
            return Ok(*id);
        }
        // reserve the slot first so recursive references resolve to this node
        let id = self.graph.push(SchemaNode {
            pointer: pointer.to_string(),
            ..SchemaNode::default()
        });
        self.by_pointer.insert(pointer.to_string(), id);

        if let Some(reference) = &raw.reference {
            // siblings of `$ref` carry no meaning
            self.ref_chain.insert(pointer.to_string());
            let target = self.follow(reference);
            self.ref_chain.remove(pointer);
            self.graph.node_mut(id).reference = Some(target?);
            return Ok(id);
        }

        let properties = match &raw.properties {
            Some(props) => {
                let mut children = BTreeMap::new();
                for (name, child) in props {
                    let child_pointer =
                        format!("{pointer}/properties/{}", escape_pointer_token(name));
                    children.insert(name.clone(), self.node_at(&child_pointer, child)?);
                }
                Some(children)
            }
            None => None,
        };
        let items = match &raw.items {
            Some(Items::Schema(item)) => Some(self.node_at(&format!("{pointer}/items"), item)?),
            Some(Items::Tuple(_)) => {
                debug!("{pointer}: tuple-form items, treating elements as untyped");
                None
            }
            None => None,
        };

        let node = self.graph.node_mut(id);
        node.types = raw.types.clone().map(|t| t.into_vec()).unwrap_or_default();
        node.properties = properties;
        node.items = items;
        node.required = raw.required.iter().cloned().collect();
        node.description = raw.description.clone();
        node.format = raw.format.clone();
        if let Some(format) = &node.format {
            if !self.formats.is_registered(format) {
                warn!("{pointer}: unregistered format '{format}'");
            }
        }
        Ok(id)
    }

    /// Resolves a `$ref` to the final non-reference node it designates.
    fn follow(&mut self, reference: &str) -> Result<NodeId> {
        let unsupported = |reason: &str| Error::UnsupportedReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };
        let (url, fragment) = reference
            .split_once('#')
            .ok_or_else(|| unsupported("missing '#' fragment"))?;
        if !url.is_empty() && url != self.id {
            return Err(unsupported("points outside this document"));
        }
        if !fragment.starts_with(DEFINITIONS_PREFIX) {
            return Err(unsupported("only #/definitions/ references are supported"));
        }
        if let Some(&id) = self.by_pointer.get(fragment) {
            if self.ref_chain.contains(fragment) {
                return Err(unsupported("reference cycle"));
            }
            return Ok(self.graph.target(id));
        }
        let value = self
            .root
            .pointer(fragment)
            .ok_or_else(|| unsupported("no schema at this location"))?;
        let raw: RawSchema = serde_json::from_value(value.clone())
            .map_err(|e| unsupported(&format!("target is not a schema: {e}")))?;
        let id = self.node_at(fragment, &raw)?;
        Ok(self.graph.target(id))
    }
}
