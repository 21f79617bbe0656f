use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::parser::{NodeId, SchemaGraph};

/// A language-neutral field type. Backends decide the concrete spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    Integer,
    String,
    Boolean,
    Float,
    /// A declared composite type, referenced by name.
    Composite(String),
    /// A sequence with a typed element, e.g. `[]T` / `Vec<T>`.
    Sequence(Box<TargetType>),
    /// A sequence whose elements have no schema.
    DynamicSequence,
    /// An explicitly nullable primitive, e.g. `*T` / `Option<T>`.
    Nullable(Box<TargetType>),
}

impl TargetType {
    /// Composite and sequence types can already hold "no value" in the target
    /// representation, so they never get an explicit nullable wrapper.
    pub fn is_naturally_nullable(&self) -> bool {
        matches!(
            self,
            TargetType::Composite(_)
                | TargetType::Sequence(_)
                | TargetType::DynamicSequence
                | TargetType::Nullable(_)
        )
    }
}

/// Run-scoped map from node identity to the name of its declaration.
/// Append-only; a node is registered once its declaration is complete.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    names: HashMap<NodeId, String>,
    owners: HashMap<String, NodeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.names.contains_key(&id)
    }

    /// Records `id -> name`. A name can belong to one node only.
    pub fn register(&mut self, graph: &SchemaGraph, id: NodeId, name: &str) -> Result<()> {
        if let Some(&owner) = self.owners.get(name) {
            if owner != id {
                return Err(Error::DuplicateTypeName {
                    name: name.to_string(),
                    pointer: graph.node(id).pointer.clone(),
                    existing: graph.node(owner).pointer.clone(),
                });
            }
        }
        debug!("registered {} as {name}", graph.node(id).pointer);
        self.owners.insert(name.to_string(), id);
        self.names.entry(id).or_insert_with(|| name.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Determines the target type of a node.
///
/// References resolve against their target. Object nodes must already be
/// registered; array items are always resolved as non-nullable.
pub fn resolve(
    graph: &SchemaGraph,
    registry: &TypeRegistry,
    id: NodeId,
    nullable: bool,
) -> Result<TargetType> {
    let id = graph.target(id);
    let node = graph.node(id);
    let tag = node.primary_type().ok_or_else(|| Error::AmbiguousType {
        pointer: node.pointer.clone(),
        types: node.types.clone(),
    })?;
    let concrete = match tag {
        "integer" => TargetType::Integer,
        "string" => TargetType::String,
        "boolean" => TargetType::Boolean,
        "number" => TargetType::Float,
        "object" => {
            return registry
                .get(id)
                .map(|name| TargetType::Composite(name.to_string()))
                .ok_or_else(|| Error::UnknownComposite(node.pointer.clone()));
        }
        "array" => {
            return match node.items {
                None => Ok(TargetType::DynamicSequence),
                Some(items) => Ok(TargetType::Sequence(Box::new(resolve(
                    graph, registry, items, false,
                )?))),
            };
        }
        other => {
            return Err(Error::UnresolvableType {
                pointer: node.pointer.clone(),
                tag: other.to_string(),
            });
        }
    };
    if nullable {
        Ok(TargetType::Nullable(Box::new(concrete)))
    } else {
        Ok(concrete)
    }
}
