use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use log::{debug, info};

use crate::builder::{build, doc_lines, Declaration};
use crate::error::{Error, Result};
use crate::naming::{factory_name, synthesize};
use crate::parser::{definition_path, LoadedDocument, MessageSchema, NodeId, SchemaGraph};
use crate::resolver::TypeRegistry;

/// Path segment used for the element type of an array.
const LIST_SEGMENT: &str = "list";

/// Declarations for one document, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    /// Shared and nested composite types, in discovery order.
    pub base: Vec<Declaration>,
    /// A struct and its factory for every message version, in sorted order.
    pub messages: Vec<Declaration>,
}

/// Compiles every message version of a loaded document.
///
/// Nested types are declared first (phase 1) so that the message types built
/// afterwards (phase 2) can resolve every field.
pub fn compile(document: &LoadedDocument) -> Result<CompiledSchema> {
    let graph = &document.graph;
    let mut majors: BTreeMap<&str, BTreeSet<u32>> = BTreeMap::new();
    for schema in &document.messages {
        majors
            .entry(schema.key.message.as_str())
            .or_default()
            .insert(schema.major);
    }

    let mut compiler = Compiler {
        graph,
        registry: TypeRegistry::new(),
        in_progress: HashSet::new(),
        base: Vec::new(),
    };

    let mut names = Vec::with_capacity(document.messages.len());
    for schema in &document.messages {
        check_message_root(graph, schema)?;
        let disambiguate = majors
            .get(schema.key.message.as_str())
            .is_some_and(|m| m.len() > 1);
        let name = synthesize(&[&schema.key.message], Some(schema.major), disambiguate);
        debug!(
            "discovering types of {} v{} as {name}",
            schema.key.message, schema.key.version
        );
        let root = graph.node(graph.target(schema.root));
        if let Some(properties) = &root.properties {
            for (property, &child) in properties {
                compiler.discover(vec![name.clone(), property.clone()], child)?;
            }
        }
        names.push(name);
    }

    let mut messages = Vec::with_capacity(document.messages.len() * 2);
    let mut factories: HashMap<String, &str> = HashMap::new();
    for (schema, name) in document.messages.iter().zip(names) {
        let pointer = graph.node(schema.root).pointer.as_str();
        if let Some(existing) = factories.insert(name.clone(), pointer) {
            return Err(Error::DuplicateTypeName {
                name,
                pointer: pointer.to_string(),
                existing: existing.to_string(),
            });
        }
        let target = graph.target(schema.root);
        if compiler.registry.get(target) == Some(name.as_str()) {
            // a referenced definition already declared under the message's name
            debug!("{name} already declared for {}", graph.node(target).pointer);
        } else {
            let doc = vec![format!(
                "{name} represents the data for message {} v{}",
                schema.key.message, schema.key.version
            )];
            messages.push(build(graph, &mut compiler.registry, &name, doc, schema.root)?);
        }
        messages.push(Declaration::Factory {
            name: factory_name(&name),
            target: name,
        });
    }

    info!(
        "compiled {} base types and {} message types",
        compiler.base.len(),
        document.messages.len()
    );
    Ok(CompiledSchema {
        base: compiler.base,
        messages,
    })
}

fn check_message_root(graph: &SchemaGraph, schema: &MessageSchema) -> Result<()> {
    let types = &graph.node(graph.target(schema.root)).types;
    match types.as_slice() {
        [] => Ok(()),
        [only] if only == "object" => Ok(()),
        _ => Err(Error::InvalidMessageSchema {
            message: schema.key.message.clone(),
            version: schema.key.version.clone(),
            types: types.clone(),
        }),
    }
}

struct Compiler<'a> {
    graph: &'a SchemaGraph,
    registry: TypeRegistry,
    /// Objects whose properties are being walked right now.
    in_progress: HashSet<NodeId>,
    base: Vec<Declaration>,
}

impl Compiler<'_> {
    /// Declares every composite type reachable from `id`, children first.
    fn discover(&mut self, mut path: Vec<String>, id: NodeId) -> Result<()> {
        let graph = self.graph;
        let target = graph.target(id);
        let node = graph.node(target);
        if target != id {
            // referenced types are named after their definition, not the referencing site
            path = definition_path(&node.pointer).ok_or_else(|| Error::UnsupportedReference {
                reference: node.pointer.clone(),
                reason: "only #/definitions/ references are supported".to_string(),
            })?;
        }
        if self.registry.contains(target) || self.in_progress.contains(&target) {
            return Ok(());
        }

        match node.primary_type() {
            Some("object") => {
                self.in_progress.insert(target);
                if let Some(properties) = &node.properties {
                    for (property, &child) in properties {
                        let mut child_path = path.clone();
                        child_path.push(property.clone());
                        self.discover(child_path, child)?;
                    }
                }
                let name = synthesize(&path, None, false);
                let doc = doc_lines(&name, node.description.as_deref());
                let declaration = build(graph, &mut self.registry, &name, doc, target)?;
                self.in_progress.remove(&target);
                self.base.push(declaration);
            }
            Some("array") => {
                if let Some(items) = node.items {
                    path.push(LIST_SEGMENT.to_string());
                    self.discover(path, items)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
