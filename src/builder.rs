use log::debug;

use crate::error::Result;
use crate::naming::field_name;
use crate::parser::{NodeId, SchemaGraph};
use crate::resolver::{resolve, TargetType, TypeRegistry};

/// One field of a composite declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Field identifier in UpperCamelCase. Backends re-case it as needed.
    pub ident: String,
    /// Serialization key, the literal property name.
    pub key: String,
    pub ty: TargetType,
    /// The property's node (or its reference target) admits null.
    pub nullable: bool,
    /// The property is not in the object's required list.
    pub optional: bool,
    pub doc: Vec<String>,
}

/// A unit of generated output, independent of the target language.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Struct {
        name: String,
        doc: Vec<String>,
        fields: Vec<FieldDecl>,
    },
    /// An object schema without properties, declared as a string-keyed map.
    OpenMap { name: String, doc: Vec<String> },
    /// Produces an empty instance of the message type `target`.
    Factory { name: String, target: String },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Struct { name, .. }
            | Declaration::OpenMap { name, .. }
            | Declaration::Factory { name, .. } => name,
        }
    }
}

/// Doc comment lines `<name> - <description>`, one entry per description line.
/// Empty when there is no description.
pub fn doc_lines(name: &str, description: Option<&str>) -> Vec<String> {
    let description = match description.map(str::trim) {
        Some(d) if !d.is_empty() => d,
        _ => return Vec::new(),
    };
    let mut lines = description.lines();
    let first = lines.next().unwrap_or_default().trim_end();
    std::iter::once(format!("{name} - {first}"))
        .chain(lines.map(|l| l.trim_end().to_string()))
        .collect()
}

/// Builds the declaration for the object node `id` and registers it as `name`.
///
/// Every property must already be resolvable; the first one that isn't fails
/// the whole declaration and nothing is registered.
pub fn build(
    graph: &SchemaGraph,
    registry: &mut TypeRegistry,
    name: &str,
    doc: Vec<String>,
    id: NodeId,
) -> Result<Declaration> {
    let id = graph.target(id);
    let node = graph.node(id);
    let declaration = match node.properties.as_ref().filter(|p| !p.is_empty()) {
        None => Declaration::OpenMap {
            name: name.to_string(),
            doc,
        },
        Some(properties) => {
            // BTreeMap iteration gives the lexicographic property order
            let mut fields = Vec::with_capacity(properties.len());
            for (property, &child) in properties {
                let nullable = graph.allows_null(child);
                let ty = resolve(graph, registry, child, nullable)?;
                let ident = field_name(property);
                let doc = doc_lines(&ident, graph.node(child).description.as_deref());
                fields.push(FieldDecl {
                    ident,
                    key: property.clone(),
                    ty,
                    nullable,
                    optional: !node.is_required(property),
                    doc,
                });
            }
            Declaration::Struct {
                name: name.to_string(),
                doc,
                fields,
            }
        }
    };
    registry.register(graph, id, name)?;
    debug!("built {name} for {}", node.pointer);
    Ok(declaration)
}
