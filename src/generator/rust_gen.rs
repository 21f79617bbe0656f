use std::collections::HashSet;

use super::snake_case;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::builder::{Declaration, FieldDecl};
use crate::compiler::CompiledSchema;
use crate::error::{Error, Result};
use crate::resolver::TargetType;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that can't be raw identifiers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate"];

pub fn generate_code(module: &str, compiled: &CompiledSchema) -> Result<String> {
    let code = compiled
        .base
        .par_iter()
        .chain(compiled.messages.par_iter())
        .map(generate_declaration)
        .collect::<Result<Vec<_>>>()?;
    let body = code
        .join("\n")
        .parse::<TokenStream>()
        .map_err(|e| Error::FormattingFailure(e.to_string()))?;
    let module = ident(&sanitize(&snake_case(module), "messages"))?;
    let file = quote! {
        #[doc = " Code generated by msgschema2code. DO NOT EDIT."]
        pub mod #module {
            #body
        }
    };
    Ok(file.to_string())
}

pub fn format_source(source: &str) -> Result<String> {
    let file = syn::parse_file(source).map_err(|e| Error::FormattingFailure(e.to_string()))?;
    Ok(prettyplease::unparse(&file))
}

/// Makes `name` usable as an identifier: leading digits get a `_` prefix,
/// keywords become raw identifiers.
fn sanitize(name: &str, fallback: &str) -> String {
    let name = if name.is_empty() { fallback } else { name };
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else if RESERVED.contains(&name) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

fn ident(name: &str) -> Result<Ident> {
    syn::parse_str::<Ident>(name)
        .map_err(|e| Error::FormattingFailure(format!("'{name}' is not a valid identifier: {e}")))
}

fn type_ident(name: &str) -> Result<Ident> {
    ident(&sanitize(name, "Type"))
}

fn expand_type(ty: &TargetType) -> Result<TokenStream> {
    Ok(match ty {
        TargetType::Integer => quote!(i64),
        TargetType::String => quote!(String),
        TargetType::Boolean => quote!(bool),
        TargetType::Float => quote!(f64),
        TargetType::Composite(name) => {
            let name = type_ident(name)?;
            quote!(#name)
        }
        TargetType::Sequence(item) => {
            let item = expand_type(item)?;
            quote!(Vec<#item>)
        }
        TargetType::DynamicSequence => quote!(Vec<serde_json::Value>),
        TargetType::Nullable(inner) => {
            let inner = expand_type(inner)?;
            quote!(Option<#inner>)
        }
    })
}

fn doc_attrs(doc: &[String]) -> Vec<TokenStream> {
    doc.iter()
        .map(|line| {
            let line = format!(" {line}");
            quote!(#[doc = #line])
        })
        .collect()
}

/// Snake-cased field names, with a numeric suffix where two fields collide.
fn field_idents(fields: &[FieldDecl]) -> Vec<String> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .map(|field| {
            let base = sanitize(&snake_case(&field.ident), "field");
            let mut candidate = base.clone();
            let mut n = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{}_{n}", base.trim_start_matches("r#"));
                n += 1;
            }
            candidate
        })
        .collect()
}

fn generate_field(field: &FieldDecl, field_ident: &str) -> Result<TokenStream> {
    let field_name = ident(field_ident)?;
    let key = &field.key;
    let docs = doc_attrs(&field.doc);
    let concrete = expand_type(&field.ty)?;
    // a nullable primitive is already an Option
    let wrapped = !matches!(field.ty, TargetType::Nullable(_)) && (field.optional || field.nullable);
    let field_type = if wrapped {
        quote!(Option<#concrete>)
    } else {
        concrete
    };
    Ok(if field.optional {
        quote! {
            #(#docs)*
            #[serde(rename = #key, default, skip_serializing_if = "Option::is_none")]
            pub #field_name: #field_type
        }
    } else {
        quote! {
            #(#docs)*
            #[serde(rename = #key)]
            pub #field_name: #field_type
        }
    })
}

fn generate_declaration(declaration: &Declaration) -> Result<String> {
    let code = match declaration {
        Declaration::Struct { name, doc, fields } => {
            let identifier = type_ident(name)?;
            let docs = doc_attrs(doc);
            let fields = fields
                .iter()
                .zip(field_idents(fields))
                .map(|(field, field_ident)| generate_field(field, &field_ident))
                .collect::<Result<Vec<_>>>()?;
            quote! {
                #(#docs)*
                #[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
                pub struct #identifier {
                    #(#fields),*
                }
            }
        }
        Declaration::OpenMap { name, doc } => {
            let identifier = type_ident(name)?;
            let docs = doc_attrs(doc);
            quote! {
                #(#docs)*
                pub type #identifier = std::collections::HashMap<String, serde_json::Value>;
            }
        }
        Declaration::Factory { name, target } => {
            let function = ident(&sanitize(&snake_case(name), "new_data"))?;
            let target = type_ident(target)?;
            let doc = format!(" Creates an empty [`{target}`], usable as the data factory when registering a callback.");
            quote! {
                #[doc = #doc]
                pub fn #function() -> Box<dyn std::any::Any + Send> {
                    Box::new(<#target>::default())
                }
            }
        }
    };
    Ok(code.to_string())
}
