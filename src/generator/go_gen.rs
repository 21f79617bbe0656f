use std::fmt::Write as _;
use std::io::Write as _;
use std::process::{Command, Stdio};

use log::debug;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::builder::{Declaration, FieldDecl};
use crate::compiler::CompiledSchema;
use crate::error::{Error, Result};
use crate::resolver::TargetType;

const HEADER: &str = "// Code generated by msgschema2code. DO NOT EDIT.\n\n";

pub fn generate_code(package: &str, compiled: &CompiledSchema) -> Result<String> {
    let base = compiled
        .base
        .par_iter()
        .map(generate_declaration)
        .collect::<Vec<_>>();
    let messages = compiled
        .messages
        .par_iter()
        .map(generate_declaration)
        .collect::<Vec<_>>();

    let mut out = String::from(HEADER);
    out.push_str(&format!("package {package}\n\n"));
    out.push_str("/**** BEGIN base definitions ****/\n\n");
    out.push_str(&base.concat());
    out.push_str("/**** END base definitions ****/\n\n");
    out.push_str("/**** BEGIN schema definitions ****/\n\n");
    out.push_str(&messages.concat());
    out.push_str("/**** END schema definitions ****/\n");
    Ok(out)
}

/// Runs `gofmt` over the source.
pub fn format_source(source: &str) -> Result<String> {
    let mut child = Command::new("gofmt")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::FormattingFailure(format!("can't run gofmt: {e}")))?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(source.as_bytes())
            .map_err(|e| Error::FormattingFailure(format!("can't feed gofmt: {e}")))?;
    }
    let output = child
        .wait_with_output()
        .map_err(|e| Error::FormattingFailure(format!("gofmt didn't finish: {e}")))?;
    if !output.status.success() {
        return Err(Error::FormattingFailure(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    debug!("gofmt formatted {} bytes", source.len());
    String::from_utf8(output.stdout).map_err(|e| Error::FormattingFailure(e.to_string()))
}

fn expand_type(ty: &TargetType) -> String {
    match ty {
        TargetType::Integer => "int".into(),
        TargetType::String => "string".into(),
        TargetType::Boolean => "bool".into(),
        TargetType::Float => "float64".into(),
        TargetType::Composite(name) => name.clone(),
        TargetType::Sequence(item) => format!("[]{}", expand_type(item)),
        TargetType::DynamicSequence => "[]interface{}".into(),
        TargetType::Nullable(inner) => format!("*{}", expand_type(inner)),
    }
}

fn write_doc(out: &mut String, indent: &str, doc: &[String]) {
    for line in doc {
        let _ = writeln!(out, "{indent}// {line}");
    }
}

fn generate_field(out: &mut String, field: &FieldDecl, first: bool) {
    if !field.doc.is_empty() {
        // documented fields are set apart from the one before
        if !first {
            out.push('\n');
        }
        write_doc(out, "\t", &field.doc);
    }
    let omit = if field.optional { ",omitempty" } else { "" };
    let _ = writeln!(
        out,
        "\t{} {} `json:\"{}{omit}\"`",
        field.ident,
        expand_type(&field.ty),
        field.key
    );
}

fn generate_declaration(declaration: &Declaration) -> String {
    let mut out = String::new();
    match declaration {
        Declaration::OpenMap { name, doc } => {
            write_doc(&mut out, "", doc);
            let _ = writeln!(out, "type {name} map[string]interface{{}}\n");
        }
        Declaration::Struct { name, doc, fields } => {
            write_doc(&mut out, "", doc);
            let _ = writeln!(out, "type {name} struct {{");
            for (i, field) in fields.iter().enumerate() {
                generate_field(&mut out, field, i == 0);
            }
            out.push_str("}\n\n");
        }
        Declaration::Factory { name, target } => {
            let _ = writeln!(out, "// {name} creates a new {target} struct");
            out.push_str("// this method can be used as NewData when registering callback\n");
            let _ = writeln!(out, "func {name}() interface{{}} {{ return new({target}) }}\n");
        }
    }
    out
}
