//! Generates typed message declarations from versioned message schema documents.
//!
//! A document maps message types to versions to JSON schemas:
//!
//! ```json
//! {
//!     "id": "https://example.com/schema",
//!     "schemas": {
//!         "trip_created": {
//!             "1.*": {"type": "object", "properties": {"vin": {"type": "string"}}}
//!         }
//!     },
//!     "definitions": {}
//! }
//! ```
//!
//! Every shared or nested object schema becomes a composite type, every message
//! version becomes a composite type plus a factory producing an empty instance.

use std::path::Path;

use log::info;

pub mod builder;
pub mod compiler;
pub mod deserializer;
pub mod error;
pub mod formats;
mod generator;
pub mod naming;
pub mod parser;
pub mod resolver;

pub use error::{Error, Result};
pub use generator::Lang;
pub use parser::Syntax;

use formats::FormatRegistry;

/// Settings of one generation run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Go package name, or the name of the wrapping Rust module.
    pub module: String,
    pub lang: Lang,
    /// Extra `format` names that are expected in the document.
    pub custom_formats: Vec<String>,
    /// Run the output through the target language's formatter.
    pub format: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            module: "messages".to_string(),
            lang: Lang::default(),
            custom_formats: Vec::new(),
            format: true,
        }
    }
}

/// Generates source code from the text of a schema document.
pub fn generate(text: &str, syntax: Syntax, options: &Options) -> Result<String> {
    let formats = FormatRegistry::with_custom(options.custom_formats.iter().cloned());
    let document = parser::load(text, syntax, &formats)?;
    let compiled = compiler::compile(&document)?;
    let source = generator::generate(options.lang, &options.module, &compiled, options.format)?;
    info!(
        "generated {:?} source for document {} ({} bytes)",
        options.lang,
        document.id,
        source.len()
    );
    Ok(source)
}

/// Reads a schema document from disk and generates source code from it.
/// The syntax is picked from the file extension.
pub fn generate_file(path: &Path, options: &Options) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::UnreadableInput(format!("{}: {e}", path.display())))?;
    generate(&text, Syntax::from_path(path), options)
}

/// Writes generated source to `path`, or to stdout when there is none.
pub fn write_output(source: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, source)?,
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(source.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
