mod go_gen;
mod rust_gen;

use clap::ValueEnum;

use crate::compiler::CompiledSchema;
use crate::error::Result;

/// Language the declarations are rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Lang {
    #[default]
    Go,
    Rust,
}

/// Renders a compiled schema as source text in `lang`.
///
/// `module` becomes the Go package name or the name of the wrapping Rust
/// module. With `format` set, the text is run through the language's formatter.
pub fn generate(lang: Lang, module: &str, compiled: &CompiledSchema, format: bool) -> Result<String> {
    let source = match lang {
        Lang::Go => go_gen::generate_code(module, compiled)?,
        Lang::Rust => rust_gen::generate_code(module, compiled)?,
    };
    if !format {
        return Ok(source);
    }
    match lang {
        Lang::Go => go_gen::format_source(&source),
        Lang::Rust => rust_gen::format_source(&source),
    }
}

/// Converts an UpperCamelCase identifier to snake_case, keeping runs of
/// capitals together (`UserID` -> `user_id`, `HTTPServer` -> `http_server`).
pub(crate) fn snake_case(s: &str) -> String {
    let chars = s.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                Some(_) => true,
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
