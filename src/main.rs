//! msgschema2code CLI: generates typed message declarations from a schema document.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use msgschema2code::{generate_file, write_output, Lang, Options};

#[derive(Parser)]
#[command(name = "msgschema2code")]
#[command(author, version, about = "Generate message types from a versioned schema document", long_about = None)]
struct Cli {
    /// Path to the schema document (JSON, or YAML by extension)
    #[arg(long)]
    schema_file: PathBuf,

    /// Go package / Rust module name for the generated code
    #[arg(long, default_value = "messages")]
    module: String,

    /// Output file (default: stdout)
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Custom format names used in the schema; may be repeated
    #[arg(long = "custom-format")]
    custom_formats: Vec<String>,

    /// Target language
    #[arg(long, value_enum, default_value_t = Lang::Go)]
    lang: Lang,

    /// Skip formatting the generated code
    #[arg(long)]
    no_format: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let options = Options {
        module: cli.module,
        lang: cli.lang,
        custom_formats: cli.custom_formats,
        format: !cli.no_format,
    };
    let source = generate_file(&cli.schema_file, &options)
        .with_context(|| format!("failed to generate code from {}", cli.schema_file.display()))?;
    write_output(&source, cli.output_file.as_deref()).context("failed to write generated code")?;
    Ok(())
}
