use std::{env, path::Path};

use msgschema2code::{generate_file, Lang, Options};

fn main() {
    println!("cargo:rerun-if-changed=schema.json");
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("models.rs");
    let options = Options {
        module: "models".to_string(),
        lang: Lang::Rust,
        ..Options::default()
    };
    let codegen = generate_file(Path::new("schema.json"), &options).unwrap();
    std::fs::write(&dest_path, codegen).unwrap();
}
