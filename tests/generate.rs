use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use msgschema2code::{generate, generate_file, write_output, Error, Lang, Options, Result, Syntax};
use pretty_assertions::assert_eq;
use test_log::test;

fn fixture(case: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("resources/schemas")
        .join(case)
}

fn go_options() -> Options {
    Options {
        module: "hedwig".to_string(),
        format: false,
        ..Options::default()
    }
}

fn generate_go(case: &str) -> Result<String> {
    generate_file(&fixture(case).join("schema.json"), &go_options())
}

fn assert_matches_models(case: &str) {
    let generated = generate_go(case).unwrap();
    let expected = std::fs::read_to_string(fixture(case).join("models.go")).unwrap();
    assert_eq!(generated, expected);
}

#[test]
fn test_simple() {
    assert_matches_models("simple");
}

#[test]
fn test_definitions() {
    assert_matches_models("definitions");
}

#[test]
fn test_sub_objects() {
    assert_matches_models("sub-objects");
}

#[test]
fn test_nullable() {
    assert_matches_models("nullable");
}

#[test]
fn test_optional() {
    assert_matches_models("optional");
}

#[test]
fn test_multiple_majors() {
    assert_matches_models("multiple-majors");
}

#[test]
fn test_multiple_versions() {
    assert_matches_models("multiple-versions");
}

#[test]
fn test_arrays() {
    let generated = generate_go("arrays").unwrap();
    println!("{}", generated);
    assert!(generated.contains(
        "type RoutePlannedStopsList struct {\n\tName string `json:\"name\"`\n}\n"
    ));
    assert!(generated.contains("type Point struct {\n\tLat float64 `json:\"lat\"`\n\tLng float64 `json:\"lng\"`\n}\n"));
    for line in [
        "\tExtras []interface{} `json:\"extras,omitempty\"`\n",
        "\tMatrix [][]float64 `json:\"matrix,omitempty\"`\n",
        "\tPair []interface{} `json:\"pair,omitempty\"`\n",
        "\tStops []RoutePlannedStopsList `json:\"stops\"`\n",
        "\tTags []string `json:\"tags\"`\n",
        "\tWaypoints []Point `json:\"waypoints,omitempty\"`\n",
    ] {
        assert!(generated.contains(line), "missing {line:?}");
    }
    let base_start = generated.find("BEGIN base definitions").unwrap();
    let stops = generated.find("type RoutePlannedStopsList").unwrap();
    let point = generated.find("type Point").unwrap();
    let base_end = generated.find("END base definitions").unwrap();
    assert!(base_start < stops && stops < point && point < base_end);
}

#[test]
fn test_descriptions() {
    let generated = generate_go("descriptions").unwrap();
    println!("{}", generated);
    assert!(generated.contains(
        "// Vehicle - A vehicle\n\
         // as seen by the fleet\n\
         type Vehicle struct {\n\
         \t// ID - Fleet-wide identifier\n\
         \tID string `json:\"id,omitempty\"`\n\
         \tMake string `json:\"make,omitempty\"`\n\
         }\n"
    ));
    assert!(generated.contains(
        "\tNote string `json:\"note,omitempty\"`\n\
         \tVehicle Vehicle `json:\"vehicle\"`\n\
         \n\
         \t// Vin - Vehicle identification number\n\
         \t// seventeen characters\n\
         \tVin string `json:\"vin\"`\n"
    ));
}

#[test]
fn test_diamond() {
    let generated = generate_go("diamond").unwrap();
    println!("{}", generated);
    assert_eq!(generated.matches("type Place struct").count(), 1);
    assert_eq!(generated.matches("type Address struct").count(), 1);
    assert!(generated.find("type Place struct") < generated.find("type Address struct"));
    assert!(generated.contains("\tPlace Place `json:\"place,omitempty\"`\n"));
    assert!(generated.contains("\tFrom Address `json:\"from,omitempty\"`\n"));
    assert!(generated.contains("\tTo Place `json:\"to,omitempty\"`\n"));
    assert!(generated.contains("\tAt Place `json:\"at,omitempty\"`\n"));
}

#[test]
fn test_invalid_json() {
    let err = generate_go("invalid-json").unwrap_err();
    assert!(matches!(err, Error::UnreadableInput(_)));
    assert!(err.to_string().starts_with("can't read schema"));
}

#[test]
fn test_invalid_schemas_prop() {
    let err = generate_go("invalid-schemas-prop").unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to read schema: bad version: 'description'"
    );
}

#[test]
fn test_invalid_refs() {
    let err = generate_go("invalid-refs").unwrap_err();
    assert!(matches!(err, Error::UnsupportedReference { .. }));
    assert!(err.to_string().starts_with("can't handle schema reference"));
}

#[test]
fn test_unknown_composite() {
    let err = generate_go("unknown-composite").unwrap_err();
    assert!(matches!(err, Error::UnknownComposite(ref pointer) if pointer == "/definitions/node"));
}

#[test]
fn test_yaml_with_custom_format() {
    let options = Options {
        custom_formats: vec!["vin".to_string()],
        ..go_options()
    };
    let generated = generate_file(&fixture("yaml").join("schema.yaml"), &options).unwrap();
    assert!(generated.contains("type DeviceRegistered struct {"));
    assert!(generated.contains("\tDeviceID string `json:\"device_id\"`\n"));
    assert!(generated.contains("\tRegisteredAt string `json:\"registered_at,omitempty\"`\n"));
}

#[test]
fn test_output_is_deterministic() {
    for case in ["diamond", "arrays", "multiple-versions"] {
        assert_eq!(generate_go(case).unwrap(), generate_go(case).unwrap());
    }
}

#[test]
fn test_rust_output() {
    let options = Options {
        module: "hedwig".to_string(),
        lang: Lang::Rust,
        ..Options::default()
    };
    let generated = generate_file(&fixture("nullable").join("schema.json"), &options).unwrap();
    println!("{}", generated);
    assert!(generated.contains("pub mod hedwig {"));
    assert!(generated.contains("pub struct Vehicle {"));
    assert!(generated.contains("pub count: Option<i64>,"));
    assert!(generated.contains("pub user_id: Option<String>,"));
    assert!(generated.contains("pub vehicle: Option<Vehicle>,"));
    assert!(generated.contains("pub vin: String,"));
    assert!(generated.contains("pub fn new_trip_created_data() -> Box<dyn std::any::Any + Send> {"));
}

#[test]
fn test_rust_bad_module_name() {
    let options = Options {
        module: "my-models".to_string(),
        lang: Lang::Rust,
        ..Options::default()
    };
    let result = generate_file(&fixture("simple").join("schema.json"), &options);
    assert!(matches!(result, Err(Error::FormattingFailure(_))));
}

/// Formatter tests only make sense where a Go toolchain is installed.
fn gofmt_available() -> bool {
    let available = Command::new("gofmt")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok();
    if !available {
        log::warn!("gofmt not found on PATH, skipping");
    }
    available
}

#[test]
fn test_go_formatting() {
    if !gofmt_available() {
        return;
    }
    let options = Options {
        module: "hedwig".to_string(),
        ..Options::default()
    };
    let generated = generate_file(&fixture("simple").join("schema.json"), &options).unwrap();
    let expected = std::fs::read_to_string(fixture("simple").join("models.gofmt.go")).unwrap();
    assert_eq!(generated, expected);
}

#[test]
fn test_invalid_go_source_is_rejected() {
    if !gofmt_available() {
        return;
    }
    let text = r#"{"id": "doc", "schemas": {"ping": {"1.*": {"type": "object"}}}}"#;
    let options = Options {
        module: "not a package".to_string(),
        ..Options::default()
    };
    let err = generate(text, Syntax::Json, &options).unwrap_err();
    assert!(matches!(err, Error::FormattingFailure(ref reason) if !reason.starts_with("can't run gofmt")), "{err}");
}

#[test]
fn test_reused_definition_as_message_root() {
    let text = r##"{
        "id": "doc",
        "schemas": {
            "trip": {"1.*": {"type": "object", "properties": {"vehicle": {"$ref": "#/definitions/vehicle"}}}},
            "vehicle": {"1.*": {"$ref": "#/definitions/vehicle"}}
        },
        "definitions": {"vehicle": {"type": "object", "required": ["id"], "properties": {"id": {"type": "string"}}}}
    }"##;
    let generated = generate(text, Syntax::Json, &go_options()).unwrap();
    assert_eq!(generated.matches("type Vehicle struct").count(), 1);
    assert!(generated.contains("func NewVehicleData() interface{} { return new(Vehicle) }"));
}

#[test]
fn test_write_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models.go");
    let generated = generate_go("simple").unwrap();
    write_output(&generated, Some(&path)).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), generated);
}

#[test]
fn test_write_output_to_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("models.go");
    assert!(matches!(write_output("package x\n", Some(&path)), Err(Error::Io(_))));
}
