//! Integration test: drive both subcommands against the repository's sample
//! schema.

use std::path::PathBuf;

use ipcs_cli::generate::{run_generate, GenerateArgs};
use ipcs_cli::validate::{run_validate, ValidateArgs};
use ipcs_cli::{check_file, format_report, EXIT_OK};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn sample_schema() -> PathBuf {
    repo_root().join("schemas").join("ipc-schema.yaml")
}

#[test]
fn sample_schema_validates() {
    let code = run_validate(&ValidateArgs {
        schema: sample_schema(),
        json: false,
    })
    .unwrap();
    assert_eq!(code, EXIT_OK);

    let text = format_report(&check_file(&sample_schema()), false).unwrap();
    assert!(text.starts_with("Schema validation PASSED"));
    assert!(text.contains("  - Hot Keys: 14/32"));
    assert!(text.contains("  - EventBus events: 7"));
}

#[test]
fn sample_schema_json_report() {
    let text = format_report(&check_file(&sample_schema()), true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["accepted"], true);
    assert_eq!(value["summary"]["hot_keys"], 14);
    assert_eq!(value["summary"]["max_hot_keys"], 32);
    assert_eq!(value["errors"].as_array().unwrap().len(), 0);
}

#[test]
fn sample_schema_generates_stable_headers() {
    let dir = tempfile::tempdir().unwrap();
    let args = |out: &str| GenerateArgs {
        schema: sample_schema(),
        out_dir: dir.path().join(out),
        templates: None,
        namespace: Some("mxrc::ipc".into()),
    };

    assert_eq!(run_generate(&args("first")).unwrap(), EXIT_OK);
    assert_eq!(run_generate(&args("second")).unwrap(), EXIT_OK);

    for file in ["DataStoreKeys.h", "EventBusEvents.h"] {
        let a = std::fs::read(dir.path().join("first").join(file)).unwrap();
        let b = std::fs::read(dir.path().join("second").join(file)).unwrap();
        assert_eq!(a, b, "{file} differs between runs");
    }
}
