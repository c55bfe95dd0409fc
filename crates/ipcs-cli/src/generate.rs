//! # Generate Subcommand
//!
//! `ipcs generate <SCHEMA> <OUT_DIR>`: validate the document, then write
//! `DataStoreKeys.h` and `EventBusEvents.h` into `OUT_DIR`.
//!
//! Nothing is written unless the schema is accepted. Warnings are printed
//! but do not block generation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use ipcs_codegen::{EmitConfig, Emitter};
use ipcs_schema::{accept, load, ValidationReport};

use crate::{EXIT_FAILURE, EXIT_OK};

/// Arguments for the generate subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Schema document to generate from.
    pub schema: PathBuf,

    /// Directory receiving the generated headers. Created if absent.
    pub out_dir: PathBuf,

    /// Directory with `datastore_keys.h.hbs` and `eventbus_events.h.hbs`
    /// replacing the built-in templates. Overrides `IPCS_TEMPLATE_DIR`.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// C++ namespace for the generated code, e.g. `mxrc::ipc`. Overrides
    /// `IPCS_NAMESPACE` and the document's `namespace`.
    #[arg(long, value_name = "NS")]
    pub namespace: Option<String>,
}

impl GenerateArgs {
    /// Emitter configuration: environment first, flags on top.
    pub fn config(&self) -> EmitConfig {
        let mut config = EmitConfig::from_env();
        if let Some(ns) = &self.namespace {
            config = config.with_namespace(ns.clone());
        }
        if let Some(dir) = &self.templates {
            config = config.with_template_dir(dir.clone());
        }
        config
    }
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs) -> Result<u8> {
    let doc = match load(&args.schema) {
        Ok(doc) => doc,
        Err(e) => {
            print!("{}", ValidationReport::structural_failure(e.to_string()));
            return Ok(EXIT_FAILURE);
        }
    };

    let schema = match accept(doc) {
        Ok(schema) => schema,
        Err(rejected) => {
            print!("{}", rejected.0);
            return Ok(EXIT_FAILURE);
        }
    };
    for warning in &schema.report().warnings {
        println!("Warning: {warning}");
    }

    let emitter = match Emitter::new(args.config()) {
        Ok(emitter) => emitter,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(EXIT_FAILURE);
        }
    };

    match emitter.write(&schema, &args.out_dir) {
        Ok(paths) => {
            for path in paths {
                println!("Generated: {}", path.display());
            }
            Ok(EXIT_OK)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(EXIT_FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "schema_version: '1.0.0'\nnamespace: mxrc::ipc\ndatastore_keys:\n  robot_mode: { type: int32_t, hot_key: true }\neventbus_events:\n  Tick: { priority: LOW }\n";

    fn args(schema: PathBuf, out_dir: PathBuf) -> GenerateArgs {
        GenerateArgs {
            schema,
            out_dir,
            templates: None,
            namespace: None,
        }
    }

    #[test]
    fn writes_both_headers_into_a_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.yaml");
        std::fs::write(&schema, VALID).unwrap();
        let out = dir.path().join("out").join("ipc");

        assert_eq!(run_generate(&args(schema, out.clone())).unwrap(), EXIT_OK);
        let keys = std::fs::read_to_string(out.join("DataStoreKeys.h")).unwrap();
        assert!(keys.contains("ROBOT_MODE = \"robot_mode\";  // HOT KEY"));
        assert!(out.join("EventBusEvents.h").is_file());
    }

    #[test]
    fn namespace_flag_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.yaml");
        std::fs::write(&schema, VALID).unwrap();
        let out = dir.path().join("out");

        let mut a = args(schema, out.clone());
        a.namespace = Some("robot::bus".into());
        assert_eq!(run_generate(&a).unwrap(), EXIT_OK);
        let events = std::fs::read_to_string(out.join("EventBusEvents.h")).unwrap();
        assert!(events.contains("namespace robot::bus {"));
    }

    #[test]
    fn rejected_schema_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.yaml");
        std::fs::write(
            &schema,
            "schema_version: '1.0.0'\ndatastore_keys:\n  k: { type: quaternion }\n",
        )
        .unwrap();
        let out = dir.path().join("out");

        assert_eq!(run_generate(&args(schema, out.clone())).unwrap(), EXIT_FAILURE);
        assert!(!out.exists());
    }

    #[test]
    fn unreadable_schema_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(dir.path().join("absent.yaml"), dir.path().join("out"));
        assert_eq!(run_generate(&a).unwrap(), EXIT_FAILURE);
    }

    #[test]
    fn missing_template_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.yaml");
        std::fs::write(&schema, VALID).unwrap();
        let mut a = args(schema, dir.path().join("out"));
        a.templates = Some(dir.path().join("no-templates"));
        assert_eq!(run_generate(&a).unwrap(), EXIT_FAILURE);
    }
}
