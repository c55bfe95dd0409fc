//! # Emitter
//!
//! Renders both artifacts from an [`AcceptedSchema`] and writes them as
//! whole-file replacements. Output is a pure function of the schema, the
//! templates and the configuration.

use std::path::{Path, PathBuf};

use ipcs_schema::AcceptedSchema;

use crate::config::EmitConfig;
use crate::context::{DataStoreContext, EventContext};
use crate::error::EmitError;
use crate::render::{Renderer, DATASTORE_TEMPLATE, EVENTBUS_TEMPLATE};

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug)]
pub struct Emitter {
    config: EmitConfig,
    renderer: Renderer,
}

impl Emitter {
    /// An emitter using the templates selected by `config`.
    pub fn new(config: EmitConfig) -> Result<Self, EmitError> {
        let renderer = Renderer::for_config(&config)?;
        Ok(Self { config, renderer })
    }

    pub fn with_renderer(config: EmitConfig, renderer: Renderer) -> Self {
        Self { config, renderer }
    }

    pub fn config(&self) -> &EmitConfig {
        &self.config
    }

    /// Render `DataStoreKeys.h` and `EventBusEvents.h`, in that order.
    pub fn render(&self, schema: &AcceptedSchema) -> Result<Vec<Artifact>, EmitError> {
        let namespace = self
            .config
            .resolve_namespace(schema.document().namespace.as_deref())?;

        let datastore = DataStoreContext::build(schema, &namespace);
        let events = EventContext::build(schema, &namespace);

        Ok(vec![
            Artifact {
                file_name: self.config.datastore_keys_file.clone(),
                contents: self.renderer.render(DATASTORE_TEMPLATE, &datastore)?,
            },
            Artifact {
                file_name: self.config.eventbus_events_file.clone(),
                contents: self.renderer.render(EVENTBUS_TEMPLATE, &events)?,
            },
        ])
    }

    /// Render and write every artifact into `out_dir`, creating it if needed.
    /// Returns the written paths.
    pub fn write(&self, schema: &AcceptedSchema, out_dir: &Path) -> Result<Vec<PathBuf>, EmitError> {
        let artifacts = self.render(schema)?;
        std::fs::create_dir_all(out_dir).map_err(|source| EmitError::Io {
            path: out_dir.display().to_string(),
            source,
        })?;

        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let path = out_dir.join(&artifact.file_name);
            std::fs::write(&path, artifact.contents.as_bytes()).map_err(|source| EmitError::Io {
                path: path.display().to_string(),
                source,
            })?;
            tracing::info!(path = %path.display(), bytes = artifact.contents.len(), "wrote artifact");
            written.push(path);
        }
        Ok(written)
    }
}
