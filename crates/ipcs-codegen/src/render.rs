//! # Template Rendering
//!
//! Wraps a [`Handlebars`] registry holding the two artifact templates. The
//! built-in templates are compiled into the binary; a directory override
//! replaces both.
//!
//! The registry runs in strict mode, so a template that names a field the
//! context does not have fails instead of printing nothing. HTML escaping is
//! off: the output is C++.
//!
//! Helpers:
//!
//! - `upper`: `robot_position` → `ROBOT_POSITION`
//! - `pascal`: `robot_position` → `RobotPosition`

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use ipcs_core::ident::{constant_case, pascal_case};

use crate::config::EmitConfig;
use crate::error::EmitError;

pub const DATASTORE_TEMPLATE: &str = "datastore_keys.h";
pub const EVENTBUS_TEMPLATE: &str = "eventbus_events.h";

/// File name suffix of templates in an override directory.
pub const TEMPLATE_EXTENSION: &str = "hbs";

const BUILTIN_DATASTORE: &str = include_str!("../templates/datastore_keys.h.hbs");
const BUILTIN_EVENTBUS: &str = include_str!("../templates/eventbus_events.h.hbs");

/// The compiled artifact templates.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("templates", &self.registry.get_templates().len())
            .finish()
    }
}

impl Renderer {
    /// The templates shipped with this crate.
    pub fn builtin() -> Result<Self, EmitError> {
        Self::from_sources(BUILTIN_DATASTORE, BUILTIN_EVENTBUS)
    }

    /// Templates read from `dir`, which must contain
    /// `datastore_keys.h.hbs` and `eventbus_events.h.hbs`.
    pub fn from_dir(dir: &Path) -> Result<Self, EmitError> {
        let read = |name: &str| -> Result<String, EmitError> {
            let file = format!("{name}.{TEMPLATE_EXTENSION}");
            let path = dir.join(&file);
            if !path.is_file() {
                return Err(EmitError::MissingTemplate {
                    dir: dir.display().to_string(),
                    file,
                });
            }
            std::fs::read_to_string(&path).map_err(|source| EmitError::Io {
                path: path.display().to_string(),
                source,
            })
        };
        let datastore = read(DATASTORE_TEMPLATE)?;
        let eventbus = read(EVENTBUS_TEMPLATE)?;
        tracing::debug!(dir = %dir.display(), "loaded template overrides");
        Self::from_sources(&datastore, &eventbus)
    }

    /// Templates given as source text.
    pub fn from_sources(datastore: &str, eventbus: &str) -> Result<Self, EmitError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("upper", Box::new(upper_helper));
        registry.register_helper("pascal", Box::new(pascal_helper));

        for (name, source) in [(DATASTORE_TEMPLATE, datastore), (EVENTBUS_TEMPLATE, eventbus)] {
            registry
                .register_template_string(name, source)
                .map_err(|e| EmitError::Template {
                    name: name.to_string(),
                    source: Box::new(e),
                })?;
        }
        Ok(Self { registry })
    }

    /// The built-in templates, or the override directory named by `config`.
    pub fn for_config(config: &EmitConfig) -> Result<Self, EmitError> {
        match &config.template_dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::builtin(),
        }
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, EmitError> {
        self.registry
            .render(name, context)
            .map_err(|e| EmitError::Render {
                name: name.to_string(),
                source: Box::new(e),
            })
    }
}

// Handlebars helpers

fn upper_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&constant_case(param))?;
    Ok(())
}

fn pascal_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&pascal_case(param))?;
    Ok(())
}
