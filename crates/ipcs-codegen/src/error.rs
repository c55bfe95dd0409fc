//! # Emission Errors

use thiserror::Error;

/// Failure while rendering or writing generated artifacts.
#[derive(Error, Debug)]
pub enum EmitError {
    /// A template failed to compile.
    #[error("failed to load template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// A template directory override is missing one of the required files.
    #[error("template directory {dir} has no '{file}'")]
    MissingTemplate { dir: String, file: String },

    /// Rendering failed, e.g. a template referenced an unknown field.
    #[error("failed to render '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// An artifact or its directory could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The resolved namespace is not a `::`-joined identifier path.
    #[error("invalid namespace '{0}': expected identifiers joined by '::'")]
    InvalidNamespace(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path_and_keeps_source() {
        let err = EmitError::Io {
            path: "out/DataStoreKeys.h".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("out/DataStoreKeys.h"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
