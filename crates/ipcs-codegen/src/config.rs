//! # Emitter Configuration
//!
//! Precedence, highest first:
//!
//! 1. explicit overrides (CLI flags),
//! 2. environment (`IPCS_NAMESPACE`, `IPCS_TEMPLATE_DIR`),
//! 3. the document's own `namespace` field (namespace only),
//! 4. built-in defaults.

use std::path::PathBuf;

use ipcs_core::ident::is_namespace_path;

use crate::error::EmitError;

/// Namespace used when neither configuration nor document names one.
pub const DEFAULT_NAMESPACE: &str = "ipc";

pub const DATASTORE_KEYS_FILE: &str = "DataStoreKeys.h";
pub const EVENTBUS_EVENTS_FILE: &str = "EventBusEvents.h";

pub const ENV_NAMESPACE: &str = "IPCS_NAMESPACE";
pub const ENV_TEMPLATE_DIR: &str = "IPCS_TEMPLATE_DIR";

/// Settings for one emitter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitConfig {
    /// Namespace override. Wins over the document's `namespace`.
    pub namespace: Option<String>,
    /// Directory holding `datastore_keys.h.hbs` and `eventbus_events.h.hbs`.
    /// `None` uses the built-in templates.
    pub template_dir: Option<PathBuf>,
    pub datastore_keys_file: String,
    pub eventbus_events_file: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            template_dir: None,
            datastore_keys_file: DATASTORE_KEYS_FILE.to_string(),
            eventbus_events_file: EVENTBUS_EVENTS_FILE.to_string(),
        }
    }
}

impl EmitConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`. Empty values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            namespace: non_empty(ENV_NAMESPACE),
            template_dir: non_empty(ENV_TEMPLATE_DIR).map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    /// The namespace to emit into, given the document's own `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::InvalidNamespace`] if the winning value is not a
    /// `::`-joined identifier path.
    pub fn resolve_namespace(&self, document: Option<&str>) -> Result<String, EmitError> {
        let chosen = self
            .namespace
            .as_deref()
            .or(document)
            .unwrap_or(DEFAULT_NAMESPACE);
        if !is_namespace_path(chosen) {
            return Err(EmitError::InvalidNamespace(chosen.to_string()));
        }
        Ok(chosen.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = EmitConfig::default();
        assert_eq!(cfg.datastore_keys_file, "DataStoreKeys.h");
        assert_eq!(cfg.eventbus_events_file, "EventBusEvents.h");
        assert_eq!(cfg.resolve_namespace(None).unwrap(), "ipc");
    }

    #[test]
    fn document_namespace_beats_default() {
        let cfg = EmitConfig::default();
        assert_eq!(cfg.resolve_namespace(Some("mxrc::ipc")).unwrap(), "mxrc::ipc");
    }

    #[test]
    fn environment_beats_document() {
        let cfg = EmitConfig::from_lookup(lookup(&[(ENV_NAMESPACE, "robot::bus")]));
        assert_eq!(cfg.resolve_namespace(Some("mxrc::ipc")).unwrap(), "robot::bus");
    }

    #[test]
    fn explicit_override_beats_environment() {
        let cfg = EmitConfig::from_lookup(lookup(&[(ENV_NAMESPACE, "robot::bus")]))
            .with_namespace("cli::ns");
        assert_eq!(cfg.resolve_namespace(Some("mxrc::ipc")).unwrap(), "cli::ns");
    }

    #[test]
    fn empty_environment_values_are_ignored() {
        let cfg = EmitConfig::from_lookup(lookup(&[(ENV_NAMESPACE, " "), (ENV_TEMPLATE_DIR, "")]));
        assert_eq!(cfg, EmitConfig::default());
    }

    #[test]
    fn template_dir_from_environment() {
        let cfg = EmitConfig::from_lookup(lookup(&[(ENV_TEMPLATE_DIR, "/opt/ipcs/templates")]));
        assert_eq!(cfg.template_dir, Some(PathBuf::from("/opt/ipcs/templates")));
    }

    #[test]
    fn invalid_namespace_is_an_error() {
        let cfg = EmitConfig::default().with_namespace("mxrc.ipc");
        assert!(matches!(
            cfg.resolve_namespace(None),
            Err(EmitError::InvalidNamespace(ns)) if ns == "mxrc.ipc"
        ));
    }
}
