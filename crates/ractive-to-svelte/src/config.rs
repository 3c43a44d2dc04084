//! Configuration loading.

use camino::{Utf8Path, Utf8PathBuf};
use ractive_transformer::UnitKind;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Default configuration file name, looked up in the workspace root.
pub const CONFIG_FILE: &str = "ractive-to-svelte.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The configuration file.
        path: Utf8PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The configuration file is not valid.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The configuration file.
        path: Utf8PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
}

/// Converter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Directory holding the Ractive sources, relative to the workspace.
    pub source_dir: Utf8PathBuf,
    /// Directory receiving the converted tree, relative to the workspace.
    pub output_dir: Utf8PathBuf,
    /// Extensions of template-bearing units.
    pub template_extensions: Vec<String>,
    /// Extensions of plain-script units.
    pub script_extensions: Vec<String>,
    /// Glob patterns to skip, matched against workspace-relative paths.
    pub skip: Vec<String>,
    /// Rule table file, relative to the workspace. Built-in rules otherwise.
    pub rules: Option<Utf8PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            source_dir: Utf8PathBuf::from("client/js"),
            output_dir: Utf8PathBuf::from("client/js-svelte"),
            template_extensions: vec![".html".to_string()],
            script_extensions: vec![".js".to_string()],
            skip: Vec::new(),
            rules: None,
        }
    }
}

impl ConvertConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, `ractive-to-svelte.json` in
    /// the workspace is used when present and defaults otherwise.
    pub fn load(workspace: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if path.is_relative() => workspace.join(path),
            Some(path) => path.to_owned(),
            None => {
                let default = workspace.join(CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Classifies a file by name, returning its kind and stem.
    ///
    /// The longest matching extension wins, so `.ractive.html` can be told
    /// apart from `.html`.
    pub fn classify<'a>(&self, file_name: &'a str) -> Option<(UnitKind, &'a str)> {
        let templates = self
            .template_extensions
            .iter()
            .map(|ext| (UnitKind::Template, ext));
        let scripts = self
            .script_extensions
            .iter()
            .map(|ext| (UnitKind::Script, ext));

        templates
            .chain(scripts)
            .filter_map(|(kind, ext)| {
                let stem = file_name.strip_suffix(ext.as_str())?;
                (!stem.is_empty()).then_some((kind, stem, ext.len()))
            })
            .max_by_key(|&(_, _, len)| len)
            .map(|(kind, stem, _)| (kind, stem))
    }
}
