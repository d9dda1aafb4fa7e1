//! Configuration loading
//!
//! Layers, lowest precedence first: compiled defaults, the user config
//! directory, `./netlimits.yaml`, then an explicit `--config` path. Each
//! layer is deep-merged into the previous one, so a file only has to name
//! the keys it changes.

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::layout::{GridLayout, ReferenceLayout, VendorLayout};

/// File name looked up in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "netlimits.yaml";

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Embedded template missing: {0}")]
    TemplateMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default input and output locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    /// Raw measurement grid (the merged export)
    pub grid: Option<PathBuf>,
    /// Companion reference sheet
    pub reference: Option<PathBuf>,
    /// Vendor specification sheet
    pub vendor: Option<PathBuf>,
    /// Result file; stdout when unset
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Write the internal limit pair back into the reference file
    pub sync_reference: bool,
}

/// Complete configuration, passed explicitly into the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub inputs: InputPaths,
    pub grid: GridLayout,
    pub vendor: VendorLayout,
    pub reference: ReferenceLayout,
    pub pipeline: PipelineOptions,
}

impl Config {
    /// Load configuration from the standard locations plus `explicit`
    ///
    /// Missing standard files are skipped. A missing explicit file is an
    /// error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut sources: Vec<PathBuf> = Vec::new();
        if let Some(user) = Self::user_config_path() {
            if user.exists() {
                sources.push(user);
            }
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            sources.push(local);
        }
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            sources.push(path.to_path_buf());
        }

        Self::from_files(&sources)
    }

    /// Merge the given files over the defaults, in order
    pub fn from_files(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = to_value(&Config::default())?;
        for path in paths {
            let content = std::fs::read_to_string(path)?;
            let layer: serde_yml::Value =
                serde_yml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            debug!(path = %path.display(), "merging config layer");
            if !layer.is_null() {
                merge(&mut merged, layer);
            }
        }

        serde_yml::from_value(merged).map_err(|e| ConfigError::Parse {
            path: paths.last().cloned().unwrap_or_default(),
            message: e.to_string(),
        })
    }

    /// Parse a single YAML document over the defaults
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut merged = to_value(&Config::default())?;
        let layer: serde_yml::Value =
            serde_yml::from_str(content).map_err(|e| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                message: e.to_string(),
            })?;
        if !layer.is_null() {
            merge(&mut merged, layer);
        }
        serde_yml::from_value(merged).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    /// `<config dir>/netlimits/netlimits.yaml`
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "netlimits")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

/// Commented default configuration written by `netlimits init`
pub fn default_template() -> Result<String, ConfigError> {
    let file = EmbeddedTemplates::get(CONFIG_FILE_NAME)
        .ok_or_else(|| ConfigError::TemplateMissing(CONFIG_FILE_NAME.to_string()))?;
    Ok(String::from_utf8_lossy(&file.data).into_owned())
}

fn to_value(config: &Config) -> Result<serde_yml::Value, ConfigError> {
    serde_yml::to_value(config).map_err(|e| ConfigError::Parse {
        path: PathBuf::from("<defaults>"),
        message: e.to_string(),
    })
}

/// Recursively overlay `layer` onto `base`
///
/// Mappings merge key by key. Any other value, `null` included, replaces.
fn merge(base: &mut serde_yml::Value, layer: serde_yml::Value) {
    match (base, layer) {
        (serde_yml::Value::Mapping(base_map), serde_yml::Value::Mapping(layer_map)) => {
            for (key, value) in layer_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.grid.data_start_col, 6);
        assert_eq!(config.vendor.header_rows, 9);
        assert_eq!(config.reference.sigma_lsl_col, 11);
        assert!(!config.pipeline.sync_reference);
    }

    #[test]
    fn test_partial_yaml_merges_with_defaults() {
        let config = Config::from_yaml(
            "grid:\n  data_start_col: 2\npipeline:\n  sync_reference: true\n",
        )
        .unwrap();
        assert_eq!(config.grid.data_start_col, 2);
        assert_eq!(config.grid.header_rows, 1);
        assert_eq!(config.grid.discriminator_col, Some(3));
        assert!(config.pipeline.sync_reference);
        assert_eq!(config.vendor, VendorLayout::default());
    }

    #[test]
    fn test_null_disables_optional_field() {
        let config = Config::from_yaml("grid:\n  discriminator_col: null\n").unwrap();
        assert_eq!(config.grid.discriminator_col, None);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_later_files_win() {
        let tmp = tempdir().unwrap();
        let first = tmp.path().join("a.yaml");
        let second = tmp.path().join("b.yaml");
        fs::write(&first, "grid:\n  header_rows: 4\n  data_start_col: 3\n").unwrap();
        fs::write(&second, "grid:\n  data_start_col: 8\n").unwrap();

        let config = Config::from_files(&[first, second]).unwrap();
        assert_eq!(config.grid.header_rows, 4);
        assert_eq!(config.grid.data_start_col, 8);
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let tmp = tempdir().unwrap();
        let bad = tmp.path().join("bad.yaml");
        fs::write(&bad, "grid: [unclosed").unwrap();
        let err = Config::from_files(&[bad]).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let template = default_template().unwrap();
        assert_eq!(Config::from_yaml(&template).unwrap(), Config::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/netlimits.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
