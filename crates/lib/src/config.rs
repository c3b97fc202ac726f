//! Build configuration.
//!
//! The configuration is read from `makevars.toml`:
//!
//! ```toml
//! out_dir = "out/soong"
//! source_dir = "."
//! embedded_in_make = true
//! make_suffix = "-aosp_arm64"
//! min_supported_sdk_version = 21
//!
//! [variables]
//! OutDir = "out"
//!
//! [product]
//! platform_sdk_version = 34
//!
//! [device]
//! name = "generic_arm64"
//! arch = "arm64"
//!
//! [[modules]]
//! name = "libfoo"
//! type = "cc_library"
//! dir = "external/foo"
//! ```
//!
//! `MAKEVARS_OUT_DIR` and `MAKEVARS_MAKE_SUFFIX` override the file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{MAKE_SUFFIX_ENV, OUT_DIR_ENV, OUTPUT_EXT, OUTPUT_STEM};
use crate::module::Module;

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

/// Global build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory the generated fragment is written to.
  pub out_dir: PathBuf,

  /// Root of the source tree, used for globbing.
  pub source_dir: PathBuf,

  /// Whether this run feeds a legacy make build. Nothing is emitted otherwise.
  pub embedded_in_make: bool,

  /// Appended to the output file name (`make_vars<suffix>.mk`).
  pub make_suffix: Option<String>,

  pub min_supported_sdk_version: u32,

  /// Session-wide ninja variables, visible from every namespace.
  pub variables: BTreeMap<String, String>,

  /// Free-form product configuration.
  pub product: BTreeMap<String, toml::Value>,

  pub device: DeviceConfig,

  pub modules: Vec<Module>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      out_dir: PathBuf::from("out").join("soong"),
      source_dir: PathBuf::from("."),
      embedded_in_make: true,
      make_suffix: None,
      min_supported_sdk_version: 21,
      variables: BTreeMap::new(),
      product: BTreeMap::new(),
      device: DeviceConfig::default(),
      modules: Vec::new(),
    }
  }
}

impl Config {
  /// Load and parse a configuration file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&content, path)
  }

  /// Load a configuration file, falling back to defaults when it does not exist.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    match fs::read_to_string(path) {
      Ok(content) => Self::parse(&content, path),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no config file, using defaults");
        Ok(Self::default())
      }
      Err(source) => Err(ConfigError::Read {
        path: path.to_path_buf(),
        source,
      }),
    }
  }

  fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Apply `MAKEVARS_*` environment overrides.
  pub fn with_env_overrides(mut self) -> Self {
    if let Ok(out_dir) = std::env::var(OUT_DIR_ENV) {
      self.out_dir = PathBuf::from(out_dir);
    }
    if let Ok(suffix) = std::env::var(MAKE_SUFFIX_ENV) {
      self.make_suffix = Some(suffix);
    }
    self
  }

  /// Path of the generated fragment.
  pub fn make_vars_path(&self) -> PathBuf {
    let suffix = self.make_suffix.as_deref().unwrap_or("");
    self
      .out_dir
      .join(format!("{}{}.{}", OUTPUT_STEM, suffix, OUTPUT_EXT))
  }

  /// Look up a global configuration value as text.
  ///
  /// The `[product]` table is consulted first, then the typed top-level
  /// settings by their field name.
  pub fn lookup(&self, key: &str) -> Option<String> {
    if let Some(value) = self.product.get(key) {
      return Some(value_to_string(value));
    }
    match key {
      "min_supported_sdk_version" => Some(self.min_supported_sdk_version.to_string()),
      "make_suffix" => self.make_suffix.clone(),
      "embedded_in_make" => Some(self.embedded_in_make.to_string()),
      "out_dir" => Some(self.out_dir.to_string_lossy().to_string()),
      _ => None,
    }
  }
}

/// Per-target configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
  pub name: Option<String>,
  pub arch: Option<String>,
  pub variables: BTreeMap<String, toml::Value>,
}

impl DeviceConfig {
  /// Look up a device configuration value as text.
  pub fn lookup(&self, key: &str) -> Option<String> {
    if let Some(value) = self.variables.get(key) {
      return Some(value_to_string(value));
    }
    match key {
      "name" => self.name.clone(),
      "arch" => self.arch.clone(),
      _ => None,
    }
  }
}

/// Render a TOML value the way make would see it. Arrays become
/// space-separated lists.
fn value_to_string(value: &toml::Value) -> String {
  match value {
    toml::Value::String(s) => s.clone(),
    toml::Value::Array(items) => items.iter().map(value_to_string).collect::<Vec<_>>().join(" "),
    other => other.to_string(),
  }
}
