//! Build modules visible to providers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A module of the build graph.
///
/// Only the introspection data providers may ask for is kept; the module's
/// own properties belong to the graph engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
  pub name: String,

  /// Directory of the file that defines the module, relative to the source root.
  #[serde(default)]
  pub dir: PathBuf,

  /// Variant sub-directory (e.g. `android_arm64_armv8-a_shared`).
  #[serde(default)]
  pub variant: String,

  #[serde(rename = "type")]
  pub module_type: String,

  /// Defining file. Defaults to `<dir>/Android.bp` when not given.
  #[serde(default)]
  pub blueprint_file: Option<PathBuf>,
}

impl Module {
  pub fn new(name: impl Into<String>, module_type: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      dir: PathBuf::new(),
      variant: String::new(),
      module_type: module_type.into(),
      blueprint_file: None,
    }
  }

  pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.dir = dir.into();
    self
  }

  pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
    self.variant = variant.into();
    self
  }

  pub fn blueprint_file(&self) -> PathBuf {
    self
      .blueprint_file
      .clone()
      .unwrap_or_else(|| self.dir.join("Android.bp"))
  }
}
