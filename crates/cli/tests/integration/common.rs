//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test runs the binary inside its own temporary directory, so relative
/// `out_dir` and `source_dir` settings resolve there.
pub struct TestEnv {
  pub temp: TempDir,
  pub config_path: PathBuf,
}

impl TestEnv {
  /// Create an environment with the fixture `makevars.toml` as its config.
  pub fn new() -> Self {
    let env = Self::empty();
    env.write_file("makevars.toml", &fixture_content("makevars.toml"));
    env
  }

  /// Create an environment without a config file.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("makevars.toml");
    Self { temp, config_path }
  }

  /// Copy a provider fixture into the environment and return its path.
  pub fn providers(&self, fixture: &str) -> PathBuf {
    self.write_file(fixture, &fixture_content(fixture));
    self.temp.path().join(fixture)
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Path of the generated fragment with the fixture config.
  pub fn out_file(&self) -> PathBuf {
    self.temp.path().join("out").join("soong").join("make_vars.mk")
  }

  /// Get a pre-configured Command for the makevars binary.
  ///
  /// Runs in the temp directory with `MAKEVARS_*` overrides cleared.
  pub fn makevars_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("makevars");
    cmd.current_dir(self.temp.path());
    cmd.env_remove("MAKEVARS_OUT_DIR");
    cmd.env_remove("MAKEVARS_MAKE_SUFFIX");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
