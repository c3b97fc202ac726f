//! The shared build-graph context.
//!
//! [`BuildContext`] is everything the export bridge needs from the build
//! graph: configuration, expression evaluation, module enumeration, an error
//! channel with a build-wide failure flag, dependency registration and
//! filesystem access. [`Session`] is the implementation used by the CLI and
//! the tests; a real graph engine implements the trait itself.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{debug, error};

use crate::config::{Config, DeviceConfig};
use crate::fs::{FileSystem, GlobError, OsFs};
use crate::module::Module;
use crate::ninja::{self, EvalError, Namespace, NamespaceScope};

/// Capabilities of the build graph consumed by the export bridge.
pub trait BuildContext {
  fn config(&self) -> &Config;

  fn device_config(&self) -> &DeviceConfig {
    &self.config().device
  }

  /// Evaluate a ninja string against a namespace. The result keeps ninja
  /// escapes.
  fn eval(&self, namespace: &Namespace, expr: &str) -> Result<String, EvalError>;

  /// Report an error. Any reported error sets the failure flag.
  fn report_error(&self, message: &str);

  /// Report an error attributed to a module.
  fn report_module_error(&self, module: &Module, message: &str);

  /// Whether any error has been reported so far.
  fn failed(&self) -> bool;

  fn modules(&self) -> &[Module];

  fn visit_all_modules(&self, visit: &mut dyn FnMut(&Module)) {
    for module in self.modules() {
      visit(module);
    }
  }

  fn visit_all_modules_if(&self, pred: &dyn Fn(&Module) -> bool, visit: &mut dyn FnMut(&Module)) {
    for module in self.modules().iter().filter(|m| pred(m)) {
      visit(module);
    }
  }

  fn module_name(&self, module: &Module) -> String {
    module.name.clone()
  }

  fn module_dir(&self, module: &Module) -> PathBuf {
    module.dir.clone()
  }

  fn module_subdir(&self, module: &Module) -> String {
    module.variant.clone()
  }

  fn module_type(&self, module: &Module) -> String {
    module.module_type.clone()
  }

  fn blueprint_file(&self, module: &Module) -> PathBuf {
    module.blueprint_file()
  }

  /// Register files whose change must rerun the build-graph pass.
  fn add_ninja_file_deps(&self, deps: &[String]);

  /// Glob the source tree, registering the listed directories as deps.
  fn glob_with_deps(&self, pattern: &str, excludes: &[String]) -> Result<Vec<String>, GlobError>;

  fn fs(&self) -> &dyn FileSystem;
}

/// In-process build context backed by a [`Config`].
pub struct Session {
  config: Config,
  fs: Box<dyn FileSystem>,
  errors: RefCell<Vec<String>>,
  ninja_deps: RefCell<BTreeSet<String>>,
}

impl Session {
  /// Create a session rooted at the configured source directory.
  pub fn new(config: Config) -> Self {
    let fs = OsFs::new(config.source_dir.clone());
    Self::with_fs(config, fs)
  }

  pub fn with_fs(config: Config, fs: impl FileSystem + 'static) -> Self {
    Self {
      config,
      fs: Box::new(fs),
      errors: RefCell::new(Vec::new()),
      ninja_deps: RefCell::new(BTreeSet::new()),
    }
  }

  /// Errors reported so far, in order.
  pub fn errors(&self) -> Vec<String> {
    self.errors.borrow().clone()
  }

  /// Registered dependency files, sorted and deduplicated.
  pub fn ninja_deps(&self) -> Vec<String> {
    self.ninja_deps.borrow().iter().cloned().collect()
  }
}

impl BuildContext for Session {
  fn config(&self) -> &Config {
    &self.config
  }

  fn eval(&self, namespace: &Namespace, expr: &str) -> Result<String, EvalError> {
    ninja::eval(expr, &NamespaceScope::new(namespace, &self.config.variables))
  }

  fn report_error(&self, message: &str) {
    error!("{}", message);
    self.errors.borrow_mut().push(message.to_string());
  }

  fn report_module_error(&self, module: &Module, message: &str) {
    let message = format!(
      "{}: module {:?} variant {:?}: {}",
      module.blueprint_file().display(),
      module.name,
      module.variant,
      message
    );
    self.report_error(&message);
  }

  fn failed(&self) -> bool {
    !self.errors.borrow().is_empty()
  }

  fn modules(&self) -> &[Module] {
    &self.config.modules
  }

  fn add_ninja_file_deps(&self, deps: &[String]) {
    self.ninja_deps.borrow_mut().extend(deps.iter().cloned());
  }

  fn glob_with_deps(&self, pattern: &str, excludes: &[String]) -> Result<Vec<String>, GlobError> {
    let result = self.fs.glob(pattern, excludes)?;
    debug!(
      root = %self.fs.root().display(),
      pattern,
      matches = result.matches.len(),
      deps = result.deps.len(),
      "glob"
    );
    self.add_ninja_file_deps(&result.deps);
    Ok(result.matches)
  }

  fn fs(&self) -> &dyn FileSystem {
    self.fs.as_ref()
  }
}
