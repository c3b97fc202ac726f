//! The contribution API handed to providers.
//!
//! Every provider invocation gets a fresh [`ExportContext`]. It wraps the
//! shared [`BuildContext`] together with the provider's [`Namespace`] and
//! collects the [`MakeVar`]s the provider produces. Providers only see the
//! narrow [`MakeVarsContext`] trait: the six contribution methods, `eval`, and
//! the build-context capabilities forwarded unchanged.

use std::path::PathBuf;

use crate::config::{Config, DeviceConfig};
use crate::fs::{FileSystem, GlobError};
use crate::module::Module;
use crate::ninja::{EvalError, Namespace};
use crate::session::BuildContext;
use crate::variable::MakeVar;

/// Operations available to a make variable provider.
pub trait MakeVarsContext {
  /// Verify the make variable matches the value, fail the build if it does
  /// not. If the make variable is empty, just set it.
  fn strict(&mut self, name: &str, ninja_str: &str);

  /// Check the make variable matches the value, warn if it does not. If the
  /// make variable is empty, just set it.
  fn check(&mut self, name: &str, ninja_str: &str);

  /// Like [`strict`](Self::strict), comparing both sides as unordered sets
  /// and reporting only the elements unique to each side.
  fn strict_sorted(&mut self, name: &str, ninja_str: &str);

  /// Like [`check`](Self::check), comparing both sides as unordered sets.
  fn check_sorted(&mut self, name: &str, ninja_str: &str);

  /// Like [`strict`](Self::strict) for a value that is already final. The
  /// value is not evaluated.
  fn strict_raw(&mut self, name: &str, value: &str);

  /// Like [`check`](Self::check) for a value that is already final.
  fn check_raw(&mut self, name: &str, value: &str);

  /// Evaluate a ninja string into a makefile literal. Used when a value needs
  /// more work before being passed to one of the `*_raw` methods.
  fn eval(&self, ninja_str: &str) -> Result<String, EvalError>;

  fn config(&self) -> &Config;
  fn device_config(&self) -> &DeviceConfig;
  fn add_ninja_file_deps(&self, deps: &[String]);
  fn fs(&self) -> &dyn FileSystem;

  fn module_name(&self, module: &Module) -> String;
  fn module_dir(&self, module: &Module) -> PathBuf;
  fn module_subdir(&self, module: &Module) -> String;
  fn module_type(&self, module: &Module) -> String;
  fn blueprint_file(&self, module: &Module) -> PathBuf;

  fn module_errorf(&self, module: &Module, message: &str);
  fn errorf(&self, message: &str);
  fn failed(&self) -> bool;

  fn visit_all_modules(&self, visit: &mut dyn FnMut(&Module));
  fn visit_all_modules_if(&self, pred: &dyn Fn(&Module) -> bool, visit: &mut dyn FnMut(&Module));

  /// List files matching `pattern` but none of `excludes`, rerunning the
  /// pass whenever a matching file is added or removed.
  fn glob_with_deps(&self, pattern: &str, excludes: &[String]) -> Result<Vec<String>, GlobError>;
}

/// Per-invocation implementation of [`MakeVarsContext`].
pub struct ExportContext<'a> {
  ctx: &'a dyn BuildContext,
  namespace: &'a Namespace,
  vars: Vec<MakeVar>,
}

impl<'a> ExportContext<'a> {
  pub fn new(ctx: &'a dyn BuildContext, namespace: &'a Namespace) -> Self {
    Self {
      ctx,
      namespace,
      vars: Vec::new(),
    }
  }

  /// Records produced so far.
  pub fn vars(&self) -> &[MakeVar] {
    &self.vars
  }

  /// Consume the context, yielding its records in call order.
  pub fn into_vars(self) -> Vec<MakeVar> {
    self.vars
  }

  fn add_variable_raw(&mut self, name: &str, value: &str, strict: bool, sort: bool) {
    self.vars.push(MakeVar::new(name, value, strict, sort));
  }

  fn add_variable(&mut self, name: &str, ninja_str: &str, strict: bool, sort: bool) {
    let value = match self.eval(ninja_str) {
      Ok(value) => value,
      Err(e) => {
        self.ctx.report_error(&e.to_string());
        String::new()
      }
    };
    self.add_variable_raw(name, &value, strict, sort);
  }
}

/// Turn a ninja-escaped string into a makefile literal.
fn descape(s: &str) -> String {
  s.replace("$$", "$")
}

impl MakeVarsContext for ExportContext<'_> {
  fn strict(&mut self, name: &str, ninja_str: &str) {
    self.add_variable(name, ninja_str, true, false);
  }

  fn check(&mut self, name: &str, ninja_str: &str) {
    self.add_variable(name, ninja_str, false, false);
  }

  fn strict_sorted(&mut self, name: &str, ninja_str: &str) {
    self.add_variable(name, ninja_str, true, true);
  }

  fn check_sorted(&mut self, name: &str, ninja_str: &str) {
    self.add_variable(name, ninja_str, false, true);
  }

  fn strict_raw(&mut self, name: &str, value: &str) {
    self.add_variable_raw(name, value, true, false);
  }

  fn check_raw(&mut self, name: &str, value: &str) {
    self.add_variable_raw(name, value, false, false);
  }

  fn eval(&self, ninja_str: &str) -> Result<String, EvalError> {
    let s = self.ctx.eval(self.namespace, ninja_str)?;
    Ok(descape(&s))
  }

  fn config(&self) -> &Config {
    self.ctx.config()
  }

  fn device_config(&self) -> &DeviceConfig {
    self.ctx.device_config()
  }

  fn add_ninja_file_deps(&self, deps: &[String]) {
    self.ctx.add_ninja_file_deps(deps);
  }

  fn fs(&self) -> &dyn FileSystem {
    self.ctx.fs()
  }

  fn module_name(&self, module: &Module) -> String {
    self.ctx.module_name(module)
  }

  fn module_dir(&self, module: &Module) -> PathBuf {
    self.ctx.module_dir(module)
  }

  fn module_subdir(&self, module: &Module) -> String {
    self.ctx.module_subdir(module)
  }

  fn module_type(&self, module: &Module) -> String {
    self.ctx.module_type(module)
  }

  fn blueprint_file(&self, module: &Module) -> PathBuf {
    self.ctx.blueprint_file(module)
  }

  fn module_errorf(&self, module: &Module, message: &str) {
    self.ctx.report_module_error(module, message);
  }

  fn errorf(&self, message: &str) {
    self.ctx.report_error(message);
  }

  fn failed(&self) -> bool {
    self.ctx.failed()
  }

  fn visit_all_modules(&self, visit: &mut dyn FnMut(&Module)) {
    self.ctx.visit_all_modules(visit);
  }

  fn visit_all_modules_if(&self, pred: &dyn Fn(&Module) -> bool, visit: &mut dyn FnMut(&Module)) {
    self.ctx.visit_all_modules_if(pred, visit);
  }

  fn glob_with_deps(&self, pattern: &str, excludes: &[String]) -> Result<Vec<String>, GlobError> {
    self.ctx.glob_with_deps(pattern, excludes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::Session;

  fn namespace() -> Namespace {
    Namespace::new("cc")
      .with_variable("ClangVersion", "r487747")
      .with_variable("ClangBase", "prebuilts/clang/host")
      .with_variable("ClangPath", "${ClangBase}/clang-${ClangVersion}")
      .with_variable("Shell", "$$SHELL")
  }

  mod contribution {
    use super::*;

    #[test]
    fn each_method_sets_its_policies() {
      let session = Session::new(Config::default());
      let ns = namespace();
      let mut ctx = ExportContext::new(&session, &ns);

      ctx.strict("A", "a");
      ctx.strict_sorted("B", "b");
      ctx.strict_raw("C", "c");
      ctx.check("D", "d");
      ctx.check_sorted("E", "e");
      ctx.check_raw("F", "f");

      let flags: Vec<_> = ctx
        .into_vars()
        .iter()
        .map(|v| (v.name().to_string(), v.is_strict(), v.is_sorted()))
        .collect();
      assert_eq!(
        flags,
        vec![
          ("A".to_string(), true, false),
          ("B".to_string(), true, true),
          ("C".to_string(), true, false),
          ("D".to_string(), false, false),
          ("E".to_string(), false, true),
          ("F".to_string(), false, false),
        ]
      );
    }

    #[test]
    fn expressions_are_evaluated_in_the_namespace() {
      let session = Session::new(Config::default());
      let ns = namespace();
      let mut ctx = ExportContext::new(&session, &ns);

      ctx.strict("CLANG", "${ClangPath}/bin/clang");
      assert_eq!(ctx.vars()[0].value(), "prebuilts/clang/host/clang-r487747/bin/clang");
    }

    #[test]
    fn escaped_dollars_become_single_dollars() {
      let session = Session::new(Config::default());
      let ns = namespace();
      let mut ctx = ExportContext::new(&session, &ns);

      ctx.check("SHELL_CMD", "$Shell -c 'echo $$PATH'");
      assert_eq!(ctx.vars()[0].value(), "$SHELL -c 'echo $PATH'");
    }

    #[test]
    fn raw_values_are_taken_verbatim() {
      let session = Session::new(Config::default());
      let ns = namespace();
      let mut ctx = ExportContext::new(&session, &ns);

      ctx.strict_raw("RAW", "${ClangPath} $$ $");
      ctx.check_raw("EMPTY", "");
      assert_eq!(ctx.vars()[0].value(), "${ClangPath} $$ $");
      assert_eq!(ctx.vars()[1].value(), "");
      assert!(!session.failed());
    }
  }

  mod eval_errors {
    use super::*;

    #[test]
    fn failure_is_reported_and_record_kept_empty() {
      let session = Session::new(Config::default());
      let ns = namespace();
      let mut ctx = ExportContext::new(&session, &ns);

      ctx.strict("BROKEN", "${DoesNotExist}");
      ctx.strict("AFTER", "ok");

      let vars = ctx.into_vars();
      assert_eq!(vars.len(), 2);
      assert_eq!(vars[0].name(), "BROKEN");
      assert_eq!(vars[0].value(), "");
      assert_eq!(vars[1].value(), "ok");

      assert!(session.failed());
      assert_eq!(session.errors().len(), 1);
      assert!(session.errors()[0].contains("DoesNotExist"));
    }

    #[test]
    fn eval_returns_the_error_without_reporting() {
      let session = Session::new(Config::default());
      let ns = namespace();
      let ctx = ExportContext::new(&session, &ns);

      assert!(ctx.eval("${Nope}").is_err());
      assert!(!session.failed());
    }
  }

  mod forwarding {
    use super::*;

    #[test]
    fn errors_and_config_reach_the_build_context() {
      let config = Config {
        min_supported_sdk_version: 23,
        modules: vec![Module::new("libfoo", "cc_library")],
        ..Config::default()
      };
      let session = Session::new(config);
      let ns = namespace();
      let ctx = ExportContext::new(&session, &ns);

      assert_eq!(ctx.config().min_supported_sdk_version, 23);

      let mut seen = Vec::new();
      ctx.visit_all_modules(&mut |m| seen.push(m.name.clone()));
      assert_eq!(seen, vec!["libfoo"]);

      ctx.errorf("provider gave up");
      assert!(ctx.failed());
      assert_eq!(session.errors(), vec!["provider gave up"]);
    }
  }
}
