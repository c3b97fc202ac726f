//! Aggregation and emission of the make variables fragment.
//!
//! One pass runs every registered provider through a fresh
//! [`ExportContext`], renders all records into a makefile fragment and writes
//! it only if its content changed, so an unrelated pass never invalidates the
//! legacy build's incremental state.
//!
//! # Pass
//!
//! ```text
//! Idle ──(not embedded in make)──────────────► Skipped
//!  │
//!  ├──(failure flag already set)─────────────► Aborted
//!  ▼
//! Collecting ──(failure flag set)────────────► Aborted
//!  ▼
//! Rendering ─► Writing ──(same bytes)────────► Unchanged
//!                 ├──────(write error)───────► Failed
//!                 └──────────────────────────► Written
//! ```
//!
//! # Fragment layout
//!
//! The comparison macro, every strict variable, a single fatal error if any
//! strict comparison failed, every checked variable, and finally the macro is
//! undefined. Strict records come first so that a strict failure stops make
//! before any checked warning is printed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::context::ExportContext;
use crate::provider::ProviderRegistry;
use crate::session::BuildContext;
use crate::variable::MakeVar;

const HEADER: &str = r#"# Autogenerated file

# Compares SOONG_$(1) against $(1), and warns if they are not equal.
#
# If the original variable is empty, then just set it to the SOONG_ version.
#
# $(1): Name of the variable to check
# $(2): If not-empty, sort the values before comparing
# $(3): Extra snippet to run if it does not match
define soong-compare-var
ifneq ($$($(1)),)
  my_val_make := $$(strip $(if $(2),$$(sort $$($(1))),$$($(1))))
  my_val_soong := $(if $(2),$$(sort $$(SOONG_$(1))),$$(SOONG_$(1)))
  ifneq ($$(my_val_make),$$(my_val_soong))
    $$(warning $(1) does not match between Make and Soong:)
    $(if $(2),$$(warning Make  adds: $$(filter-out $$(my_val_soong),$$(my_val_make))),$$(warning Make : $$(my_val_make)))
    $(if $(2),$$(warning Soong adds: $$(filter-out $$(my_val_make),$$(my_val_soong))),$$(warning Soong: $$(my_val_soong)))
    $(3)
  endif
  my_val_make :=
  my_val_soong :=
else
  $(1) := $$(SOONG_$(1))
endif
.KATI_READONLY := $(1) SOONG_$(1)
endef

my_check_failed := false

"#;

const STRICT_CHECK: &str = r#"
ifneq ($(my_check_failed),false)
  $(error Soong variable check failed)
endif
my_check_failed :=


"#;

const FOOTER: &str = "\nsoong-compare-var :=\n";

/// Snippet passed as the macro's third argument for strict variables.
const STRICT_FAILURE_ACTION: &str = "my_check_failed := true";

/// Errors writing the generated fragment.
#[derive(Debug, Error)]
pub enum EmitError {
  #[error("failed to create output directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Terminal state of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
  /// The build does not feed make; nothing was done.
  Skipped,
  /// The failure flag was set; the previous output was left untouched.
  Aborted,
  /// The rendered fragment equals the existing file; nothing was written.
  Unchanged { path: PathBuf },
  /// The fragment was written.
  Written { path: PathBuf },
  /// Writing failed; the error went through the build context.
  Failed { path: PathBuf },
}

impl EmitOutcome {
  pub fn is_success(&self) -> bool {
    matches!(
      self,
      EmitOutcome::Skipped | EmitOutcome::Unchanged { .. } | EmitOutcome::Written { .. }
    )
  }
}

/// The build singleton exporting variables to make.
pub struct MakeVarsSingleton<'a> {
  registry: &'a ProviderRegistry,
}

impl<'a> MakeVarsSingleton<'a> {
  pub fn new(registry: &'a ProviderRegistry) -> Self {
    Self { registry }
  }

  /// Run every provider and concatenate their records in registration order.
  pub fn collect(&self, ctx: &dyn BuildContext) -> Vec<MakeVar> {
    let mut vars = Vec::new();
    for provider in self.registry.iter() {
      let mut mctx = ExportContext::new(ctx, provider.namespace());
      provider.call(&mut mctx);
      let produced = mctx.into_vars();
      debug!(namespace = provider.namespace().name(), count = produced.len(), "provider ran");
      vars.extend(produced);
    }
    vars
  }

  /// Collect and render without writing. `None` if the failure flag is set
  /// before or after collection.
  pub fn render(&self, ctx: &dyn BuildContext) -> Option<Vec<u8>> {
    if ctx.failed() {
      return None;
    }
    let vars = self.collect(ctx);
    if ctx.failed() {
      return None;
    }
    Some(write_vars(&vars))
  }

  /// Run the full pass and write `make_vars<suffix>.mk` if it changed.
  pub fn generate_build_actions(&self, ctx: &dyn BuildContext) -> EmitOutcome {
    if !ctx.config().embedded_in_make {
      debug!("not embedded in make, skipping make vars");
      return EmitOutcome::Skipped;
    }

    let out_file = ctx.config().make_vars_path();

    let Some(out_bytes) = self.render(ctx) else {
      warn!(path = %out_file.display(), "build failed, leaving make vars untouched");
      return EmitOutcome::Aborted;
    };

    match write_if_changed(&out_file, &out_bytes) {
      Ok(true) => {
        info!(path = %out_file.display(), bytes = out_bytes.len(), "wrote make vars");
        EmitOutcome::Written { path: out_file }
      }
      Ok(false) => {
        debug!(path = %out_file.display(), "make vars unchanged");
        EmitOutcome::Unchanged { path: out_file }
      }
      Err(e) => {
        ctx.report_error(&e.to_string());
        EmitOutcome::Failed { path: out_file }
      }
    }
  }
}

/// Render records into the makefile fragment.
pub fn write_vars(vars: &[MakeVar]) -> Vec<u8> {
  let mut buf = String::from(HEADER);

  // Strict checks go first so that if one of them errors, all the strict
  // errors are printed but none of the non-strict warnings.
  for v in vars.iter().filter(|v| v.is_strict()) {
    push_var(&mut buf, v, Some(STRICT_FAILURE_ACTION));
  }

  buf.push_str(STRICT_CHECK);

  for v in vars.iter().filter(|v| !v.is_strict()) {
    push_var(&mut buf, v, None);
  }

  buf.push_str(FOOTER);
  buf.into_bytes()
}

fn push_var(buf: &mut String, v: &MakeVar, on_mismatch: Option<&str>) {
  let sort = if v.is_sorted() { "true" } else { "" };
  buf.push_str(&format!("{} := {}\n", v.soong_name(), v.value()));
  match on_mismatch {
    Some(action) => buf.push_str(&format!(
      "$(eval $(call soong-compare-var,{},{},{}))\n\n",
      v.name(),
      sort,
      action
    )),
    None => buf.push_str(&format!("$(eval $(call soong-compare-var,{},{}))\n\n", v.name(), sort)),
  }
}

/// Replace `path` with `content` unless it already holds exactly that.
///
/// Returns whether the file was written. The new content goes to a temporary
/// sibling first and is renamed into place, so readers never see a partial
/// file.
pub fn write_if_changed(path: &Path, content: &[u8]) -> Result<bool, EmitError> {
  if let Ok(existing) = fs::read(path)
    && existing == content
  {
    return Ok(false);
  }

  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
  temp_name.push(".tmp");
  let temp_path = path.with_file_name(temp_name);

  fs::write(&temp_path, content).map_err(|source| EmitError::Write {
    path: path.to_path_buf(),
    source,
  })?;
  fs::rename(&temp_path, path).map_err(|source| EmitError::Write {
    path: path.to_path_buf(),
    source,
  })?;

  Ok(true)
}
