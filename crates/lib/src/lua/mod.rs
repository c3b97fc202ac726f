//! Lua provider scripts.
//!
//! A script declares namespaces and registers provider functions through the
//! `makevars` global. Loading a script drains those declarations into a
//! [`ProviderRegistry`]; each provider then runs in its own scoped `ctx`
//! during every pass.
//!
//! ```lua
//! makevars.namespace("java", { JavaHome = "prebuilts/jdk/jdk17" })
//!
//! makevars.register("java", function(ctx)
//!   ctx:strict("ANDROID_JAVA_HOME", "$JavaHome")
//!   ctx:check_sorted("JAVA_TARGETS", ctx:config("java_targets") or "")
//! end)
//! ```
//!
//! # Submodules
//!
//! - [`ctx`] - The scoped `ctx` table passed to providers
//! - [`globals`] - The `makevars` global table
//! - [`runtime`] - Lua VM setup and script loading

pub mod ctx;
pub mod globals;
pub mod runtime;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::context::MakeVarsContext;
use crate::lua::ctx::call_provider;
use crate::lua::globals::ScriptProviders;
use crate::provider::ProviderRegistry;

/// Errors raised while loading a provider script.
///
/// The Lua error is kept as text: `mlua::Error` is neither `Send` nor `Sync`
/// and callers need to move this across error-reporting boundaries.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("{}: {message}", path.display())]
  Lua { path: PathBuf, message: String },
}

impl LoadError {
  fn lua(path: &Path, err: LuaError) -> Self {
    LoadError::Lua {
      path: path.to_path_buf(),
      message: err.to_string(),
    }
  }
}

/// Load a provider script and register its providers, in declaration order.
///
/// Returns the number of providers registered. A Lua error raised later by a
/// provider while a pass runs is reported through the context's error channel
/// rather than returned.
///
/// # Errors
///
/// Returns [`LoadError::Lua`] if the runtime cannot be created or the script
/// fails to load or run. Nothing is registered in that case.
pub fn load_providers(path: &Path, registry: &mut ProviderRegistry) -> Result<usize, LoadError> {
  let declared = Rc::new(RefCell::new(ScriptProviders::default()));
  let lua = runtime::create_runtime(declared.clone()).map_err(|e| LoadError::lua(path, e))?;
  runtime::load_file(&lua, path).map_err(|e| LoadError::lua(path, e))?;

  let providers = std::mem::take(&mut declared.borrow_mut().providers);
  let count = providers.len();

  for (namespace, func) in providers {
    let lua = lua.clone();
    let script = path.display().to_string();
    debug!(script = %script, namespace = namespace.name(), "registering lua provider");

    registry.register(namespace, move |ctx: &mut dyn MakeVarsContext| {
      if let Err(e) = call_provider(&lua, &func, ctx) {
        ctx.errorf(&format!("lua provider in {} failed: {}", script, e));
      }
    });
  }

  info!(path = %path.display(), count, "loaded lua providers");
  Ok(count)
}
