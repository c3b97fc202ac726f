//! The `makevars` global table.
//!
//! - `makevars.version` - Version of the bridge
//! - `makevars.dir` - Directory of the script being loaded
//! - `makevars.namespace(name, vars)` - Declare an expression namespace
//! - `makevars.register(namespace, fn(ctx))` - Register a provider

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use mlua::prelude::*;

use crate::ninja::Namespace;

/// Namespaces and providers declared by a script, in declaration order.
#[derive(Default)]
pub struct ScriptProviders {
  pub namespaces: BTreeMap<String, Arc<Namespace>>,
  pub providers: Vec<(Arc<Namespace>, LuaFunction)>,
}

/// Register the `makevars` global table in the Lua runtime.
pub fn register_globals(lua: &Lua, providers: Rc<RefCell<ScriptProviders>>) -> LuaResult<()> {
  let makevars = lua.create_table()?;

  makevars.set("version", env!("CARGO_PKG_VERSION"))?;

  let declared = providers.clone();
  let namespace = lua.create_function(move |_, (name, vars): (String, Option<LuaTable>)| {
    let mut state = declared.borrow_mut();
    if state.namespaces.contains_key(&name) {
      return Err(LuaError::external(format!("namespace '{}' is already declared", name)));
    }

    let mut ns = Namespace::new(name.clone());
    if let Some(vars) = vars {
      for pair in vars.pairs::<String, String>() {
        let (key, value) = pair?;
        ns = ns.with_variable(key, value);
      }
    }
    state.namespaces.insert(name.clone(), Arc::new(ns));
    Ok(name)
  })?;
  makevars.set("namespace", namespace)?;

  let register = lua.create_function(move |_, (name, func): (String, LuaFunction)| {
    let mut state = providers.borrow_mut();
    let ns = state
      .namespaces
      .get(&name)
      .cloned()
      .ok_or_else(|| LuaError::external(format!("unknown namespace '{}'", name)))?;
    state.providers.push((ns, func));
    Ok(())
  })?;
  makevars.set("register", register)?;

  lua.globals().set("makevars", makevars)?;

  Ok(())
}
