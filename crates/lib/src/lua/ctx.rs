//! The `ctx` table handed to Lua providers.
//!
//! The table only lives for the duration of one provider call: its functions
//! are scoped and borrow the Rust-side [`MakeVarsContext`] directly. All
//! methods are called with colon syntax (`ctx:strict("FOO", "$Bar")`).

use std::cell::RefCell;

use mlua::prelude::*;

use crate::context::MakeVarsContext;
use crate::module::Module;

type Contribution = fn(&mut dyn MakeVarsContext, &str, &str);

const CONTRIBUTIONS: [(&str, Contribution); 6] = [
  ("strict", |c, n, v| c.strict(n, v)),
  ("strict_sorted", |c, n, v| c.strict_sorted(n, v)),
  ("strict_raw", |c, n, v| c.strict_raw(n, v)),
  ("check", |c, n, v| c.check(n, v)),
  ("check_sorted", |c, n, v| c.check_sorted(n, v)),
  ("check_raw", |c, n, v| c.check_raw(n, v)),
];

/// Call a Lua provider function with a `ctx` table bound to `ctx`.
pub fn call_provider(lua: &Lua, func: &LuaFunction, ctx: &mut dyn MakeVarsContext) -> LuaResult<()> {
  let cell = RefCell::new(ctx);
  let cell = &cell;

  lua.scope(|scope| {
    let table = lua.create_table()?;

    for (method, add) in CONTRIBUTIONS {
      let f = scope.create_function(move |_, (_, name, value): (LuaValue, String, String)| {
        add(&mut **cell.borrow_mut(), &name, &value);
        Ok(())
      })?;
      table.set(method, f)?;
    }

    table.set(
      "eval",
      scope.create_function(move |_, (_, expr): (LuaValue, String)| {
        cell.borrow().eval(&expr).map_err(LuaError::external)
      })?,
    )?;

    table.set(
      "errorf",
      scope.create_function(move |_, (_, message): (LuaValue, String)| {
        cell.borrow().errorf(&message);
        Ok(())
      })?,
    )?;

    table.set(
      "failed",
      scope.create_function(move |_, _: LuaValue| Ok(cell.borrow().failed()))?,
    )?;

    table.set(
      "modules",
      scope.create_function(move |lua, _: LuaValue| {
        let ctx = cell.borrow();
        let mut modules = Vec::new();
        ctx.visit_all_modules(&mut |m| modules.push(m.clone()));

        let list = lua.create_table()?;
        for module in &modules {
          list.push(module_table(lua, &**ctx, module)?)?;
        }
        Ok(list)
      })?,
    )?;

    table.set(
      "glob",
      scope.create_function(
        move |_, (_, pattern, excludes): (LuaValue, String, Option<Vec<String>>)| {
          cell
            .borrow()
            .glob_with_deps(&pattern, &excludes.unwrap_or_default())
            .map_err(LuaError::external)
        },
      )?,
    )?;

    table.set(
      "add_deps",
      scope.create_function(move |_, (_, deps): (LuaValue, LuaVariadic<String>)| {
        cell.borrow().add_ninja_file_deps(&deps);
        Ok(())
      })?,
    )?;

    table.set(
      "config",
      scope.create_function(move |_, (_, key): (LuaValue, String)| Ok(cell.borrow().config().lookup(&key)))?,
    )?;

    table.set(
      "device_config",
      scope.create_function(move |_, (_, key): (LuaValue, String)| {
        Ok(cell.borrow().device_config().lookup(&key))
      })?,
    )?;

    func.call::<()>(table)
  })
}

fn module_table(lua: &Lua, ctx: &dyn MakeVarsContext, module: &Module) -> LuaResult<LuaTable> {
  let t = lua.create_table()?;
  t.set("name", ctx.module_name(module))?;
  t.set("dir", ctx.module_dir(module).to_string_lossy().to_string())?;
  t.set("variant", ctx.module_subdir(module))?;
  t.set("type", ctx.module_type(module))?;
  t.set(
    "blueprint_file",
    ctx.blueprint_file(module).to_string_lossy().to_string(),
  )?;
  Ok(t)
}
