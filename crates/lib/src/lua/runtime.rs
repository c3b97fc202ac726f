use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use mlua::prelude::*;

use crate::lua::globals::{self, ScriptProviders};

/// Create a Lua runtime with the `makevars` global registered.
pub fn create_runtime(providers: Rc<RefCell<ScriptProviders>>) -> LuaResult<Lua> {
  let lua = Lua::new();
  globals::register_globals(&lua, providers)?;
  Ok(lua)
}

/// Load and execute a provider script.
/// Sets `makevars.dir` to the directory of the loaded file.
pub fn load_file(lua: &Lua, path: &Path) -> LuaResult<()> {
  let canonical_path = dunce::canonicalize(path)
    .map_err(|e| LuaError::external(format!("cannot canonicalize '{}': {}", path.display(), e)))?;
  let content = std::fs::read_to_string(&canonical_path)
    .map_err(|e| LuaError::external(format!("cannot read '{}': {}", canonical_path.display(), e)))?;

  let makevars = lua.globals().get::<LuaTable>("makevars")?;
  makevars.set(
    "dir",
    canonical_path
      .parent()
      .unwrap_or(Path::new(""))
      .to_string_lossy()
      .to_string(),
  )?;

  lua
    .load(&content)
    .set_name(format!("@{}", canonical_path.display()))
    .exec()
}
