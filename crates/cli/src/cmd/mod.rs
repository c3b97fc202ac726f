mod check;
mod generate;
mod list;
mod show;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use makevars_lib::builtin::register_builtin_providers;
use makevars_lib::config::Config;
use makevars_lib::consts::CONFIG_FILENAME;
use makevars_lib::lua::load_providers;
use makevars_lib::provider::ProviderRegistry;
use makevars_lib::session::Session;

use crate::output::print_error;

pub use check::cmd_check;
pub use generate::cmd_generate;
pub use list::cmd_list;
pub use show::cmd_show;

/// Options shared by every command that runs a pass.
#[derive(Debug, Args)]
pub struct PassArgs {
  /// Path to the configuration file
  #[arg(short, long, default_value = CONFIG_FILENAME)]
  pub config: PathBuf,

  /// Lua provider script (may be repeated)
  #[arg(short, long = "providers", value_name = "FILE")]
  pub providers: Vec<PathBuf>,

  /// Directory to write make_vars<suffix>.mk to
  #[arg(long, value_name = "DIR")]
  pub out_dir: Option<PathBuf>,

  /// Do not register the built-in providers
  #[arg(long)]
  pub no_builtin: bool,
}

/// Load the configuration and register every provider.
fn prepare(args: &PassArgs) -> Result<(Session, ProviderRegistry)> {
  let mut config = Config::load_or_default(&args.config)
    .with_context(|| format!("Failed to load config: {}", args.config.display()))?
    .with_env_overrides();
  if let Some(out_dir) = &args.out_dir {
    config.out_dir = out_dir.clone();
  }

  let mut registry = ProviderRegistry::new();
  if !args.no_builtin {
    register_builtin_providers(&mut registry);
  }
  for script in &args.providers {
    load_providers(script, &mut registry)
      .with_context(|| format!("Failed to load providers: {}", script.display()))?;
  }
  debug!(providers = registry.len(), "registry ready");

  Ok((Session::new(config), registry))
}

fn print_errors(session: &Session) {
  for error in session.errors() {
    print_error(&error);
  }
}
