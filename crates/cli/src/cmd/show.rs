use std::io::Write;

use anyhow::{Context, Result, bail};

use makevars_lib::emit::MakeVarsSingleton;

use super::{PassArgs, prepare, print_errors};

/// Print the fragment a pass would write, without touching the output file.
pub fn cmd_show(args: &PassArgs) -> Result<()> {
  let (session, registry) = prepare(args)?;

  let Some(bytes) = MakeVarsSingleton::new(&registry).render(&session) else {
    print_errors(&session);
    bail!("Failed to render make vars");
  };

  std::io::stdout()
    .write_all(&bytes)
    .context("Failed to write to stdout")?;
  Ok(())
}
