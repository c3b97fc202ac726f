//! Implementation of the `makevars generate` command.
//!
//! Runs one pass and writes the makefile fragment only if its content changed.

use anyhow::{Result, bail};

use makevars_lib::emit::{EmitOutcome, MakeVarsSingleton};

use super::{PassArgs, prepare, print_errors};
use crate::output::{print_info, print_success};

pub fn cmd_generate(args: &PassArgs) -> Result<()> {
  let (session, registry) = prepare(args)?;

  match MakeVarsSingleton::new(&registry).generate_build_actions(&session) {
    EmitOutcome::Written { path } => print_success(&format!("Wrote {}", path.display())),
    EmitOutcome::Unchanged { path } => print_info(&format!("{} is up to date", path.display())),
    EmitOutcome::Skipped => print_info("Not embedded in make, nothing to write"),
    EmitOutcome::Aborted => {
      print_errors(&session);
      bail!("Make vars generation aborted");
    }
    EmitOutcome::Failed { path } => {
      print_errors(&session);
      bail!("Failed to write {}", path.display());
    }
  }

  Ok(())
}
