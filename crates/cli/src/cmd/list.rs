//! List command implementation.
//!
//! Displays every variable the providers export, in emission order.

use anyhow::{Result, bail};
use owo_colors::{OwoColorize, Stream};

use makevars_lib::emit::MakeVarsSingleton;
use makevars_lib::session::BuildContext;

use super::{PassArgs, prepare, print_errors};
use crate::output::{format_policies, print_json, print_stat, symbols};

pub fn cmd_list(args: &PassArgs, verbose: bool, json: bool) -> Result<()> {
  let (session, registry) = prepare(args)?;

  let vars = MakeVarsSingleton::new(&registry).collect(&session);
  if session.failed() {
    print_errors(&session);
    bail!("Providers reported errors");
  }

  if json {
    return print_json(&vars);
  }

  for var in &vars {
    let policies = format!("({})", format_policies(var.is_strict(), var.is_sorted()));
    println!(
      "{} {} {}",
      symbols::INFO,
      var,
      policies.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }

  if verbose {
    println!();
    print_stat("Providers", &registry.len().to_string());
    print_stat("Strict", &vars.iter().filter(|v| v.is_strict()).count().to_string());
    print_stat("Checked", &vars.iter().filter(|v| !v.is_strict()).count().to_string());
  }

  Ok(())
}
