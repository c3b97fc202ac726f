//! Check command implementation.
//!
//! Compares every exported variable against the value of the same-named
//! environment variable, the way the generated makefile compares against
//! make's own value. A value adopted by one record is what later records of
//! the same name are compared against. A strict mismatch fails the command;
//! a checked mismatch only warns.

use anyhow::{Result, bail};

use makevars_lib::emit::MakeVarsSingleton;
use makevars_lib::session::BuildContext;
use makevars_lib::variable::{Comparison, compare_all};

use super::{PassArgs, prepare, print_errors};
use crate::output::{print_info, print_json, print_stat, print_success, print_warning};

pub fn cmd_check(args: &PassArgs, verbose: bool, json: bool) -> Result<()> {
  let (session, registry) = prepare(args)?;

  let vars = MakeVarsSingleton::new(&registry).collect(&session);
  if session.failed() {
    print_errors(&session);
    bail!("Providers reported errors");
  }

  let results = compare_all(&vars, |name| std::env::var(name).unwrap_or_default());

  let strict_failures = results
    .iter()
    .filter(|(var, _, c)| var.is_strict() && c.is_mismatch())
    .count();
  let warnings = results
    .iter()
    .filter(|(var, _, c)| !var.is_strict() && c.is_mismatch())
    .count();

  if json {
    let items: Vec<_> = results
      .iter()
      .map(|(var, legacy, comparison)| {
        let status = match comparison {
          Comparison::Adopt => "adopt",
          Comparison::Match => "match",
          Comparison::Mismatch(_) => "mismatch",
        };
        serde_json::json!({
          "name": var.name(),
          "strict": var.is_strict(),
          "sort": var.is_sorted(),
          "status": status,
          "make": legacy,
          "soong": var.value(),
        })
      })
      .collect();
    print_json(&serde_json::json!({
      "variables": items,
      "strict_failures": strict_failures,
      "warnings": warnings,
    }))?;
  } else {
    for (var, _, comparison) in &results {
      match comparison {
        Comparison::Mismatch(mismatch) => {
          print_warning(&format!("{} does not match between Make and Soong:", var.name()));
          for line in mismatch.to_string().lines() {
            print_warning(line);
          }
        }
        Comparison::Match if verbose => print_success(var.name()),
        Comparison::Adopt if verbose => print_info(&format!("{} := {} (adopted)", var.name(), var.value())),
        _ => {}
      }
    }

    println!();
    print_stat("Variables", &results.len().to_string());
    print_stat("Strict failures", &strict_failures.to_string());
    print_stat("Warnings", &warnings.to_string());
  }

  if strict_failures > 0 {
    bail!("Soong variable check failed");
  }
  Ok(())
}
