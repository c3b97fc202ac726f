//! Exported make variables.
//!
//! A [`MakeVar`] is one record produced by a provider: the variable name, its
//! fully resolved value, and the two policies that decide how the generated
//! makefile treats a pre-existing legacy value of the same name.
//!
//! [`MakeVar::compare`] reproduces, on the Rust side, the decision the
//! generated `soong-compare-var` macro takes inside make. It backs the CLI's
//! `check` command and keeps the macro semantics testable without running make.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

/// A single exported variable.
///
/// Records are immutable once built. `strict` and `sort` are fixed by the
/// contribution method that created the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakeVar {
  name: String,
  value: String,
  strict: bool,
  sort: bool,
}

impl MakeVar {
  pub fn new(name: impl Into<String>, value: impl Into<String>, strict: bool, sort: bool) -> Self {
    Self {
      name: name.into(),
      value: value.into(),
      strict,
      sort,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn value(&self) -> &str {
    &self.value
  }

  /// Mismatch against the legacy value fails the build.
  pub fn is_strict(&self) -> bool {
    self.strict
  }

  /// Values are compared as unordered whitespace-separated sets.
  pub fn is_sorted(&self) -> bool {
    self.sort
  }

  /// Name of the internal make variable that carries the bridged value.
  pub fn soong_name(&self) -> String {
    format!("{}{}", crate::consts::SOONG_PREFIX, self.name)
  }

  /// Compare this record against the value the legacy build already holds.
  ///
  /// Mirrors the generated macro: an empty legacy value is adopted, otherwise
  /// both sides are compared (as sorted sets when `sort` is set, after
  /// trimming the legacy side otherwise).
  pub fn compare(&self, legacy: &str) -> Comparison {
    if legacy.is_empty() {
      return Comparison::Adopt;
    }

    if self.sort {
      let make = sorted_words(legacy);
      let soong = sorted_words(&self.value);
      if make == soong {
        return Comparison::Match;
      }
      let (make_adds, soong_adds) = sorted_diff(legacy, &self.value);
      return Comparison::Mismatch(Mismatch::Sorted { make_adds, soong_adds });
    }

    let make = legacy.trim();
    if make == self.value {
      Comparison::Match
    } else {
      Comparison::Mismatch(Mismatch::Exact {
        make: make.to_string(),
        soong: self.value.clone(),
      })
    }
  }
}

impl fmt::Display for MakeVar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} := {}", self.name, self.value)
  }
}

/// Outcome of comparing a bridged value with the legacy one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
  /// Legacy value was empty; the bridged value is adopted.
  Adopt,
  /// Both sides agree.
  Match,
  /// Both sides are set and differ.
  Mismatch(Mismatch),
}

impl Comparison {
  pub fn is_mismatch(&self) -> bool {
    matches!(self, Comparison::Mismatch(_))
  }
}

/// The representation printed for a mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
  /// Full values of both sides.
  Exact { make: String, soong: String },
  /// Only the elements present on one side and missing on the other.
  Sorted {
    make_adds: Vec<String>,
    soong_adds: Vec<String>,
  },
}

impl fmt::Display for Mismatch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Mismatch::Exact { make, soong } => write!(f, "Make : {}\nSoong: {}", make, soong),
      Mismatch::Sorted { make_adds, soong_adds } => {
        write!(f, "Make  adds: {}\nSoong adds: {}", make_adds.join(" "), soong_adds.join(" "))
      }
    }
  }
}

/// Compare every record the way the generated fragment does, in its
/// evaluation order: strict records first, then checked ones.
///
/// `legacy` supplies the value make holds before the fragment runs. Once a
/// record is adopted, later records with the same name compare against the
/// adopted value instead.
pub fn compare_all<'a>(
  vars: &'a [MakeVar],
  mut legacy: impl FnMut(&str) -> String,
) -> Vec<(&'a MakeVar, String, Comparison)> {
  let mut adopted: BTreeMap<&str, String> = BTreeMap::new();
  let mut results = Vec::with_capacity(vars.len());

  for var in vars.iter().filter(|v| v.is_strict()).chain(vars.iter().filter(|v| !v.is_strict())) {
    let current = match adopted.get(var.name()) {
      Some(value) => value.clone(),
      None => legacy(var.name()),
    };
    let comparison = var.compare(&current);
    if comparison == Comparison::Adopt {
      adopted.insert(var.name(), var.value().to_string());
    }
    results.push((var, current, comparison));
  }

  results
}

fn sorted_words(value: &str) -> BTreeSet<&str> {
  value.split_whitespace().collect()
}

/// Asymmetric difference of two whitespace-separated word lists.
///
/// Returns `(only_in_make, only_in_soong)`, each sorted and deduplicated like
/// make's `$(sort)` followed by `$(filter-out)`.
pub fn sorted_diff(make: &str, soong: &str) -> (Vec<String>, Vec<String>) {
  let make = sorted_words(make);
  let soong = sorted_words(soong);
  let make_adds = make.difference(&soong).map(|s| s.to_string()).collect();
  let soong_adds = soong.difference(&make).map(|s| s.to_string()).collect();
  (make_adds, soong_adds)
}
