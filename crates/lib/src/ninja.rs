//! Deferred expression parsing and evaluation.
//!
//! Provider values are written as ninja strings: literal text with references
//! to variables declared in a [`Namespace`] or in the session-wide globals.
//! Evaluation expands every reference and returns text that is still valid
//! ninja, i.e. escapes are kept in their escaped form. Turning that into a
//! makefile literal is the export context's job.
//!
//! # Syntax
//!
//! - `$name` / `${name}` - reference a variable (`name` is `[A-Za-z0-9_-]`,
//!   braces additionally allow `.`)
//! - `$$` - a literal `$`
//! - `$ ` and `$:` - an escaped space / colon, kept as written
//! - `$` followed by a newline - line continuation, the newline and the
//!   indentation that follows are dropped
//!
//! # Example
//!
//! ```
//! use makevars_lib::ninja::{Namespace, NamespaceScope, eval};
//! use std::collections::BTreeMap;
//!
//! let ns = Namespace::new("cc")
//!   .with_variable("ClangVersion", "r487747")
//!   .with_variable("ClangPath", "prebuilts/clang/${ClangVersion}");
//! let globals = BTreeMap::new();
//!
//! let out = eval("$ClangPath/bin $$HOME", &NamespaceScope::new(&ns, &globals)).unwrap();
//! assert_eq!(out, "prebuilts/clang/r487747/bin $$HOME");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named set of deferred variable definitions.
///
/// Every provider is registered against one namespace; expressions it
/// evaluates resolve their references here first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
  name: String,
  variables: BTreeMap<String, String>,
}

impl Namespace {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      variables: BTreeMap::new(),
    }
  }

  /// Declare a variable. The value is itself a ninja string.
  pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.variables.insert(name.into(), value.into());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn variable(&self, name: &str) -> Option<&str> {
    self.variables.get(name).map(|s| s.as_str())
  }

  pub fn variables(&self) -> &BTreeMap<String, String> {
    &self.variables
  }
}

/// A parsed piece of a ninja string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text, escapes preserved.
  Literal(String),
  /// A variable reference.
  Variable(String),
}

/// Errors raised while parsing or evaluating a ninja string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
  #[error("unclosed '${{' at position {0}")]
  Unclosed(usize),

  #[error("empty variable name at position {0}")]
  EmptyName(usize),

  #[error("invalid character '{ch}' in variable name at position {pos}")]
  InvalidName { pos: usize, ch: char },

  #[error("invalid '$' escape at position {0}")]
  InvalidEscape(usize),

  #[error("undefined variable '{name}' in namespace '{namespace}'")]
  Undefined { name: String, namespace: String },

  #[error("variable '{0}' references itself")]
  Cycle(String),
}

/// Variable lookup used during evaluation.
pub trait Scope {
  /// Name reported in errors.
  fn name(&self) -> &str;

  /// Raw (unevaluated) value of a variable.
  fn lookup(&self, name: &str) -> Option<&str>;
}

/// Resolves against a namespace, then the session globals.
pub struct NamespaceScope<'a> {
  namespace: &'a Namespace,
  globals: &'a BTreeMap<String, String>,
}

impl<'a> NamespaceScope<'a> {
  pub fn new(namespace: &'a Namespace, globals: &'a BTreeMap<String, String>) -> Self {
    Self { namespace, globals }
  }
}

impl Scope for NamespaceScope<'_> {
  fn name(&self) -> &str {
    self.namespace.name()
  }

  fn lookup(&self, name: &str) -> Option<&str> {
    self
      .namespace
      .variable(name)
      .or_else(|| self.globals.get(name).map(|s| s.as_str()))
  }
}

fn is_simple_name_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_braced_name_char(c: char) -> bool {
  is_simple_name_char(c) || c == '.'
}

/// Parse a ninja string into segments.
///
/// # Errors
///
/// Returns an error for an unclosed `${`, an empty or malformed variable name,
/// or a `$` followed by a character that is not a valid escape.
pub fn parse(input: &str) -> Result<Vec<Segment>, EvalError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek().copied() {
      Some((_, '$')) | Some((_, ' ')) | Some((_, ':')) => {
        literal.push('$');
        if let Some((_, c)) = chars.next() {
          literal.push(c);
        }
      }
      Some((_, '\n')) => {
        chars.next();
        while chars.next_if(|(_, c)| *c == ' ').is_some() {}
      }
      Some((_, '{')) => {
        chars.next();
        let mut name = String::new();
        let mut closed = false;
        for (p, c) in chars.by_ref() {
          if c == '}' {
            closed = true;
            break;
          }
          if !is_braced_name_char(c) {
            return Err(EvalError::InvalidName { pos: p, ch: c });
          }
          name.push(c);
        }
        if !closed {
          return Err(EvalError::Unclosed(pos));
        }
        if name.is_empty() {
          return Err(EvalError::EmptyName(pos));
        }
        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Variable(name));
      }
      Some((_, c)) if is_simple_name_char(c) => {
        let mut name = String::new();
        while let Some((_, c)) = chars.next_if(|(_, c)| is_simple_name_char(*c)) {
          name.push(c);
        }
        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Variable(name));
      }
      _ => return Err(EvalError::InvalidEscape(pos)),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Evaluate a ninja string against a scope.
///
/// Referenced values are evaluated recursively. The result keeps ninja
/// escapes, so `$$` stays `$$`.
///
/// # Errors
///
/// Returns an error if parsing fails, a reference is undefined, or a
/// variable (transitively) references itself.
pub fn eval(input: &str, scope: &impl Scope) -> Result<String, EvalError> {
  let mut stack = Vec::new();
  eval_inner(input, scope, &mut stack)
}

fn eval_inner(input: &str, scope: &impl Scope, stack: &mut Vec<String>) -> Result<String, EvalError> {
  let mut result = String::with_capacity(input.len());

  for segment in parse(input)? {
    match segment {
      Segment::Literal(s) => result.push_str(&s),
      Segment::Variable(name) => {
        if stack.contains(&name) {
          return Err(EvalError::Cycle(name));
        }
        let raw = scope.lookup(&name).ok_or_else(|| EvalError::Undefined {
          name: name.clone(),
          namespace: scope.name().to_string(),
        })?;
        stack.push(name);
        let value = eval_inner(raw, scope, stack)?;
        stack.pop();
        result.push_str(&value);
      }
    }
  }

  Ok(result)
}
