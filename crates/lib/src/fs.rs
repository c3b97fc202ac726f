//! Filesystem access for providers.
//!
//! Providers only see the source tree through [`FileSystem`]. Globbing
//! reports, next to the matches, every directory it had to list so the
//! caller can register them as dependencies: adding a matching file to one
//! of them must rerun the pass, adding one anywhere else must not.

use std::io;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern, PatternError};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while globbing.
#[derive(Debug, Error)]
pub enum GlobError {
  #[error("invalid glob pattern '{pattern}': {source}")]
  Pattern {
    pattern: String,
    #[source]
    source: PatternError,
  },

  #[error("glob pattern '{0}' must be relative to the source root")]
  Absolute(String),

  #[error("failed to walk {path}: {message}")]
  Walk { path: PathBuf, message: String },
}

/// Matches of a glob plus the directories it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobResult {
  /// Matching paths, relative to the source root, `/`-separated and sorted.
  pub matches: Vec<String>,
  /// Directories that were listed, relative to the source root.
  pub deps: Vec<String>,
}

/// Read-only view of the source tree.
pub trait FileSystem {
  /// Root all relative paths are resolved against.
  fn root(&self) -> &Path;

  fn exists(&self, path: &Path) -> bool;

  fn read_to_string(&self, path: &Path) -> io::Result<String>;

  /// List files matching `pattern` and none of `excludes`.
  fn glob(&self, pattern: &str, excludes: &[String]) -> Result<GlobResult, GlobError>;
}

/// [`FileSystem`] backed by the real filesystem.
#[derive(Debug, Clone)]
pub struct OsFs {
  root: PathBuf,
}

impl OsFs {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    let root = dunce::canonicalize(&root).unwrap_or(root);
    Self { root }
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

fn has_wildcard(s: &str) -> bool {
  s.contains(['*', '?', '['])
}

/// Longest leading run of path components without wildcards.
fn static_prefix(pattern: &str) -> PathBuf {
  let mut prefix = PathBuf::new();
  let components: Vec<&str> = pattern.split('/').collect();
  for component in &components[..components.len().saturating_sub(1)] {
    if has_wildcard(component) {
      break;
    }
    prefix.push(component);
  }
  prefix
}

/// `/`-separated form of a path relative to `root`.
fn relative_slash(root: &Path, path: &Path) -> String {
  path
    .strip_prefix(root)
    .unwrap_or(path)
    .components()
    .filter_map(|c| match c {
      Component::Normal(s) => Some(s.to_string_lossy().to_string()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}

fn compile(pattern: &str) -> Result<Pattern, GlobError> {
  Pattern::new(pattern).map_err(|source| GlobError::Pattern {
    pattern: pattern.to_string(),
    source,
  })
}

impl FileSystem for OsFs {
  fn root(&self) -> &Path {
    &self.root
  }

  fn exists(&self, path: &Path) -> bool {
    self.resolve(path).exists()
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(self.resolve(path))
  }

  fn glob(&self, pattern: &str, excludes: &[String]) -> Result<GlobResult, GlobError> {
    if Path::new(pattern).is_absolute() {
      return Err(GlobError::Absolute(pattern.to_string()));
    }

    let matcher = compile(pattern)?;
    let excludes = excludes.iter().map(|e| compile(e)).collect::<Result<Vec<_>, _>>()?;
    let is_excluded = |rel: &str| excludes.iter().any(|e| e.matches_with(rel, MATCH_OPTIONS));

    let mut result = GlobResult::default();

    if !has_wildcard(pattern) {
      let parent = Path::new(pattern).parent().unwrap_or(Path::new(""));
      result.deps.push(relative_slash(Path::new(""), parent));
      if self.root.join(pattern).exists() && !is_excluded(pattern) {
        result.matches.push(pattern.to_string());
      }
      return Ok(result);
    }

    let prefix = static_prefix(pattern);
    let base = self.root.join(&prefix);
    if !base.is_dir() {
      result.deps.push(relative_slash(&self.root, &base));
      return Ok(result);
    }

    // Without `**` a match sits exactly `depth` levels below the base, and
    // only the directories above that level are listed.
    let depth = if pattern.contains("**") {
      usize::MAX
    } else {
      pattern.split('/').count().saturating_sub(prefix.components().count())
    };

    for entry in WalkDir::new(&base).max_depth(depth).sort_by_file_name() {
      let entry = entry.map_err(|e| GlobError::Walk {
        path: base.clone(),
        message: e.to_string(),
      })?;
      let rel = relative_slash(&self.root, entry.path());

      if entry.file_type().is_dir() && entry.depth() < depth {
        result.deps.push(rel.clone());
      }
      if entry.path() == base || rel.is_empty() {
        continue;
      }
      if matcher.matches_with(&rel, MATCH_OPTIONS) && !is_excluded(&rel) {
        result.matches.push(rel);
      }
    }

    result.matches.sort();
    Ok(result)
  }
}
