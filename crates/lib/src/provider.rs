//! Provider registration.
//!
//! Providers are registered once at startup, each against the namespace its
//! expressions are evaluated in, and run once per build pass in registration
//! order. There is no way to unregister a provider and duplicate registrations
//! all run.

use std::fmt;
use std::sync::Arc;

use crate::context::MakeVarsContext;
use crate::ninja::Namespace;

/// A function that contributes make variables.
pub type MakeVarsProvider = Box<dyn Fn(&mut dyn MakeVarsContext)>;

/// An object that contributes make variables, typically a build singleton
/// that also produces build actions.
pub trait SingletonMakeVarsProvider {
  /// Provide extra values to be exported to make.
  fn make_vars(&self, ctx: &mut dyn MakeVarsContext);
}

/// Adapt a [`SingletonMakeVarsProvider`] into a plain provider function.
pub fn singleton_provider_adapter<S>(singleton: Arc<S>) -> MakeVarsProvider
where
  S: SingletonMakeVarsProvider + ?Sized + 'static,
{
  Box::new(move |ctx: &mut dyn MakeVarsContext| singleton.make_vars(ctx))
}

/// A registered provider and the namespace it evaluates against.
pub struct ProviderEntry {
  namespace: Arc<Namespace>,
  call: MakeVarsProvider,
}

impl ProviderEntry {
  pub fn namespace(&self) -> &Namespace {
    &self.namespace
  }

  /// Run the provider against a context.
  pub fn call(&self, ctx: &mut dyn MakeVarsContext) {
    (self.call)(ctx)
  }
}

impl fmt::Debug for ProviderEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ProviderEntry")
      .field("namespace", &self.namespace.name())
      .finish_non_exhaustive()
  }
}

/// Ordered list of registered providers.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
  entries: Vec<ProviderEntry>,
}

impl ProviderRegistry {
  pub fn new() -> Self {
    Self { entries: Vec::new() }
  }

  /// Register a provider function.
  pub fn register<F>(&mut self, namespace: Arc<Namespace>, provider: F)
  where
    F: Fn(&mut dyn MakeVarsContext) + 'static,
  {
    self.entries.push(ProviderEntry {
      namespace,
      call: Box::new(provider),
    });
  }

  /// Register an object implementing [`SingletonMakeVarsProvider`].
  pub fn register_singleton<S>(&mut self, namespace: Arc<Namespace>, singleton: Arc<S>)
  where
    S: SingletonMakeVarsProvider + ?Sized + 'static,
  {
    self.entries.push(ProviderEntry {
      namespace,
      call: singleton_provider_adapter(singleton),
    });
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &ProviderEntry> {
    self.entries.iter()
  }
}
