//! Providers shipped with the bridge itself.

use std::sync::Arc;

use crate::consts::CORE_NAMESPACE;
use crate::context::MakeVarsContext;
use crate::ninja::Namespace;
use crate::provider::{ProviderRegistry, SingletonMakeVarsProvider};

/// Exports the core platform variables every build needs.
#[derive(Debug, Default)]
pub struct CoreMakeVarsProvider;

impl SingletonMakeVarsProvider for CoreMakeVarsProvider {
  fn make_vars(&self, ctx: &mut dyn MakeVarsContext) {
    let min_sdk = ctx.config().min_supported_sdk_version.to_string();
    ctx.strict("MIN_SUPPORTED_SDK_VERSION", &min_sdk);
  }
}

/// Register the built-in providers ahead of any user provider.
pub fn register_builtin_providers(registry: &mut ProviderRegistry) {
  registry.register_singleton(Arc::new(Namespace::new(CORE_NAMESPACE)), Arc::new(CoreMakeVarsProvider));
}
