//! makevars-lib: Export of build-graph variables to a legacy make build
//!
//! Providers register once at startup against a ninja expression namespace.
//! Every build pass runs them, collects the variables they export and renders
//! a makefile fragment that compares each value against the one make already
//! holds:
//! - `MakeVar`: one exported variable with its strict/sort policies
//! - `ExportContext`: the per-provider contribution API
//! - `ProviderRegistry`: ordered provider registrations
//! - `MakeVarsSingleton`: the pass that collects, renders and writes
//!   `make_vars<suffix>.mk`

pub mod builtin;
pub mod config;
pub mod consts;
pub mod context;
pub mod emit;
pub mod fs;
pub mod lua;
pub mod module;
pub mod ninja;
pub mod provider;
pub mod session;
pub mod variable;
