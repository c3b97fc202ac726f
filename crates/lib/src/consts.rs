/// Default name of the configuration file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "makevars.toml";

/// Stem of the generated makefile fragment (`make_vars<suffix>.mk`).
pub const OUTPUT_STEM: &str = "make_vars";

/// Extension of the generated makefile fragment.
pub const OUTPUT_EXT: &str = "mk";

/// Prefix of the internal make variable holding the bridged value.
pub const SOONG_PREFIX: &str = "SOONG_";

/// Namespace the bridge's own provider evaluates against.
pub const CORE_NAMESPACE: &str = "android";

/// Environment variable overriding `out_dir` from the config file.
pub const OUT_DIR_ENV: &str = "MAKEVARS_OUT_DIR";

/// Environment variable overriding `make_suffix` from the config file.
pub const MAKE_SUFFIX_ENV: &str = "MAKEVARS_MAKE_SUFFIX";
