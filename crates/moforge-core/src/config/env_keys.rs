//! Environment variable keys.
//!
//! Primary keys use the `MOFORGE_*` prefix; a few `MO_*` short aliases are
//! accepted for interactive use.

/// Logging
pub mod observability {
    pub const MOFORGE_QUIET: &str = "MOFORGE_QUIET";
    pub const QUIET_ALIASES: &[&str] = &["MO_QUIET"];

    pub const MOFORGE_LOG_LEVEL: &str = "MOFORGE_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["MO_LOG_LEVEL"];

    pub const MOFORGE_LOG_JSON: &str = "MOFORGE_LOG_JSON";
    pub const LOG_JSON_ALIASES: &[&str] = &["MO_LOG_JSON"];
}

/// Python toolchain used by `bootstrap` and `package`
pub mod toolchain {
    /// Interpreter override; otherwise python3/python from PATH.
    pub const MOFORGE_PYTHON: &str = "MOFORGE_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["MO_PYTHON"];

    /// Package manager installed into a private target dir (default `uv`).
    pub const MOFORGE_SIDELOAD_TOOL: &str = "MOFORGE_SIDELOAD_TOOL";

    /// Packager module run with `python -m` (default `PyInstaller`).
    pub const MOFORGE_PACKAGER: &str = "MOFORGE_PACKAGER";
}

/// Project scaffolding and interaction
pub mod paths {
    pub const MOFORGE_TEMPLATES_DIR: &str = "MOFORGE_TEMPLATES_DIR";
    pub const MOFORGE_ASSUME_YES: &str = "MOFORGE_ASSUME_YES";
}
