//! Configuration structs grouped by concern, loaded from the environment.

use super::env_keys::{observability as obv_keys, paths, toolchain};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Logging configuration (`MOFORGE_QUIET`, `MOFORGE_LOG_LEVEL`, `MOFORGE_LOG_JSON`).
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::MOFORGE_QUIET, obv_keys::QUIET_ALIASES, false),
                log_level: env_or(
                    obv_keys::MOFORGE_LOG_LEVEL,
                    obv_keys::LOG_LEVEL_ALIASES,
                    || "moforge=info".to_string(),
                ),
                log_json: env_bool(obv_keys::MOFORGE_LOG_JSON, obv_keys::LOG_JSON_ALIASES, false),
            }
        })
    }
}

pub const DEFAULT_SIDELOAD_TOOL: &str = "uv";
pub const DEFAULT_PACKAGER: &str = "PyInstaller";

/// External Python toolchain used by `bootstrap` and `package`.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    /// Explicit interpreter; `None` means look up python3/python on PATH.
    pub python: Option<PathBuf>,
    pub sideload_tool: String,
    pub packager: String,
}

impl ToolchainConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            python: env_optional(toolchain::MOFORGE_PYTHON, toolchain::PYTHON_ALIASES)
                .map(PathBuf::from),
            sideload_tool: env_or(toolchain::MOFORGE_SIDELOAD_TOOL, &[], || {
                DEFAULT_SIDELOAD_TOOL.to_string()
            }),
            packager: env_or(toolchain::MOFORGE_PACKAGER, &[], || DEFAULT_PACKAGER.to_string()),
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            python: None,
            sideload_tool: DEFAULT_SIDELOAD_TOOL.to_string(),
            packager: DEFAULT_PACKAGER.to_string(),
        }
    }
}

/// Scaffolding paths and interaction flags.
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Directory holding template overrides (`build.sh`, `tox.ini`, ...).
    pub templates_dir: Option<PathBuf>,
    /// Answer "yes" to every overwrite/delete/convert confirmation.
    pub assume_yes: bool,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            templates_dir: env_optional(paths::MOFORGE_TEMPLATES_DIR, &[]).map(PathBuf::from),
            assume_yes: env_bool(paths::MOFORGE_ASSUME_YES, &[], false),
        }
    }
}
