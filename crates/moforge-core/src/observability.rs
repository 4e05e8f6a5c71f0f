//! Observability: tracing init.
//!
//! Uses `config::ObservabilityConfig` for MOFORGE_QUIET, MOFORGE_LOG_LEVEL and
//! MOFORGE_LOG_JSON. `RUST_LOG` wins over all of them when set.

use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize tracing. Call at process startup; later calls are no-ops.
/// When MOFORGE_QUIET=1, only WARN and above are logged.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = filter_directive(cfg);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn filter_directive(cfg: &ObservabilityConfig) -> String {
    if cfg.quiet {
        "moforge=warn,moforge_core=warn,moforge_env=warn,moforge_fs=warn,moforge_commands=warn"
            .to_string()
    } else {
        cfg.log_level.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_overrides_level() {
        let cfg = ObservabilityConfig {
            quiet: true,
            log_level: "debug".to_string(),
            log_json: false,
        };
        assert!(filter_directive(&cfg).starts_with("moforge=warn"));

        let cfg = ObservabilityConfig {
            quiet: false,
            ..cfg
        };
        assert_eq!(filter_directive(&cfg), "debug");
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
