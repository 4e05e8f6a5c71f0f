//! moforge CLI library: argument parsing and dispatch to `moforge-commands`.

mod cli;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use cli::{Cli, Commands};
use moforge_commands::build::{cmd_bootstrap, cmd_package, PackageOptions};
use moforge_commands::init::cmd_init;
use moforge_commands::task::{cmd_add, cmd_delete, cmd_move};
use moforge_commands::templates::Templates;
use moforge_commands::validate::cmd_validate;
use moforge_core::config::{PathsConfig, ToolchainConfig};
use moforge_core::project::{AssumeYes, Confirm};
use moforge_env::SystemRunner;
use moforge_fs::StdinConfirm;

/// Exit status for a clap parse outcome: 0 for help and version, 1 for any
/// usage error.
fn usage_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Parse arguments and run the selected command.
///
/// Usage errors print clap's message and exit with status 1; `--help` and
/// `--version` exit with 0.
pub fn run_cli() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(e.kind()));
        }
    };
    moforge_core::observability::init_tracing();

    let paths = PathsConfig::from_env();
    let templates = Templates::from_config(&paths);
    let mut confirm: Box<dyn Confirm> = if cli.yes || paths.assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    };
    let base = cli.dir.as_path();
    tracing::debug!(command = ?cli.command, dir = %base.display(), "dispatch");

    match cli.command {
        Commands::Init { model } => {
            cmd_init(base, &model, &templates, confirm.as_mut())?;
        }
        Commands::Add { pos, name } => {
            cmd_add(base, &pos, &name, &templates, confirm.as_mut())?;
        }
        Commands::Delete { pos } => {
            cmd_delete(base, &pos, &templates, confirm.as_mut())?;
        }
        Commands::Move { from, to } => {
            cmd_move(base, &from, &to, &templates, confirm.as_mut())?;
        }
        Commands::Validate { json } => {
            cmd_validate(base, json)?;
        }
        Commands::Bootstrap { venv } => {
            let toolchain = ToolchainConfig::from_env();
            cmd_bootstrap(&SystemRunner, &toolchain, base, &venv)?;
        }
        Commands::Package {
            entry,
            requirements,
            dist,
        } => {
            let toolchain = ToolchainConfig::from_env();
            let opts = PackageOptions {
                entry,
                requirements,
                dist,
            };
            cmd_package(&SystemRunner, &toolchain, base, &opts)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_with_one() {
        assert_eq!(usage_exit_code(ErrorKind::MissingRequiredArgument), 1);
        assert_eq!(usage_exit_code(ErrorKind::UnknownArgument), 1);
        assert_eq!(usage_exit_code(ErrorKind::InvalidSubcommand), 1);
    }

    #[test]
    fn test_help_and_version_exit_with_zero() {
        assert_eq!(usage_exit_code(ErrorKind::DisplayHelp), 0);
        assert_eq!(usage_exit_code(ErrorKind::DisplayVersion), 0);
    }

    #[test]
    fn test_bootstrap_argument_count_maps_to_one() {
        for args in [&["mo", "bootstrap"][..], &["mo", "bootstrap", "a", "b"][..]] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(usage_exit_code(err.kind()), 1);
            assert!(err.to_string().contains("Usage:"));
        }
    }
}
