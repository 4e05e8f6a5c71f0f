use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// mo - organize model tasks, bootstrap venvs and package executables
#[derive(Parser, Debug)]
#[command(name = "mo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project directory (the one holding Mo.yaml)
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Answer yes to every confirmation prompt
    #[arg(
        short = 'y',
        long,
        global = true,
        env = "MOFORGE_ASSUME_YES",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new model project under --dir
    Init {
        /// Model name; spaces become underscores in the directory name
        #[arg(long)]
        model: String,
    },

    /// Add a task at a position (e.g. 3 for serial, 3b for parallel)
    Add {
        #[arg(long, value_name = "POS")]
        pos: String,

        /// Task name; also the folder suffix and module name
        #[arg(long)]
        name: String,
    },

    /// Delete the task at a position
    Delete {
        #[arg(long, value_name = "POS")]
        pos: String,
    },

    /// Move a task to another position
    Move {
        #[arg(long, value_name = "POS")]
        from: String,

        #[arg(long, value_name = "POS")]
        to: String,
    },

    /// Check Mo.yaml against the task folders
    Validate {
        /// Print the groups as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create (or reuse) a venv at VENV_PATH and run the build steps in it
    Bootstrap {
        #[arg(value_name = "VENV_PATH")]
        venv: PathBuf,
    },

    /// Build a single-file executable in a throwaway venv
    Package {
        /// Entry-point script (default: build.entry in Mo.yaml)
        #[arg(long, value_name = "FILE")]
        entry: Option<PathBuf>,

        /// Requirements file (default: requirements.txt)
        #[arg(long, value_name = "FILE")]
        requirements: Option<PathBuf>,

        /// Output directory (default: dist)
        #[arg(long, value_name = "DIR")]
        dist: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_bootstrap_takes_exactly_one_path() {
        let cli = Cli::try_parse_from(["mo", "bootstrap", "venv"]).unwrap();
        assert!(matches!(cli.command, Commands::Bootstrap { ref venv } if venv == &PathBuf::from("venv")));

        let none = Cli::try_parse_from(["mo", "bootstrap"]).unwrap_err();
        assert_eq!(none.kind(), ErrorKind::MissingRequiredArgument);
        let two = Cli::try_parse_from(["mo", "bootstrap", "a", "b"]).unwrap_err();
        assert_eq!(two.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mo", "add", "--pos", "2b", "--name", "fit", "--dir", "proj", "-y"])
            .unwrap();
        assert_eq!(cli.dir, PathBuf::from("proj"));
        assert!(cli.yes);
        match cli.command {
            Commands::Add { pos, name } => assert_eq!((pos.as_str(), name.as_str()), ("2b", "fit")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_yes_from_environment() {
        std::env::set_var("MOFORGE_ASSUME_YES", "1");
        let cli = Cli::try_parse_from(["mo", "validate"]);
        std::env::remove_var("MOFORGE_ASSUME_YES");
        assert!(cli.unwrap().yes);
    }

    #[test]
    fn test_package_flags_are_optional() {
        let cli = Cli::try_parse_from(["mo", "package"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Package { entry: None, requirements: None, dist: None }
        ));
    }
}
