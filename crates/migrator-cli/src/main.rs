use clap::Parser;
use migrator_core::{NameStyle, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "annotation-migrator",
    about = "Rewrite Serenity and Allure1 test annotations as JUnit5 and Allure2 ones"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: SharedOptions,
}

#[derive(clap::Args, Debug, Default)]
struct SharedOptions {
    /// Migrations to run (junit5, allure, all)
    #[arg(long, global = true)]
    profile: Option<Profile>,

    /// Generated annotation names (short, qualified)
    #[arg(long, global = true)]
    style: Option<NameStyle>,

    /// Report changes without writing them
    #[arg(long, global = true)]
    dry_run: bool,

    /// JSON file with default options; flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Migrate one Java file
    Class {
        /// The Java source file
        file: PathBuf,

        /// Only migrate the class with this name
        #[arg(long)]
        class: Option<String>,

        /// Project root (defaults to the file's directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Migrate every test class under a project root
    Project {
        /// Path to the project root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Class name suffix that marks a test class
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Plan migrations for declarations given as JSON ("-" reads stdin)
    Plan { declarations: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the JSON report.
    let level = if cli.options.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let report = match cli.command {
        Commands::Class { file, class, root } => {
            commands::migrate_file(&cli.options, &file, class, root.as_deref())?
        }
        Commands::Project { root, suffix } => {
            commands::migrate_project(&cli.options, &root, suffix)?
        }
        Commands::Plan { declarations } => commands::plan(&cli.options, &declarations)?,
    };

    println!("{}", serde_json::to_string_pretty(&report.json)?);
    if let Some(failure) = report.failure {
        return Err(failure.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class_command() {
        let cli = Cli::try_parse_from([
            "annotation-migrator",
            "class",
            "src/LoginTest.java",
            "--class",
            "LoginTest",
            "--profile",
            "junit5",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.options.profile, Some(Profile::Junit5));
        assert!(cli.options.dry_run);
        match cli.command {
            Commands::Class { file, class, root } => {
                assert_eq!(file, PathBuf::from("src/LoginTest.java"));
                assert_eq!(class.as_deref(), Some("LoginTest"));
                assert!(root.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_project_defaults() {
        let cli = Cli::try_parse_from(["annotation-migrator", "project", "--style", "qualified"])
            .unwrap();
        assert_eq!(cli.options.style, Some(NameStyle::Qualified));
        match cli.command {
            Commands::Project { root, suffix } => {
                assert_eq!(root, PathBuf::from("."));
                assert!(suffix.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_profile_is_rejected() {
        assert!(Cli::try_parse_from(["annotation-migrator", "project", "--profile", "testng"]).is_err());
    }
}
