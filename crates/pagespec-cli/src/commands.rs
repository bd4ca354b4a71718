//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pagespec: compile page layout specs and check them against page snapshots
#[derive(Parser, Debug)]
#[command(name = "pagespec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only failures and the summary)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a spec against a page snapshot
    Check(CheckArgs),

    /// Compile a spec and print its structure
    Parse(ParseArgs),
}

/// Arguments shared by every command that compiles a spec
#[derive(clap::Args, Debug, Clone)]
pub struct SpecInput {
    /// Spec file to compile
    pub spec: PathBuf,

    /// Property available as ${NAME} in spec text (repeatable)
    #[arg(short = 'P', long = "property", value_name = "NAME=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Project settings file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Spec to compile
    #[command(flatten)]
    pub input: SpecInput,

    /// Page snapshot (JSON)
    #[arg(short, long)]
    pub page: PathBuf,

    /// Tags selecting sections (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the parse command
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Spec to compile
    #[command(flatten)]
    pub input: SpecInput,

    /// Page snapshot used to expand object groups and page functions
    #[arg(short, long)]
    pub page: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for reports
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

fn parse_property(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got \"{text}\"")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_verify_cli() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }

        #[test]
        fn test_parse_check() {
            let cli = Cli::parse_from([
                "pagespec",
                "check",
                "home.spec",
                "--page",
                "home.json",
                "--tags",
                "desktop,wide",
                "-P",
                "WIDTH=120",
                "-P",
                "TITLE=a=b",
            ]);
            let Commands::Check(args) = cli.command else {
                panic!("expected check command");
            };
            assert_eq!(args.input.spec, PathBuf::from("home.spec"));
            assert_eq!(args.page, PathBuf::from("home.json"));
            assert_eq!(args.tags, vec!["desktop", "wide"]);
            assert_eq!(
                args.input.properties,
                vec![
                    ("WIDTH".to_string(), "120".to_string()),
                    ("TITLE".to_string(), "a=b".to_string())
                ]
            );
            assert_eq!(args.format, OutputFormat::Text);
        }

        #[test]
        fn test_parse_parse_command() {
            let cli = Cli::parse_from(["pagespec", "-vv", "parse", "home.spec", "-f", "json"]);
            assert_eq!(cli.verbose, 2);
            let Commands::Parse(args) = cli.command else {
                panic!("expected parse command");
            };
            assert!(args.page.is_none());
            assert_eq!(args.format, OutputFormat::Json);
        }

        #[test]
        fn test_check_requires_page() {
            assert!(Cli::try_parse_from(["pagespec", "check", "home.spec"]).is_err());
        }
    }

    mod property_tests {
        use super::*;

        #[test]
        fn test_valid_property() {
            assert_eq!(
                parse_property("A=1").unwrap(),
                ("A".to_string(), "1".to_string())
            );
            assert_eq!(
                parse_property("EMPTY=").unwrap(),
                ("EMPTY".to_string(), String::new())
            );
        }

        #[test]
        fn test_invalid_property() {
            assert!(parse_property("nope").is_err());
            assert!(parse_property("=1").is_err());
        }
    }
}
