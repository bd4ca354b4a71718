//! Pagespec CLI: compile layout specs and check them against page snapshots
//!
//! ## Usage
//!
//! ```bash
//! pagespec check home.spec --page home.json --tags desktop
//! pagespec check home.spec --page home.json -P BASE_WIDTH=1024 --format json
//! pagespec parse home.spec --format json
//! ```

use clap::Parser;
use pagespec_cli::{handlers, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::Check(args) => handlers::execute_check(&config, &args),
        Commands::Parse(args) => handlers::execute_parse(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();
    console::set_colors_enabled(color.should_color());

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by -v/-q
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("pagespec").chain(args.iter().copied()))
    }

    #[test]
    fn test_build_config_verbosity() {
        assert_eq!(
            build_config(&cli(&["parse", "a.spec"])).verbosity,
            Verbosity::Normal
        );
        assert_eq!(
            build_config(&cli(&["-v", "parse", "a.spec"])).verbosity,
            Verbosity::Verbose
        );
        assert_eq!(
            build_config(&cli(&["-vvv", "parse", "a.spec"])).verbosity,
            Verbosity::Debug
        );
        assert_eq!(
            build_config(&cli(&["-q", "-v", "parse", "a.spec"])).verbosity,
            Verbosity::Quiet
        );
    }

    #[test]
    fn test_build_config_color() {
        let config = build_config(&cli(&["--color", "never", "parse", "a.spec"]));
        assert_eq!(config.color, ColorChoice::Never);
    }
}
