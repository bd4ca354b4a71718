//! Check command handler

use super::{build_reader, project_config};
use crate::commands::{CheckArgs, OutputFormat};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Renderer;
use pagespec::{JsonPage, ValidationReport, Validator};

/// Compile the spec and validate it against the page snapshot
pub fn check(args: &CheckArgs) -> CliResult<ValidationReport> {
    let project = project_config(&args.input)?;
    let page = JsonPage::load(&args.page)?;
    let reader = build_reader(&args.input, &project);
    let spec = reader.read(&args.input.spec, Some(&page))?;

    let tags: &[String] = if args.tags.is_empty() {
        &project.tags
    } else {
        &args.tags
    };
    tracing::info!(
        spec = %args.input.spec.display(),
        sections = spec.find_sections(tags).len(),
        ?tags,
        "validating"
    );
    Ok(Validator::new(&spec, &page)
        .with_config(project.validation)
        .with_reader(&reader)
        .validate(tags))
}

/// Execute the check command
pub fn execute_check(config: &CliConfig, args: &CheckArgs) -> CliResult<()> {
    let report = check(args)?;
    match args.format {
        OutputFormat::Text => {
            let renderer =
                Renderer::new(config.color.should_color(), config.verbosity.is_quiet());
            print!("{}", renderer.report(&report));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.passed() {
        Ok(())
    } else {
        Err(CliError::validation_failed(
            report.failure_count() + report.missing_count(),
            report.results.len(),
        ))
    }
}
