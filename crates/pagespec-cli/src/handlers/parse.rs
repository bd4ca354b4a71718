//! Parse command handler

use super::{build_reader, project_config};
use crate::commands::{OutputFormat, ParseArgs};
use crate::error::CliResult;
use crate::output::spec_outline;
use pagespec::{JsonPage, Page, PageSpec};

/// Compile the spec, optionally against a page snapshot
pub fn parse(args: &ParseArgs) -> CliResult<PageSpec> {
    let project = project_config(&args.input)?;
    let page = args.page.as_deref().map(JsonPage::load).transpose()?;
    let reader = build_reader(&args.input, &project);
    let spec = reader.read(&args.input.spec, page.as_ref().map(|p| p as &dyn Page))?;
    tracing::info!(
        objects = spec.objects.len(),
        sections = spec.sections.len(),
        "compiled {}",
        args.input.spec.display()
    );
    Ok(spec)
}

/// Execute the parse command
pub fn execute_parse(args: &ParseArgs) -> CliResult<()> {
    let spec = parse(args)?;
    match args.format {
        OutputFormat::Text => print!("{}", spec_outline(&spec)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&spec)?),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::SpecInput;
    use crate::error::CliError;
    use tempfile::TempDir;

    fn args(dir: &TempDir, spec: &str, page: Option<&str>) -> ParseArgs {
        std::fs::write(dir.path().join("home.spec"), spec).unwrap();
        let page = page.map(|json| {
            let path = dir.path().join("home.json");
            std::fs::write(&path, json).unwrap();
            path
        });
        ParseArgs {
            input: SpecInput {
                spec: dir.path().join("home.spec"),
                properties: Vec::new(),
                config: None,
            },
            page,
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn test_parse_without_page() {
        let dir = TempDir::new().unwrap();
        let spec = parse(&args(&dir, "===\nlogo id logo\n===\n@ Main\nlogo\n    visible\n", None))
            .unwrap();
        assert_eq!(spec.objects.len(), 1);
        assert_eq!(spec.sections[0].name, "Main");
    }

    #[test]
    fn test_parse_expands_groups_with_page() {
        let dir = TempDir::new().unwrap();
        let page = r#"{"elements": [
            {"kind": "css", "selector": "li", "rect": {"x": 0, "y": 0, "width": 10, "height": 10}},
            {"kind": "css", "selector": "li", "rect": {"x": 0, "y": 20, "width": 10, "height": 10}}
        ]}"#;
        let spec = parse(&args(&dir, "===\nitem-* css li\n===\n", Some(page))).unwrap();
        assert_eq!(
            spec.objects.keys().collect::<Vec<_>>(),
            vec!["item-1", "item-2"]
        );
    }

    #[test]
    fn test_parse_error_keeps_place() {
        let dir = TempDir::new().unwrap();
        let err = parse(&args(&dir, "@ Main\n    width: 100px\n", None)).unwrap_err();
        let CliError::Spec(spec_error) = err else {
            panic!("expected spec error");
        };
        assert_eq!(spec_error.line(), Some(1));
    }
}
