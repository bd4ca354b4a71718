//! Report and spec rendering

use console::style;
use pagespec::{ObjectSpecs, Outcome, PageSpec, ValidationReport, ValidationResult};
use std::fmt::Write;

/// Renders reports for a terminal
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Whether to use colors
    pub use_color: bool,
    /// Only show failures, warnings and the summary
    pub quiet: bool,
}

impl Renderer {
    /// Create a renderer
    #[must_use]
    pub const fn new(use_color: bool, quiet: bool) -> Self {
        Self { use_color, quiet }
    }

    /// Render a validation report as text
    #[must_use]
    pub fn report(&self, report: &ValidationReport) -> String {
        let mut out = String::new();
        for result in &report.results {
            if self.quiet && matches!(result.outcome, Outcome::Pass) {
                continue;
            }
            self.result_line(&mut out, result);
        }
        let _ = writeln!(
            out,
            "\nSummary: {} passed, {} warnings, {} failed, {} missing",
            report.pass_count(),
            report.warning_count(),
            report.failure_count(),
            report.missing_count()
        );
        out
    }

    fn result_line(&self, out: &mut String, result: &ValidationResult) {
        let (prefix, messages) = match &result.outcome {
            Outcome::Pass => (self.mark("✓", "PASS", Tone::Good), &[][..]),
            Outcome::Warn(error) => (self.mark("!", "WARN", Tone::Warn), &error.messages[..]),
            Outcome::Fail(error) => (self.mark("✗", "FAIL", Tone::Bad), &error.messages[..]),
            Outcome::ElementNotFound => (self.mark("?", "MISS", Tone::Bad), &[][..]),
        };
        let _ = writeln!(
            out,
            "{prefix} {}: {}  ({})",
            result.object, result.spec, result.place
        );
        for message in messages {
            let _ = writeln!(out, "    {message}");
        }
        if matches!(result.outcome, Outcome::ElementNotFound) {
            let _ = writeln!(out, "    \"{}\" is not found on page", result.object);
        }
    }

    fn mark(&self, symbol: &str, word: &str, tone: Tone) -> String {
        if !self.use_color {
            return word.to_string();
        }
        let styled = style(symbol).bold();
        match tone {
            Tone::Good => styled.green(),
            Tone::Warn => styled.yellow(),
            Tone::Bad => styled.red(),
        }
        .to_string()
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Good,
    Warn,
    Bad,
}

/// Render a compiled spec as an indented outline
#[must_use]
pub fn spec_outline(spec: &PageSpec) -> String {
    let mut out = String::new();
    if !spec.objects.is_empty() {
        out.push_str("Objects:\n");
        for (name, locator) in &spec.objects {
            let _ = writeln!(out, "    {name}: {locator}");
        }
    }
    for section in &spec.sections {
        let _ = write!(out, "@ {}", section.name);
        if !section.tags.is_empty() {
            let _ = write!(out, " | {}", section.tags.join(", "));
        }
        out.push('\n');
        objects_outline(&mut out, &section.objects, 1);
        for block in &section.conditional_blocks {
            out.push_str("    if\n");
            for (i, statement) in block.statements.iter().enumerate() {
                if i > 0 {
                    out.push_str("    or\n");
                }
                if statement.inverted {
                    out.push_str("    not\n");
                }
                objects_outline(&mut out, &statement.objects, 2);
            }
            out.push_str("    do\n");
            objects_outline(&mut out, &block.body_objects, 2);
            if !block.otherwise_objects.is_empty() {
                out.push_str("    otherwise\n");
                objects_outline(&mut out, &block.otherwise_objects, 2);
            }
            out.push_str("    end\n");
        }
    }
    out
}

fn objects_outline(out: &mut String, objects: &[ObjectSpecs], depth: usize) {
    let indent = "    ".repeat(depth);
    for object in objects {
        let _ = writeln!(out, "{indent}{}", object.object_name);
        for spec in &object.specs {
            let warn = if spec.only_warn { "%" } else { "" };
            let _ = writeln!(out, "{indent}    {warn}{}", spec.original_text);
        }
    }
}
