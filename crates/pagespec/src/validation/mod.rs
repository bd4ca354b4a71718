//! Validation engine.
//!
//! [`Validator`] walks the sections selected by a tag filter and runs every
//! spec against a [`Page`]. Conditional blocks are decided by probing their
//! statements first; probes never show up in the report. Validation never
//! stops early: one run yields one complete [`ValidationReport`].

mod checks;
pub mod report;

pub use report::{ErrorArea, Outcome, ValidationError, ValidationReport, ValidationResult};

use crate::config::ValidationConfig;
use crate::locator::Rect;
use crate::model::{ConditionalBlockStatement, ObjectSpecs, PageSpec};
use crate::page::{Page, PageElement};
use crate::reader::PageSpecReader;
use crate::spec::SpecKind;
use checks::CheckResult;
use std::fmt;

/// Object name that resolves to the viewport when not declared
pub const SCREEN_OBJECT: &str = "screen";

/// Viewport acting as an element
#[derive(Debug, Clone, Copy)]
struct ScreenElement(Rect);

impl PageElement for ScreenElement {
    fn rect(&self) -> Rect {
        self.0
    }

    fn text(&self) -> Option<String> {
        None
    }

    fn is_visible(&self) -> bool {
        true
    }
}

enum Lookup<'p> {
    Undeclared,
    Missing,
    Found(Box<dyn PageElement + 'p>),
}

/// Runs a compiled spec against one page
pub struct Validator<'a> {
    spec: &'a PageSpec,
    page: &'a dyn Page,
    config: ValidationConfig,
    reader: Option<&'a PageSpecReader>,
    depth: usize,
}

impl fmt::Debug for Validator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("sections", &self.spec.sections.len())
            .field("config", &self.config)
            .field("reader", &self.reader.is_some())
            .field("depth", &self.depth)
            .finish()
    }
}

impl<'a> Validator<'a> {
    /// Create a validator; `component` specs fail until a reader is set
    #[must_use]
    pub fn new(spec: &'a PageSpec, page: &'a dyn Page) -> Self {
        Self {
            spec,
            page,
            config: ValidationConfig::default(),
            reader: None,
            depth: 0,
        }
    }

    /// Set validation configuration
    #[must_use]
    pub const fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Reader used to compile component specs
    #[must_use]
    pub const fn with_reader(mut self, reader: &'a PageSpecReader) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Validate the sections applicable under `tags`
    pub fn validate<S: AsRef<str>>(&self, tags: &[S]) -> ValidationReport {
        let tags: Vec<String> = tags.iter().map(|t| t.as_ref().to_string()).collect();
        let mut results = Vec::new();

        for section in self.spec.find_sections(&tags) {
            tracing::debug!(section = %section.name, depth = self.depth, "validating section");
            for object in &section.objects {
                self.run_object(object, &tags, false, &mut results);
            }
            for block in &section.conditional_blocks {
                let satisfied = block
                    .statements
                    .iter()
                    .any(|statement| self.is_satisfied(statement, &tags));
                tracing::debug!(satisfied, "conditional block");
                let branch = if satisfied {
                    &block.body_objects
                } else {
                    &block.otherwise_objects
                };
                for object in branch {
                    self.run_object(object, &tags, false, &mut results);
                }
            }
        }
        ValidationReport::new(results)
    }

    /// Statement holds when all of its probes pass, flipped when inverted
    fn is_satisfied(&self, statement: &ConditionalBlockStatement, tags: &[String]) -> bool {
        let mut probes = Vec::new();
        for object in &statement.objects {
            self.run_object(object, tags, true, &mut probes);
        }
        let all_pass = probes.iter().all(|r| r.outcome == Outcome::Pass);
        all_pass != statement.inverted
    }

    fn find(&self, name: &str) -> Lookup<'a> {
        match self.spec.locator(name) {
            Some(locator) => self
                .page
                .find_element(locator)
                .map_or(Lookup::Missing, Lookup::Found),
            None => match self.page.screen() {
                Some(rect) if name == SCREEN_OBJECT => Lookup::Found(Box::new(ScreenElement(rect))),
                _ => Lookup::Undeclared,
            },
        }
    }

    fn related_rect(&self, name: &str) -> Result<Rect, ValidationError> {
        match self.find(name) {
            Lookup::Found(element) if element.is_visible() => Ok(element.rect()),
            Lookup::Found(_) => Err(ValidationError::new(format!(
                "\"{name}\" is not visible on page"
            ))),
            Lookup::Missing => Err(ValidationError::new(format!(
                "\"{name}\" is absent on page"
            ))),
            Lookup::Undeclared => Err(ValidationError::new(format!(
                "Cannot find locator for \"{name}\""
            ))),
        }
    }

    fn run_object(
        &self,
        object: &ObjectSpecs,
        tags: &[String],
        probe: bool,
        results: &mut Vec<ValidationResult>,
    ) {
        let name = object.object_name.as_str();
        let lookup = self.find(name);
        if matches!(lookup, Lookup::Undeclared) {
            tracing::warn!(object = name, "object is not declared");
        }
        let related = |other: &str| self.related_rect(other);

        for spec in &object.specs {
            let checked: CheckResult = match (&spec.kind, &lookup) {
                (SpecKind::Absent, Lookup::Found(element)) if element.is_visible() => {
                    Err(ValidationError::new(format!("\"{name}\" is not absent on page"))
                        .with_area(ErrorArea::new(element.rect(), name)))
                }
                (SpecKind::Absent, _) => Ok(()),
                (_, Lookup::Undeclared | Lookup::Missing) => {
                    tracing::debug!(object = name, place = %spec.place, "element not found");
                    results.push(ValidationResult {
                        object: name.to_string(),
                        spec: spec.original_text.clone(),
                        place: spec.place.clone(),
                        outcome: Outcome::ElementNotFound,
                    });
                    break;
                }
                (_, Lookup::Found(element)) if !element.is_visible() => Err(ValidationError::new(
                    format!("\"{name}\" is not visible on page"),
                )),
                (SpecKind::Component { path }, Lookup::Found(_)) => {
                    self.check_component(name, path, tags)
                }
                (kind, Lookup::Found(element)) => {
                    checks::check(name, &**element, kind, &related)
                }
            };

            let outcome = match checked {
                Ok(()) => Outcome::Pass,
                Err(error) if spec.only_warn && !probe => Outcome::Warn(error),
                Err(error) => Outcome::Fail(error),
            };
            tracing::trace!(object = name, spec = %spec.original_text, ?outcome, "checked");
            results.push(ValidationResult {
                object: name.to_string(),
                spec: spec.original_text.clone(),
                place: spec.place.clone(),
                outcome,
            });
        }
    }

    /// Compile the component spec and validate it inside the element
    fn check_component(&self, name: &str, path: &str, tags: &[String]) -> CheckResult {
        if self.depth >= self.config.max_component_depth {
            return Err(ValidationError::new(format!(
                "Component nesting is deeper than {}: {path}",
                self.config.max_component_depth
            )));
        }
        let Some(reader) = self.reader else {
            return Err(ValidationError::new(format!(
                "Cannot validate component {path}: no spec reader"
            )));
        };
        let scoped = match self.spec.locator(name) {
            Some(locator) => Some(self.page.within(locator).ok_or_else(|| {
                ValidationError::new(format!("\"{name}\" is absent on page"))
            })?),
            None => None,
        };
        let page: &dyn Page = scoped.as_deref().unwrap_or(self.page);

        let component = reader
            .read(path, Some(page))
            .map_err(|e| ValidationError::new(e.to_string()))?;
        let report = Validator {
            spec: &component,
            page,
            config: self.config,
            reader: Some(reader),
            depth: self.depth + 1,
        }
        .validate(tags);

        let mut error = ValidationError::default();
        for failure in report.failures() {
            match &failure.outcome {
                Outcome::Fail(child) => {
                    error.messages.extend(
                        child
                            .messages
                            .iter()
                            .map(|m| format!("{}: {m}", failure.object)),
                    );
                    error.areas.extend(child.areas.iter().cloned());
                }
                _ => error.messages.push(format!(
                    "{}: \"{}\" is absent on page",
                    failure.object, failure.object
                )),
            }
        }
        if error.messages.is_empty() {
            Ok(())
        } else {
            Err(error)
        }
    }
}
