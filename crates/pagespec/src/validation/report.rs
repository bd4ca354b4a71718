//! Validation results.

use crate::locator::Rect;
use crate::place::Place;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highlighted region of a failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorArea {
    /// Area on the page
    pub rect: Rect,
    /// Object the area belongs to
    pub name: String,
}

impl ErrorArea {
    /// Create an error area
    #[must_use]
    pub fn new(rect: Rect, name: impl Into<String>) -> Self {
        Self {
            rect,
            name: name.into(),
        }
    }
}

/// Messages and areas of one failing spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// One message per violated constraint
    pub messages: Vec<String>,
    /// Areas involved
    pub areas: Vec<ErrorArea>,
}

impl ValidationError {
    /// Error with a single message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
            areas: Vec::new(),
        }
    }

    /// Add an area
    #[must_use]
    pub fn with_area(mut self, area: ErrorArea) -> Self {
        self.areas.push(area);
        self
    }

    /// Set the areas
    #[must_use]
    pub fn with_areas(mut self, areas: Vec<ErrorArea>) -> Self {
        self.areas = areas;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("; "))
    }
}

/// Outcome of one spec run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum Outcome {
    /// Spec holds
    Pass,
    /// Warning-only spec failed
    Warn(ValidationError),
    /// Spec failed
    Fail(ValidationError),
    /// Object could not be resolved; its remaining specs were skipped
    ElementNotFound,
}

impl Outcome {
    /// Outcome counts against the verdict
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Fail(_) | Self::ElementNotFound)
    }
}

/// One reportable spec run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Object the spec belongs to
    pub object: String,
    /// Spec text
    pub spec: String,
    /// Where the spec was declared
    pub place: Place,
    /// What happened
    pub outcome: Outcome,
}

/// Ordered results of one validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Results in section, object and spec order
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    /// Create a report
    #[must_use]
    pub const fn new(results: Vec<ValidationResult>) -> Self {
        Self { results }
    }

    /// No failure and no missing element
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.results.iter().any(|r| r.outcome.is_failure())
    }

    /// Results that count against the verdict
    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.outcome.is_failure())
    }

    /// Number of passing specs
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Pass))
    }

    /// Number of warnings
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Warn(_)))
    }

    /// Number of failed specs
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Fail(_)))
    }

    /// Number of objects that could not be resolved
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::ElementNotFound))
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.outcome)).count()
    }
}
