//! Pagespec: layout specification compiler and validation engine
//!
//! A page spec describes where elements sit on a rendered page and what
//! they say ("menu is 10px below header", "button text is Submit"). This
//! crate compiles spec text into a [`PageSpec`] and validates it against
//! any implementation of the [`Page`] capability.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌──────────┐
//! │ spec     │──►│ lines    │──►│ directives │──►│ PageSpec │──►│Validator │
//! │ text     │   │ (indent) │   │ + grammar  │   │ (model)  │   │ + checks │
//! └──────────┘   └──────────┘   └─────┬──────┘   └──────────┘   └────┬─────┘
//!                                     │ imports, scripts,            │
//!                                     │ ${expressions}               │ Page
//!                                     ▼                              ▼
//!                               FileSource,                    find_element,
//!                               ExpressionEvaluator            within, screen
//! ```
//!
//! # Example
//!
//! ```
//! use pagespec::{JsonElement, JsonPage, Locator, PageSpecReader, Rect, Validator};
//!
//! let spec = PageSpecReader::new()
//!     .read_text(
//!         "===\nheader id header\n===\n@ Header | desktop\nheader\n    height: 100px\n",
//!         "home.spec",
//!         None,
//!     )
//!     .unwrap();
//! let page = JsonPage::new().with_element(JsonElement::new(
//!     &Locator::id("header"),
//!     Rect::new(0.0, 0.0, 1024.0, 100.0),
//! ));
//! let report = Validator::new(&spec, &page).validate(&["desktop"]);
//! assert!(report.passed());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod eval;
mod locator;
mod model;
pub mod page;
mod place;
mod range;
pub mod reader;
mod result;
mod spec;
pub mod validation;

pub use config::{ReaderConfig, ValidationConfig};
pub use eval::{BasicEvaluator, EvalError, ExpressionEvaluator, Scope, Value};
pub use locator::{Locator, LocatorKind, Rect};
pub use model::{
    ConditionalBlock, ConditionalBlockStatement, ObjectSpecs, PageSection, PageSpec, ANY_TAG,
};
pub use page::{JsonElement, JsonPage, Page, PageElement};
pub use place::Place;
pub use range::{Location, Range, Side};
pub use reader::{FileSource, FsSource, MemorySource, PageSpecReader};
pub use result::{SpecError, SpecResult};
pub use spec::{Spec, SpecKind, TextCheck, TextOperation};
pub use validation::{
    ErrorArea, Outcome, ValidationError, ValidationReport, ValidationResult, Validator,
};

use std::collections::BTreeMap;
use std::path::Path;

/// Compile a spec file from disk with an initial property set
///
/// # Errors
///
/// Returns the first compile error, with the file and line it occurred at
pub fn compile(
    path: impl AsRef<Path>,
    properties: BTreeMap<String, String>,
) -> SpecResult<PageSpec> {
    PageSpecReader::new()
        .with_properties(properties)
        .read(path, None)
}

/// Validate a compiled spec against a page under a tag filter.
///
/// Component specs are read from disk relative to their declaring file.
pub fn validate<S: AsRef<str>>(spec: &PageSpec, tags: &[S], page: &dyn Page) -> ValidationReport {
    let reader = PageSpecReader::new();
    Validator::new(spec, page).with_reader(&reader).validate(tags)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_compile_and_validate_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.spec");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "===\nlogo id logo\n===\nlogo\n    width: ${{LOGO_WIDTH}}px").unwrap();

        let properties = BTreeMap::from([("LOGO_WIDTH".to_string(), "120".to_string())]);
        let spec = compile(&path, properties).unwrap();
        let page = JsonPage::new().with_element(JsonElement::new(
            &Locator::id("logo"),
            Rect::new(0.0, 0.0, 120.0, 40.0),
        ));
        assert!(validate::<&str>(&spec, &[], &page).passed());
    }
}
