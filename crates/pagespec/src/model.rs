//! Page specification model.
//!
//! The compiler builds these nodes once; afterwards they are only read. The
//! validation engine keeps its results in a separate structure, so one
//! [`PageSpec`] can be validated any number of times.

use crate::locator::Locator;
use crate::place::Place;
use crate::spec::Spec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag that includes a section under every filter
pub const ANY_TAG: &str = "*";

/// Specs attached to one object name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpecs {
    /// Name of the object in the page spec's object table
    pub object_name: String,
    /// Specs in declaration order
    pub specs: Vec<Spec>,
}

impl ObjectSpecs {
    /// Create an object spec group
    #[must_use]
    pub fn new(object_name: impl Into<String>, specs: Vec<Spec>) -> Self {
        Self {
            object_name: object_name.into(),
            specs,
        }
    }
}

/// One `if`/`or` statement: satisfied when all of its probe specs pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionalBlockStatement {
    /// Probe specs; never reported
    pub objects: Vec<ObjectSpecs>,
    /// Satisfied when the probes do not all pass
    pub inverted: bool,
}

/// `if ... or ... do ... otherwise ... end`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionalBlock {
    /// OR-combined statements
    pub statements: Vec<ConditionalBlockStatement>,
    /// Checked when any statement is satisfied
    pub body_objects: Vec<ObjectSpecs>,
    /// Checked when no statement is satisfied
    pub otherwise_objects: Vec<ObjectSpecs>,
}

/// Tag-filtered group of object specs and conditional blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSection {
    /// Display name
    pub name: String,
    /// Tags in declaration order; empty means unconditionally included
    pub tags: Vec<String>,
    /// Top-level object specs
    pub objects: Vec<ObjectSpecs>,
    /// Conditional blocks
    pub conditional_blocks: Vec<ConditionalBlock>,
    /// Line the section starts at
    pub place: Place,
}

impl PageSection {
    /// Create an empty section
    #[must_use]
    pub fn new(name: impl Into<String>, tags: Vec<String>, place: Place) -> Self {
        Self {
            name: name.into(),
            tags,
            objects: Vec::new(),
            conditional_blocks: Vec::new(),
            place,
        }
    }

    /// Section holds nothing to validate
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.conditional_blocks.is_empty()
    }

    /// Whether the section applies under the given tag filter
    #[must_use]
    pub fn is_included<S: AsRef<str>>(&self, filter: &[S]) -> bool {
        self.tags.is_empty()
            || self.tags.iter().any(|tag| {
                tag == ANY_TAG || filter.iter().any(|wanted| wanted.as_ref() == tag)
            })
    }
}

/// Root artifact of compilation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    /// Object name to locator; names are unique
    pub objects: BTreeMap<String, Locator>,
    /// Sections in declaration order
    pub sections: Vec<PageSection>,
}

impl PageSpec {
    /// Create an empty page spec
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator of a declared object
    #[must_use]
    pub fn locator(&self, name: &str) -> Option<&Locator> {
        self.objects.get(name)
    }

    /// Sections applicable under the given tag filter, in order
    #[must_use]
    pub fn find_sections<S: AsRef<str>>(&self, filter: &[S]) -> Vec<&PageSection> {
        self.sections
            .iter()
            .filter(|section| section.is_included(filter))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn section(tags: &[&str]) -> PageSection {
        let mut section = PageSection::new(
            "s",
            tags.iter().map(ToString::to_string).collect(),
            Place::new("t.spec", 1),
        );
        section.objects.push(ObjectSpecs::new("menu", vec![]));
        section
    }

    mod section_filter_tests {
        use super::*;

        #[test]
        fn test_untagged_always_included() {
            assert!(section(&[]).is_included(&["mobile"]));
            assert!(section(&[]).is_included::<&str>(&[]));
        }

        #[test]
        fn test_asterisk_always_included() {
            assert!(section(&["*"]).is_included(&["tag2"]));
            assert!(section(&["*"]).is_included::<&str>(&[]));
        }

        #[test]
        fn test_intersection() {
            assert!(section(&["tablet", "desktop"]).is_included(&["desktop"]));
            assert!(!section(&["tablet", "desktop"]).is_included(&["mobile"]));
            assert!(!section(&["mobile"]).is_included::<&str>(&[]));
        }

        #[test]
        fn test_find_sections_keeps_order() {
            let spec = PageSpec {
                objects: BTreeMap::new(),
                sections: vec![section(&["*"]), section(&["tag1"]), section(&["tag2"])],
            };
            let found = spec.find_sections(&["tag2"]);
            assert_eq!(found.len(), 2);
            assert_eq!(found[0].tags, vec!["*"]);
            assert_eq!(found[1].tags, vec!["tag2"]);
        }
    }

    #[test]
    fn test_empty_section() {
        let s = PageSection::new("x", vec![], Place::new("t.spec", 1));
        assert!(s.is_empty());
        assert!(!section(&[]).is_empty());
    }
}
