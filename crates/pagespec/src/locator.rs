//! Locators and element geometry.
//!
//! A [`Locator`] is the recipe the spec author gives for resolving an object
//! name against a live page. Locators are plain values: two locators are
//! equal iff kind, selector and positional index are all equal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Matcher kind used to find an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    /// CSS selector (e.g., "#menu .item")
    Css,
    /// XPath expression
    XPath,
    /// DOM id attribute
    Id,
    /// Element tag name
    Tag,
}

impl LocatorKind {
    /// Parse the keyword used in object definitions
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "css" => Some(Self::Css),
            "xpath" => Some(Self::XPath),
            "id" => Some(Self::Id),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }

    /// Keyword form of the kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Id => "id",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to resolve a named object on the page.
///
/// `index` is the 1-based position among all elements matched by the
/// selector; `None` means the first match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Matcher kind
    pub kind: LocatorKind,
    /// Selector text
    pub selector: String,
    /// Optional positional index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl Locator {
    /// Create a locator without index
    #[must_use]
    pub fn new(kind: LocatorKind, selector: impl Into<String>) -> Self {
        Self {
            kind,
            selector: selector.into(),
            index: None,
        }
    }

    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(LocatorKind::Css, selector)
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(LocatorKind::XPath, selector)
    }

    /// Create an id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(LocatorKind::Id, id)
    }

    /// Create a tag locator
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::new(LocatorKind::Tag, tag)
    }

    /// Set the positional index
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Same locator without positional index
    #[must_use]
    pub fn without_index(&self) -> Self {
        Self {
            kind: self.kind,
            selector: self.selector.clone(),
            index: None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.selector)?;
        if let Some(index) = self.index {
            write!(f, " #{index}")?;
        }
        Ok(())
    }
}

/// Rectangular area of an element, in page pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rect
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if `other` lies completely inside this rect
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Check if the two rects share any area
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod locator_tests {
        use super::*;

        #[test]
        fn test_equal_when_all_fields_match() {
            assert_eq!(
                Locator::css("#menu .item").with_index(1),
                Locator::css("#menu .item").with_index(1)
            );
        }

        #[test]
        fn test_not_equal_on_index() {
            assert_ne!(
                Locator::css("#menu .item").with_index(1),
                Locator::css("#menu .item")
            );
        }

        #[test]
        fn test_not_equal_on_kind() {
            assert_ne!(Locator::css("menu"), Locator::id("menu"));
        }

        #[test]
        fn test_kind_keywords() {
            for kind in [
                LocatorKind::Css,
                LocatorKind::XPath,
                LocatorKind::Id,
                LocatorKind::Tag,
            ] {
                assert_eq!(LocatorKind::parse(kind.as_str()), Some(kind));
            }
            assert_eq!(LocatorKind::parse("class"), None);
        }

        #[test]
        fn test_display() {
            assert_eq!(Locator::xpath("//div").to_string(), "xpath //div");
            assert_eq!(
                Locator::css(".item").with_index(3).to_string(),
                "css .item #3"
            );
        }

        #[test]
        fn test_serde_kind_lowercase() {
            let json = serde_json::to_string(&Locator::xpath("//a")).unwrap();
            assert_eq!(json, r#"{"kind":"xpath","selector":"//a"}"#);
        }
    }

    mod rect_tests {
        use super::*;

        #[test]
        fn test_edges() {
            let r = Rect::new(10.0, 20.0, 100.0, 50.0);
            assert_eq!(r.right(), 110.0);
            assert_eq!(r.bottom(), 70.0);
        }

        #[test]
        fn test_contains() {
            let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
            assert!(outer.contains(&Rect::new(10.0, 10.0, 20.0, 20.0)));
            assert!(!outer.contains(&Rect::new(90.0, 10.0, 20.0, 20.0)));
        }

        #[test]
        fn test_intersects() {
            let a = Rect::new(0.0, 0.0, 100.0, 100.0);
            assert!(a.intersects(&Rect::new(90.0, 90.0, 20.0, 20.0)));
            assert!(!a.intersects(&Rect::new(100.0, 0.0, 20.0, 20.0)));
        }
    }

    mod proptest_locator {
        use super::*;
        use proptest::prelude::*;

        fn kind() -> impl Strategy<Value = LocatorKind> {
            prop_oneof![
                Just(LocatorKind::Css),
                Just(LocatorKind::XPath),
                Just(LocatorKind::Id),
                Just(LocatorKind::Tag),
            ]
        }

        proptest! {
            #[test]
            fn equality_iff_all_fields_match(
                k1 in kind(), k2 in kind(),
                s1 in "[a-c]{1,2}", s2 in "[a-c]{1,2}",
                i1 in proptest::option::of(1usize..3), i2 in proptest::option::of(1usize..3),
            ) {
                let a = Locator { kind: k1, selector: s1.clone(), index: i1 };
                let b = Locator { kind: k2, selector: s2.clone(), index: i2 };
                prop_assert_eq!(a == b, k1 == k2 && s1 == s2 && i1 == i2);
            }
        }
    }
}
