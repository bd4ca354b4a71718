//! Typed spec nodes.
//!
//! Each indented line under an object compiles into one [`Spec`]: the kind
//! specific parameters plus the text it was read from, its place, and the
//! warning-only flag.

use crate::place::Place;
use crate::range::{Location, Range};
use serde::{Deserialize, Serialize};

/// One assertion about an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    /// What is asserted
    pub kind: SpecKind,
    /// Spec line after substitution, without the warning marker
    pub original_text: String,
    /// Where the line was read from
    pub place: Place,
    /// Failures are reported as warnings
    pub only_warn: bool,
}

/// Closed set of spec kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpecKind {
    /// Element width
    Width {
        /// Accepted width
        range: Range,
    },
    /// Element height
    Height {
        /// Accepted height
        range: Range,
    },
    /// Distance to a neighbour object on the given sides
    Near {
        /// Related object
        object: String,
        /// Every location must hold
        locations: Vec<Location>,
    },
    /// Containment in another object, with optional offsets
    Inside {
        /// Container object
        object: String,
        /// Offsets from the container edges
        locations: Vec<Location>,
        /// Only partial overlap is required
        partly: bool,
    },
    /// Positioned above another object
    Above {
        /// Related object
        object: String,
        /// Accepted vertical gap; any non-negative gap when absent
        range: Option<Range>,
    },
    /// Positioned below another object
    Below {
        /// Related object
        object: String,
        /// Accepted vertical gap
        range: Option<Range>,
    },
    /// Positioned to the left of another object
    LeftOf {
        /// Related object
        object: String,
        /// Accepted horizontal gap
        range: Option<Range>,
    },
    /// Positioned to the right of another object
    RightOf {
        /// Related object
        object: String,
        /// Accepted horizontal gap
        range: Option<Range>,
    },
    /// Object is missing or not rendered
    Absent,
    /// Object is present and rendered
    Visible,
    /// Element text check
    Text {
        /// Comparison
        check: TextCheck,
        /// Expected text or pattern
        expected: String,
        /// Transformations applied to the actual text, in order
        operations: Vec<TextOperation>,
    },
    /// Nested spec file validated inside the element
    Component {
        /// Resolved path of the component spec
        path: String,
    },
}

impl SpecKind {
    /// Keyword naming the kind, as used in reports
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Width { .. } => "width",
            Self::Height { .. } => "height",
            Self::Near { .. } => "near",
            Self::Inside { .. } => "inside",
            Self::Above { .. } => "above",
            Self::Below { .. } => "below",
            Self::LeftOf { .. } => "left of",
            Self::RightOf { .. } => "right of",
            Self::Absent => "absent",
            Self::Visible => "visible",
            Self::Text { .. } => "text",
            Self::Component { .. } => "component",
        }
    }

    /// Object referenced by a relational spec
    #[must_use]
    pub fn related_object(&self) -> Option<&str> {
        match self {
            Self::Near { object, .. }
            | Self::Inside { object, .. }
            | Self::Above { object, .. }
            | Self::Below { object, .. }
            | Self::LeftOf { object, .. }
            | Self::RightOf { object, .. } => Some(object),
            _ => None,
        }
    }
}

/// Text comparison sub-type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCheck {
    /// Exact equality
    Is,
    /// Substring
    Contains,
    /// Prefix
    Starts,
    /// Suffix
    Ends,
    /// Full regular expression match, `.` matching newlines
    Matches,
}

impl TextCheck {
    /// Parse the check keyword
    #[must_use]
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "is" => Some(Self::Is),
            "contains" => Some(Self::Contains),
            "starts" => Some(Self::Starts),
            "ends" => Some(Self::Ends),
            "matches" => Some(Self::Matches),
            _ => None,
        }
    }
}

/// Transformation applied to element text before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOperation {
    /// Lower-case
    Lowercase,
    /// Upper-case
    Uppercase,
    /// Strip surrounding whitespace
    Trim,
    /// Replace line breaks with spaces
    Singleline,
}

impl TextOperation {
    /// Parse the operation keyword
    #[must_use]
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "lowercase" => Some(Self::Lowercase),
            "uppercase" => Some(Self::Uppercase),
            "trim" => Some(Self::Trim),
            "singleline" => Some(Self::Singleline),
            _ => None,
        }
    }

    /// Apply the operation
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Lowercase => text.to_lowercase(),
            Self::Uppercase => text.to_uppercase(),
            Self::Trim => text.trim().to_string(),
            Self::Singleline => text.replace("\r\n", " ").replace(['\n', '\r'], " "),
        }
    }
}
