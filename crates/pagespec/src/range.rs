//! Numeric ranges, sides and locations used by geometric specs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Format a pixel value without a trailing `.0` for whole numbers
#[must_use]
pub fn fmt_px(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Accepted interval for a measured distance or dimension.
///
/// `Between` always satisfies `min <= max`; the spec reader rejects
/// reversed bounds before constructing one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Range {
    /// Exactly this value
    Exact(f64),
    /// Closed interval
    Between {
        /// Lower bound (inclusive)
        min: f64,
        /// Upper bound (inclusive)
        max: f64,
    },
    /// Strictly greater than
    GreaterThan(f64),
    /// Strictly less than
    LessThan(f64),
    /// Within `tolerance` of `value`
    Approximate {
        /// Expected value
        value: f64,
        /// Allowed deviation in either direction
        tolerance: f64,
    },
}

impl Range {
    /// Exact range
    #[must_use]
    pub const fn exact(value: f64) -> Self {
        Self::Exact(value)
    }

    /// Closed interval; bounds are swapped if given in reverse
    #[must_use]
    pub fn between(a: f64, b: f64) -> Self {
        Self::Between {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Open lower bound
    #[must_use]
    pub const fn greater_than(value: f64) -> Self {
        Self::GreaterThan(value)
    }

    /// Open upper bound
    #[must_use]
    pub const fn less_than(value: f64) -> Self {
        Self::LessThan(value)
    }

    /// Approximate value
    #[must_use]
    pub const fn approximate(value: f64, tolerance: f64) -> Self {
        Self::Approximate { value, tolerance }
    }

    /// Check whether a measured value satisfies this range
    #[must_use]
    pub fn holds(&self, actual: f64) -> bool {
        match *self {
            Self::Exact(v) => actual == v,
            Self::Between { min, max } => actual >= min && actual <= max,
            Self::GreaterThan(v) => actual > v,
            Self::LessThan(v) => actual < v,
            Self::Approximate { value, tolerance } => (actual - value).abs() <= tolerance,
        }
    }

    /// Human wording used in validation messages
    #[must_use]
    pub fn describe(&self) -> String {
        match *self {
            Self::Exact(v) => format!("{}px", fmt_px(v)),
            Self::Between { min, max } => {
                format!("between {}px and {}px", fmt_px(min), fmt_px(max))
            }
            Self::GreaterThan(v) => format!("greater than {}px", fmt_px(v)),
            Self::LessThan(v) => format!("less than {}px", fmt_px(v)),
            Self::Approximate { value, tolerance } => {
                format!("~{}px (±{}px)", fmt_px(value), fmt_px(tolerance))
            }
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Exact(v) => write!(f, "{}px", fmt_px(v)),
            Self::Between { min, max } => write!(f, "{} to {}px", fmt_px(min), fmt_px(max)),
            Self::GreaterThan(v) => write!(f, "> {}px", fmt_px(v)),
            Self::LessThan(v) => write!(f, "< {}px", fmt_px(v)),
            Self::Approximate { value, .. } => write!(f, "~ {}px", fmt_px(value)),
        }
    }
}

/// Direction qualifier for relational specs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left
    Left,
    /// Right
    Right,
    /// Top
    Top,
    /// Bottom
    Bottom,
}

impl Side {
    /// Parse a side keyword
    #[must_use]
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    /// Keyword form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A range paired with the sides it applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Accepted distance
    pub range: Range,
    /// Sides the distance is measured on; never empty
    pub sides: Vec<Side>,
}

impl Location {
    /// Create a location
    #[must_use]
    pub fn new(range: Range, sides: Vec<Side>) -> Self {
        Self { range, sides }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.range)?;
        for side in &self.sides {
            write!(f, " {side}")?;
        }
        Ok(())
    }
}
