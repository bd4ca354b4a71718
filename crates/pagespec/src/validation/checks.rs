//! Per-kind spec checkers.
//!
//! Each checker compares the element's current state with the spec's
//! parameters. Relational checkers get the related object's area through a
//! lookup callback owned by the engine. Every violated constraint becomes
//! one message of a single [`ValidationError`].

use super::report::{ErrorArea, ValidationError};
use crate::locator::Rect;
use crate::page::PageElement;
use crate::range::{fmt_px, Location, Range, Side};
use crate::reader::grammar::compile_text_pattern;
use crate::spec::{SpecKind, TextCheck, TextOperation};

/// Resolves a related object name to its area
pub(crate) type Related<'a> = &'a dyn Fn(&str) -> Result<Rect, ValidationError>;

pub(crate) type CheckResult = Result<(), ValidationError>;

/// Run the checker for a resolved, visible element.
///
/// `absent` and `component` are decided by the engine and pass here.
pub(crate) fn check(
    object: &str,
    element: &dyn PageElement,
    kind: &SpecKind,
    related: Related<'_>,
) -> CheckResult {
    let rect = element.rect();
    match kind {
        SpecKind::Width { range } => dimension(object, rect, "width", rect.width, range),
        SpecKind::Height { range } => dimension(object, rect, "height", rect.height, range),
        SpecKind::Near { object: other, locations } => {
            let other_rect = related(other)?;
            offsets(object, rect, other, other_rect, locations, near_distance)
        }
        SpecKind::Inside {
            object: other,
            locations,
            partly,
        } => {
            let other_rect = related(other)?;
            let contained = if *partly {
                other_rect.intersects(&rect)
            } else {
                other_rect.contains(&rect)
            };
            let mut messages = Vec::new();
            if !contained {
                let how = if *partly { "" } else { "completely " };
                messages.push(format!("\"{object}\" is not {how}inside \"{other}\""));
            }
            messages.extend(offset_messages(object, rect, other_rect, locations, inside_distance));
            fail(messages, areas(object, rect, other, other_rect))
        }
        SpecKind::Above { object: other, range } => {
            let other_rect = related(other)?;
            let gap = other_rect.top() - rect.bottom();
            direction(object, rect, other, other_rect, "above", gap, range.as_ref())
        }
        SpecKind::Below { object: other, range } => {
            let other_rect = related(other)?;
            let gap = rect.top() - other_rect.bottom();
            direction(object, rect, other, other_rect, "below", gap, range.as_ref())
        }
        SpecKind::LeftOf { object: other, range } => {
            let other_rect = related(other)?;
            let gap = other_rect.left() - rect.right();
            direction(object, rect, other, other_rect, "left of", gap, range.as_ref())
        }
        SpecKind::RightOf { object: other, range } => {
            let other_rect = related(other)?;
            let gap = rect.left() - other_rect.right();
            direction(object, rect, other, other_rect, "right of", gap, range.as_ref())
        }
        SpecKind::Text {
            check,
            expected,
            operations,
        } => text(object, element, *check, expected, operations),
        SpecKind::Absent | SpecKind::Visible | SpecKind::Component { .. } => Ok(()),
    }
}

fn areas(object: &str, rect: Rect, other: &str, other_rect: Rect) -> Vec<ErrorArea> {
    vec![ErrorArea::new(rect, object), ErrorArea::new(other_rect, other)]
}

fn dimension(object: &str, rect: Rect, what: &str, actual: f64, range: &Range) -> CheckResult {
    if range.holds(actual) {
        return Ok(());
    }
    Err(ValidationError::new(format!(
        "\"{object}\" {what} is {}px but it should be {}",
        fmt_px(actual),
        range.describe()
    ))
    .with_area(ErrorArea::new(rect, object)))
}

/// Gap between the object and its neighbour on `side`
fn near_distance(rect: Rect, other: Rect, side: Side) -> f64 {
    match side {
        Side::Left => other.left() - rect.right(),
        Side::Right => rect.left() - other.right(),
        Side::Top => other.top() - rect.bottom(),
        Side::Bottom => rect.top() - other.bottom(),
    }
}

/// Offset of the object from the container edge on `side`
fn inside_distance(rect: Rect, other: Rect, side: Side) -> f64 {
    match side {
        Side::Left => rect.left() - other.left(),
        Side::Right => other.right() - rect.right(),
        Side::Top => rect.top() - other.top(),
        Side::Bottom => other.bottom() - rect.bottom(),
    }
}

fn offsets(
    object: &str,
    rect: Rect,
    other: &str,
    other_rect: Rect,
    locations: &[Location],
    distance: fn(Rect, Rect, Side) -> f64,
) -> CheckResult {
    fail(
        offset_messages(object, rect, other_rect, locations, distance),
        areas(object, rect, other, other_rect),
    )
}

fn offset_messages(
    object: &str,
    rect: Rect,
    other_rect: Rect,
    locations: &[Location],
    distance: fn(Rect, Rect, Side) -> f64,
) -> Vec<String> {
    locations
        .iter()
        .flat_map(|location| {
            location.sides.iter().filter_map(move |side| {
                let actual = distance(rect, other_rect, *side);
                (!location.range.holds(actual)).then(|| {
                    format!(
                        "\"{object}\" is {}px {side} instead of {}",
                        fmt_px(actual),
                        location.range.describe()
                    )
                })
            })
        })
        .collect()
}

fn fail(messages: Vec<String>, areas: Vec<ErrorArea>) -> CheckResult {
    if messages.is_empty() {
        return Ok(());
    }
    Err(ValidationError { messages, areas })
}

fn direction(
    object: &str,
    rect: Rect,
    other: &str,
    other_rect: Rect,
    word: &str,
    gap: f64,
    range: Option<&Range>,
) -> CheckResult {
    let message = match range {
        None if gap < 0.0 => format!("\"{object}\" is not {word} \"{other}\""),
        Some(range) if !range.holds(gap) => format!(
            "\"{object}\" is {}px {word} \"{other}\" instead of {}",
            fmt_px(gap),
            range.describe()
        ),
        _ => return Ok(()),
    };
    Err(ValidationError::new(message).with_areas(areas(object, rect, other, other_rect)))
}

fn text(
    object: &str,
    element: &dyn PageElement,
    check: TextCheck,
    expected: &str,
    operations: &[TextOperation],
) -> CheckResult {
    let actual = operations
        .iter()
        .fold(element.text().unwrap_or_default(), |text, op| op.apply(&text));
    let (holds, should) = match check {
        TextCheck::Is => (actual == expected, "be"),
        TextCheck::Contains => (actual.contains(expected), "contain"),
        TextCheck::Starts => (actual.starts_with(expected), "start with"),
        TextCheck::Ends => (actual.ends_with(expected), "end with"),
        TextCheck::Matches => {
            let pattern = compile_text_pattern(expected).map_err(|_| {
                ValidationError::new(format!("Incorrect regular expression: {expected}"))
            })?;
            (pattern.is_match(&actual), "match")
        }
    };
    if holds {
        return Ok(());
    }
    Err(ValidationError::new(format!(
        "\"{object}\" text is \"{actual}\" but should {should} \"{expected}\""
    ))
    .with_area(ErrorArea::new(element.rect(), object)))
}
