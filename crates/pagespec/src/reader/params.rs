//! Parameterized object blocks.
//!
//! `[1 to 3]` or `[1, 3, 6-8, 10]` before an object block repeats the block
//! once per index. Inside the block `@` stands for the index and
//! `@{+n}`/`@{-n}` for an offset from it.

use crate::place::Place;
use crate::result::{SpecError, SpecResult};
use regex::Regex;
use std::sync::OnceLock;

/// Most indexes one parameterization may expand to
pub const MAX_INDEXES: usize = 10_000;

/// Parse the text between the brackets into indexes, in declaration order.
///
/// Reversed ranges expand to nothing.
///
/// # Errors
///
/// Returns a syntax error for items that are not integers or ranges, and
/// when the list expands to more than [`MAX_INDEXES`] indexes
pub fn parse_indexes(text: &str, place: &Place) -> SpecResult<Vec<i64>> {
    let mut indexes = Vec::new();
    for item in text.split(',').map(str::trim) {
        if item.is_empty() {
            continue;
        }
        let (from, to) = match split_range(item) {
            Some((from, to)) => (number(from, place)?, number(to, place)?),
            None => {
                let single = number(item, place)?;
                (single, single)
            }
        };
        if from > to {
            continue;
        }
        let fits = to
            .checked_sub(from)
            .and_then(|span| usize::try_from(span).ok())
            .is_some_and(|span| span < MAX_INDEXES - indexes.len());
        if !fits {
            return Err(SpecError::syntax(
                format!("Incorrect parameter index: {item} (more than {MAX_INDEXES} indexes)"),
                place,
            ));
        }
        indexes.extend(from..=to);
    }
    Ok(indexes)
}

fn split_range(item: &str) -> Option<(&str, &str)> {
    if let Some((from, to)) = item.split_once(" to ") {
        return Some((from, to));
    }
    // skip a leading sign so that "-3" stays a single number
    let dash = item.get(1..)?.find('-')? + 1;
    Some((&item[..dash], &item[dash + 1..]))
}

fn number(text: &str, place: &Place) -> SpecResult<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| {
            text.parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0)
                .map(|v| v as i64)
        })
        .ok_or_else(|| SpecError::syntax(format!("Incorrect parameter index: {text}"), place))
}

fn offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"@\{\s*([+-])\s*(\d+)\s*\}").expect("offset pattern is valid")
    })
}

/// Replace index placeholders in one line
///
/// # Errors
///
/// Returns a syntax error when an offset does not fit the index range
pub fn substitute_index(text: &str, index: i64, place: &Place) -> SpecResult<String> {
    let plain = index.to_string();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in offset_pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let value = shift(index, &caps[1], &caps[2]).ok_or_else(|| {
            SpecError::syntax(
                format!("Incorrect parameter index: {}", whole.as_str()),
                place,
            )
        })?;
        out.push_str(&text[last..whole.start()].replace('@', &plain));
        out.push_str(&value.to_string());
        last = whole.end();
    }
    out.push_str(&text[last..].replace('@', &plain));
    Ok(out)
}

fn shift(index: i64, sign: &str, digits: &str) -> Option<i64> {
    let amount: i64 = digits.parse().ok()?;
    if sign == "+" {
        index.checked_add(amount)
    } else {
        index.checked_sub(amount)
    }
}
