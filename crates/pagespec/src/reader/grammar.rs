//! Spec line grammar.
//!
//! ```text
//! width: 100 to 200px            height: ~ 40px
//! near: button 10px left, 5 to 10px top
//! inside partly: container 0px top left
//! above: footer 20px             left of: sidebar
//! text trim lowercase is: hello  absent
//! component: components/menu.spec
//! ```

use crate::config::ReaderConfig;
use crate::place::Place;
use crate::range::{fmt_px, Location, Range, Side};
use crate::result::{SpecError, SpecResult};
use crate::spec::{SpecKind, TextCheck, TextOperation};
use regex::Regex;

/// Parse one spec line (without the warning marker)
///
/// # Errors
///
/// Returns a syntax error naming `place` for unknown specs, malformed ranges
/// and locations, and invalid regular expressions
pub fn parse_spec(text: &str, place: &Place, config: &ReaderConfig) -> SpecResult<SpecKind> {
    let (head, value) = match text.split_once(':') {
        Some((head, value)) => (head.trim(), value.trim()),
        None => (text.trim(), ""),
    };
    let ctx = Ctx { place, config };

    match head {
        "width" => Ok(SpecKind::Width {
            range: ctx.range(value)?,
        }),
        "height" => Ok(SpecKind::Height {
            range: ctx.range(value)?,
        }),
        "near" => {
            let (object, rest) = ctx.object(value)?;
            if rest.is_empty() {
                return Err(SpecError::syntax("There is no location defined", place));
            }
            Ok(SpecKind::Near {
                object,
                locations: ctx.locations(rest)?,
            })
        }
        "inside" | "inside partly" => {
            let (object, rest) = ctx.object(value)?;
            let locations = if rest.is_empty() {
                Vec::new()
            } else {
                ctx.locations(rest)?
            };
            Ok(SpecKind::Inside {
                object,
                locations,
                partly: head != "inside",
            })
        }
        "above" | "below" | "left of" | "right of" => {
            let (object, rest) = ctx.object(value)?;
            let range = if rest.is_empty() {
                None
            } else {
                Some(ctx.range(rest)?)
            };
            Ok(match head {
                "above" => SpecKind::Above { object, range },
                "below" => SpecKind::Below { object, range },
                "left of" => SpecKind::LeftOf { object, range },
                _ => SpecKind::RightOf { object, range },
            })
        }
        "absent" if value.is_empty() => Ok(SpecKind::Absent),
        "visible" if value.is_empty() => Ok(SpecKind::Visible),
        "component" => {
            if value.is_empty() {
                return Err(SpecError::syntax("Missing component path", place));
            }
            Ok(SpecKind::Component {
                path: value.to_string(),
            })
        }
        _ if head.starts_with("text ") => ctx.text(head, value, text),
        _ => Err(SpecError::syntax(format!("Unknown spec: {text}"), place)),
    }
}

/// Parse a range
///
/// # Errors
///
/// Returns a syntax error if the text is not a range or has `min > max`
pub fn parse_range(text: &str, place: &Place, config: &ReaderConfig) -> SpecResult<Range> {
    Ctx { place, config }.range(text)
}

struct Ctx<'a> {
    place: &'a Place,
    config: &'a ReaderConfig,
}

impl Ctx<'_> {
    fn error(&self, message: String) -> SpecError {
        SpecError::syntax(message, self.place)
    }

    fn range(&self, text: &str) -> SpecResult<Range> {
        let text = text.trim();
        if text.is_empty() {
            return Err(self.error("Missing range".to_string()));
        }
        if let Some(rest) = text.strip_prefix('>') {
            return Ok(Range::greater_than(self.number(rest, text)?));
        }
        if let Some(rest) = text.strip_prefix('<') {
            return Ok(Range::less_than(self.number(rest, text)?));
        }
        if let Some(rest) = text.strip_prefix('~') {
            return Ok(Range::approximate(
                self.number(rest, text)?,
                self.config.approximation,
            ));
        }
        if let Some((from, to)) = text.split_once(" to ") {
            let (min, max) = (self.number(from, text)?, self.number(to, text)?);
            if min > max {
                return Err(self.error(format!(
                    "Invalid range: {} is greater than {}",
                    fmt_px(min),
                    fmt_px(max)
                )));
            }
            return Ok(Range::between(min, max));
        }
        Ok(Range::exact(self.number(text, text)?))
    }

    fn number(&self, text: &str, range: &str) -> SpecResult<f64> {
        let text = text.trim();
        let text = text.strip_suffix("px").unwrap_or(text).trim_end();
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| self.error(format!("Cannot parse range: \"{range}\"")))
    }

    fn object<'v>(&self, value: &'v str) -> SpecResult<(String, &'v str)> {
        let (object, rest) = split_word(value);
        if object.is_empty() {
            return Err(self.error("Missing object name".to_string()));
        }
        Ok((object.to_string(), rest))
    }

    fn locations(&self, text: &str) -> SpecResult<Vec<Location>> {
        text.split(',').map(|part| self.location(part)).collect()
    }

    fn location(&self, text: &str) -> SpecResult<Location> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Err(self.error("There is no location defined".to_string()));
        }
        let split = words
            .iter()
            .position(|w| !is_range_word(w))
            .unwrap_or(words.len());
        let (range_words, side_words) = words.split_at(split);
        if range_words.is_empty() {
            return Err(self.error(format!("Cannot parse range: \"{}\"", text.trim())));
        }
        if side_words.is_empty() {
            return Err(self.error("Missing side".to_string()));
        }
        let sides = side_words
            .iter()
            .map(|w| {
                Side::parse(w).ok_or_else(|| self.error(format!("Unknown side: {w}")))
            })
            .collect::<SpecResult<Vec<_>>>()?;
        Ok(Location::new(self.range(&range_words.join(" "))?, sides))
    }

    fn text(&self, head: &str, value: &str, line: &str) -> SpecResult<SpecKind> {
        let words: Vec<&str> = head.split_whitespace().skip(1).collect();
        let Some((check_word, op_words)) = words.split_last() else {
            return Err(self.error(format!("Unknown spec: {line}")));
        };
        let check = TextCheck::parse(check_word)
            .ok_or_else(|| self.error(format!("Unknown text check: {check_word}")))?;
        let operations = op_words
            .iter()
            .map(|w| {
                TextOperation::parse(w)
                    .ok_or_else(|| self.error(format!("Unknown text operation: {w}")))
            })
            .collect::<SpecResult<Vec<_>>>()?;
        if check == TextCheck::Matches && compile_text_pattern(value).is_err() {
            return Err(self.error(format!("Incorrect regular expression: {value}")));
        }
        Ok(SpecKind::Text {
            check,
            expected: value.to_string(),
            operations,
        })
    }
}

/// Compile a `text matches` pattern: whole-string match, `.` matching newlines
///
/// # Errors
///
/// Returns error if the pattern is not a valid regular expression
pub fn compile_text_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?s)^(?:{pattern})$"))
}

fn is_range_word(word: &str) -> bool {
    word == "to"
        || word == "px"
        || word
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | '>' | '<' | '~'))
}

/// Split off the first whitespace-separated word
pub(crate) fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], text[pos..].trim()),
        None => (text, ""),
    }
}
