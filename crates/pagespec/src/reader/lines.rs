//! Indentation tokenizer.
//!
//! Splits spec text into logical lines with provenance. A line is either
//! unindented (a directive, header, object name or definition) or belongs
//! to the indented block that follows the last unindented line. Every line
//! of one block must use the same indentation.

use crate::place::Place;
use crate::result::{SpecError, SpecResult};

/// Widest indentation accepted for one level
pub const MAX_INDENTATION: usize = 8;

/// One non-blank, non-comment line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Text without surrounding whitespace
    pub text: String,
    /// Where the line was read from
    pub place: Place,
    /// Line belongs to an indented block
    pub indented: bool,
}

/// Split text into lines, numbering from `line_offset + 1`
///
/// # Errors
///
/// Returns [`SpecError::Indentation`] for tabs or other non-space leading
/// whitespace, for indentation wider than
/// [`MAX_INDENTATION`] and for blocks that mix indentation widths
pub fn tokenize(text: &str, file_path: &str, line_offset: usize) -> SpecResult<Vec<Line>> {
    let mut lines = Vec::new();
    let mut block_indent: Option<usize> = None;

    for (number, raw) in text.lines().enumerate() {
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        let place = Place::new(file_path, line_offset + number + 1);
        let leading = &raw[..raw.len() - raw.trim_start().len()];
        if leading.contains('\t') {
            return Err(SpecError::indentation(
                "Should not use tabs. Use spaces",
                &place,
            ));
        }
        if leading.chars().any(|c| c != ' ') {
            return Err(SpecError::indentation(
                "Should use only spaces for indentation",
                &place,
            ));
        }

        let indent = leading.chars().count();
        if indent > 0 {
            match block_indent {
                None if indent > MAX_INDENTATION => {
                    return Err(SpecError::indentation(
                        "Use from 1 to 8 spaces for indentation",
                        &place,
                    ));
                }
                None => block_indent = Some(indent),
                Some(width) if width != indent => {
                    return Err(SpecError::indentation(
                        "You should use same indentation within one spec",
                        &place,
                    ));
                }
                Some(_) => {}
            }
        } else {
            block_indent = None;
        }

        lines.push(Line {
            text: content.to_string(),
            place,
            indented: indent > 0,
        });
    }
    Ok(lines)
}
