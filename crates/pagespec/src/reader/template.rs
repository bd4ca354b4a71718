//! Property expansion and embedded expression substitution.

use crate::eval::{ExpressionEvaluator, Scope};
use crate::place::Place;
use crate::result::{SpecError, SpecResult};
use std::collections::BTreeMap;

/// Expand `${NAME}` and `$NAME` from the property set.
///
/// Unknown names are left as written so that `${...}` expressions reach the
/// evaluator untouched.
#[must_use]
pub fn expand_properties(text: &str, properties: &BTreeMap<String, String>) -> String {
    if properties.is_empty() || !text.contains('$') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };
        match properties.get(name.trim()) {
            Some(value) if !name.is_empty() => {
                out.push_str(value);
                rest = &after[consumed..];
            }
            _ => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replace every `${expression}` with its evaluated value
///
/// # Errors
///
/// Returns [`SpecError::Evaluation`] naming `place` when an expression fails
/// or is not closed
pub fn substitute_expressions(
    text: &str,
    place: &Place,
    evaluator: &dyn ExpressionEvaluator,
    scope: &Scope<'_>,
) -> SpecResult<String> {
    if !text.contains("${") {
        return Ok(text.to_string());
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let end = closing_brace(body).ok_or_else(|| {
            SpecError::evaluation(format!("Expression is not closed: {}", &rest[start..]), place)
        })?;
        let expression = &body[..end];
        let value = evaluator.evaluate(expression, scope).map_err(|e| {
            SpecError::evaluation(format!("Error evaluating \"{expression}\": {e}"), place)
        })?;
        out.push_str(&value.to_string());
        rest = &body[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Position of the brace closing an expression, skipping quoted text
fn closing_brace(body: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') if depth == 0 => return Some(i),
            (None, '}') => depth -= 1,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::eval::{BasicEvaluator, Value};
    use crate::locator::Locator;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    mod property_tests {
        use super::*;

        #[test]
        fn test_braced_and_bare() {
            let p = props(&[("USER", "john"), ("HOME_DIR", "/home")]);
            assert_eq!(
                expand_properties("hi ${USER} at $HOME_DIR!", &p),
                "hi john at /home!"
            );
        }

        #[test]
        fn test_unknown_left_intact() {
            let p = props(&[("USER", "john")]);
            assert_eq!(
                expand_properties("${index * 2} $OTHER", &p),
                "${index * 2} $OTHER"
            );
        }

        #[test]
        fn test_trailing_dollar() {
            let p = props(&[("A", "1")]);
            assert_eq!(expand_properties("cost $", &p), "cost $");
        }
    }

    mod expression_tests {
        use super::*;

        fn substitute(text: &str, vars: &[(&str, Value)]) -> SpecResult<String> {
            let variables: BTreeMap<String, Value> = vars
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect();
            let objects: BTreeMap<String, Locator> = BTreeMap::new();
            substitute_expressions(
                text,
                &Place::new("t.spec", 7),
                &BasicEvaluator,
                &Scope::new(&variables, &objects, None),
            )
        }

        #[test]
        fn test_index_expression() {
            let text = substitute("box-${index * 2 + 1}", &[("index", Value::Number(1.0))]);
            assert_eq!(text.unwrap(), "box-3");
        }

        #[test]
        fn test_several_expressions() {
            let text = substitute(
                "text is: ${greeting}, ${name}",
                &[
                    ("greeting", Value::Text("Hi".into())),
                    ("name", Value::Text("welcome".into())),
                ],
            );
            assert_eq!(text.unwrap(), "text is: Hi, welcome");
        }

        #[test]
        fn test_quoted_brace() {
            let text = substitute("${'}' + 1}", &[]);
            assert_eq!(text.unwrap(), "}1");
        }

        #[test]
        fn test_failure_names_place() {
            let err = substitute("width: ${missing}px", &[]).unwrap_err();
            assert!(matches!(err, SpecError::Evaluation { .. }));
            assert_eq!(err.line(), Some(7));
            assert!(err.message().contains("missing"));
        }

        #[test]
        fn test_unclosed() {
            assert!(substitute("width: ${1 + 2px", &[]).is_err());
        }
    }
}
