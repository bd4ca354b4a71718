//! Embedded expression evaluation.
//!
//! The reader treats expression evaluation as an injected capability:
//! [`ExpressionEvaluator`] receives the expression text and a [`Scope`]
//! and returns a [`Value`]. [`BasicEvaluator`] is the default engine:
//! arithmetic, strings, variables, and a handful of page functions.

use crate::locator::{Locator, Rect};
use crate::page::Page;
use crate::range::fmt_px;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Result type for expression evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised by an expression evaluator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Variable is not bound in the scope
    #[error("Unknown variable: {name}")]
    UnknownVariable {
        /// Variable name
        name: String,
    },

    /// Function is not provided by the evaluator
    #[error("Unknown function: {name}")]
    UnknownFunction {
        /// Function name
        name: String,
    },

    /// Expression text is malformed
    #[error("Cannot parse expression \"{expression}\": {message}")]
    Parse {
        /// Expression text
        expression: String,
        /// What went wrong
        message: String,
    },

    /// Operand types do not fit the operator
    #[error("Type error: {message}")]
    Type {
        /// Error message
        message: String,
    },

    /// Division or remainder by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// A page function could not be answered
    #[error("{message}")]
    Page {
        /// Error message
        message: String,
    },
}

/// Value produced by an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// Text
    Text(String),
}

impl Value {
    /// Interpret a literal written in spec text: numbers become numbers,
    /// everything else stays text
    #[must_use]
    pub fn from_literal(text: &str) -> Self {
        text.trim()
            .parse::<f64>()
            .map_or_else(|_| Self::Text(text.to_string()), Self::Number)
    }

    fn as_number(&self) -> EvalResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Self::Text(t) => t.trim().parse().map_err(|_| EvalError::Type {
                message: format!("\"{t}\" is not a number"),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&fmt_px(*n)),
            Self::Text(t) => f.write_str(t),
        }
    }
}

/// Bindings visible to an expression
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    /// Declared variables, script definitions, and the active `index`
    pub variables: &'a BTreeMap<String, Value>,
    /// Objects declared so far
    pub objects: &'a BTreeMap<String, Locator>,
    /// Page the spec is compiled against, if any
    pub page: Option<&'a dyn Page>,
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("variables", self.variables)
            .field("objects", self.objects)
            .field("page", &self.page.is_some())
            .finish()
    }
}

impl<'a> Scope<'a> {
    /// Create a scope
    #[must_use]
    pub fn new(
        variables: &'a BTreeMap<String, Value>,
        objects: &'a BTreeMap<String, Locator>,
        page: Option<&'a dyn Page>,
    ) -> Self {
        Self {
            variables,
            objects,
            page,
        }
    }

    fn object_rect(&self, name: &str) -> EvalResult<Rect> {
        let page = self.page.ok_or_else(|| EvalError::Page {
            message: format!("Cannot look up \"{name}\": no page available"),
        })?;
        let locator = self.objects.get(name).ok_or_else(|| EvalError::Page {
            message: format!("Cannot find locator for \"{name}\""),
        })?;
        page.find_element(locator)
            .map(|element| element.rect())
            .ok_or_else(|| EvalError::Page {
                message: format!("\"{name}\" is absent on page"),
            })
    }

    fn count_objects(&self, pattern: &str) -> EvalResult<usize> {
        let regex = glob_regex(pattern)?;
        Ok(self.objects.keys().filter(|name| regex.is_match(name)).count())
    }
}

fn glob_regex(pattern: &str) -> EvalResult<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).map_err(|e| EvalError::Parse {
        expression: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Expression engine used by the spec reader
pub trait ExpressionEvaluator {
    /// Evaluate an expression
    ///
    /// # Errors
    ///
    /// Returns error if the expression is malformed or cannot be evaluated
    fn evaluate(&self, expression: &str, scope: &Scope<'_>) -> EvalResult<Value>;

    /// Run an auxiliary script and return the definitions it registers
    ///
    /// # Errors
    ///
    /// Returns error if the script cannot be evaluated
    fn load_script(
        &self,
        path: &Path,
        source: &str,
        scope: &Scope<'_>,
    ) -> EvalResult<Vec<(String, Value)>>;
}

/// Default expression engine.
///
/// Grammar: `expr := term (('+'|'-') term)*`, `term := unary (('*'|'/'|'%')
/// unary)*`, `unary := '-' unary | atom`, `atom := number | string | true |
/// false | ident | ident '(' args ')' | '(' expr ')'`.
///
/// Scripts are lines of `[var|let] name = expr[;]`; `//` starts a comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEvaluator;

impl BasicEvaluator {
    /// Create the evaluator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ExpressionEvaluator for BasicEvaluator {
    fn evaluate(&self, expression: &str, scope: &Scope<'_>) -> EvalResult<Value> {
        let tokens = tokenize(expression)?;
        let mut parser = ExprParser {
            expression,
            tokens: &tokens,
            pos: 0,
            scope,
        };
        let value = parser.expr()?;
        if parser.pos != tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(value)
    }

    fn load_script(
        &self,
        path: &Path,
        source: &str,
        scope: &Scope<'_>,
    ) -> EvalResult<Vec<(String, Value)>> {
        let mut variables = scope.variables.clone();
        let mut definitions = Vec::new();
        for raw in source.lines() {
            let line = raw.split("//").next().unwrap_or_default().trim();
            let line = line.trim_end_matches(';').trim();
            if line.is_empty() {
                continue;
            }
            let line = line
                .strip_prefix("var ")
                .or_else(|| line.strip_prefix("let "))
                .unwrap_or(line);
            let (name, expr) = line.split_once('=').ok_or_else(|| EvalError::Parse {
                expression: line.to_string(),
                message: format!("expected `name = expression` in {}", path.display()),
            })?;
            let name = name.trim().to_string();
            let value = {
                let local = Scope::new(&variables, scope.objects, scope.page);
                self.evaluate(expr.trim(), &local)?
            };
            variables.insert(name.clone(), value.clone());
            definitions.push((name, value));
        }
        Ok(definitions)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

fn tokenize(expression: &str) -> EvalResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expression.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text.parse().map_err(|_| EvalError::Parse {
                    expression: expression.to_string(),
                    message: format!("bad number {text}"),
                })?;
                tokens.push(Token::Number(number));
            }
            '"' | '\'' => {
                let quote = c;
                let start = i + 1;
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(EvalError::Parse {
                        expression: expression.to_string(),
                        message: "unterminated string".to_string(),
                    });
                }
                tokens.push(Token::Str(chars[start..i].iter().collect()));
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '-')
                {
                    i += 1;
                }
                // A trailing '-' belongs to a following subtraction
                while i > start + 1 && chars[i - 1] == '-' {
                    i -= 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            other => {
                return Err(EvalError::Parse {
                    expression: expression.to_string(),
                    message: format!("unexpected character '{other}'"),
                })
            }
        }
    }
    Ok(tokens)
}

struct ExprParser<'t, 's> {
    expression: &'t str,
    tokens: &'t [Token],
    pos: usize,
    scope: &'t Scope<'s>,
}

impl ExprParser<'_, '_> {
    fn error(&self, message: &str) -> EvalError {
        EvalError::Parse {
            expression: self.expression.to_string(),
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> EvalResult<Value> {
        let mut left = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let right = self.term()?;
            left = apply(op, &left, &right)?;
        }
        Ok(left)
    }

    fn term(&mut self) -> EvalResult<Value> {
        let mut left = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek().cloned() {
            self.pos += 1;
            let right = self.unary()?;
            left = apply(op, &left, &right)?;
        }
        Ok(left)
    }

    fn unary(&mut self) -> EvalResult<Value> {
        if self.peek() == Some(&Token::Op('-')) {
            self.pos += 1;
            let value = self.unary()?;
            return Ok(Value::Number(-value.as_number()?));
        }
        self.atom()
    }

    fn atom(&mut self) -> EvalResult<Value> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Value::Number(n)),
            Some(Token::Str(s)) => Ok(Value::Text(s)),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(self.error("expected ')'")),
                }
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let args = self.arguments()?;
                    return call(&name, &args, self.scope);
                }
                match name.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => self
                        .scope
                        .variables
                        .get(&name)
                        .cloned()
                        .ok_or(EvalError::UnknownVariable { name }),
                }
            }
            _ => Err(self.error("expected a value")),
        }
    }

    fn arguments(&mut self) -> EvalResult<Vec<Value>> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            match self.next() {
                Some(Token::Comma) => {}
                Some(Token::RParen) => return Ok(args),
                _ => return Err(self.error("expected ',' or ')'")),
            }
        }
    }
}

fn apply(op: char, left: &Value, right: &Value) -> EvalResult<Value> {
    if op == '+' && (matches!(left, Value::Text(_)) || matches!(right, Value::Text(_))) {
        return Ok(Value::Text(format!("{left}{right}")));
    }
    let (a, b) = (left.as_number()?, right.as_number()?);
    let result = match op {
        '+' => a + b,
        '-' => a - b,
        '*' => a * b,
        '/' | '%' if b == 0.0 => return Err(EvalError::DivisionByZero),
        '/' => a / b,
        _ => a % b,
    };
    Ok(Value::Number(result))
}

fn call(name: &str, args: &[Value], scope: &Scope<'_>) -> EvalResult<Value> {
    let single = || -> EvalResult<String> {
        match args {
            [arg] => Ok(arg.to_string()),
            _ => Err(EvalError::Type {
                message: format!("{name}() takes exactly one argument"),
            }),
        }
    };
    match name {
        "count" => Ok(Value::Number(scope.count_objects(&single()?)? as f64)),
        "left" => Ok(Value::Number(scope.object_rect(&single()?)?.left())),
        "top" => Ok(Value::Number(scope.object_rect(&single()?)?.top())),
        "right" => Ok(Value::Number(scope.object_rect(&single()?)?.right())),
        "bottom" => Ok(Value::Number(scope.object_rect(&single()?)?.bottom())),
        "width" => Ok(Value::Number(scope.object_rect(&single()?)?.width)),
        "height" => Ok(Value::Number(scope.object_rect(&single()?)?.height)),
        _ => Err(EvalError::UnknownFunction {
            name: name.to_string(),
        }),
    }
}
