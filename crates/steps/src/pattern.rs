//! Step pattern compilation
//!
//! A pattern is literal text interleaved with typed placeholders:
//!
//! ```text
//! the user enters {string} into the message field
//! the user waits {int} seconds
//! ```
//!
//! Each pattern compiles once into an anchored [`Regex`] with one capture
//! group per placeholder. Literal text is escaped, `\{` and `\}` stand for
//! literal braces.

use regex::Regex;

use crate::args::{ParamValue, StepArgs};
use crate::error::{StepError, StepResult};

/// Declared type of a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// `{string}`: single- or double-quoted text
    String,
    /// `{int}`: signed 64-bit integer
    Int,
    /// `{float}`: 64-bit float
    Float,
    /// `{word}`: a single whitespace-free token
    Word,
    /// `{}`: any text
    Any,
}

impl ParamType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(ParamType::String),
            "int" => Some(ParamType::Int),
            "float" => Some(ParamType::Float),
            "word" => Some(ParamType::Word),
            "" => Some(ParamType::Any),
            _ => None,
        }
    }

    /// Name as written between the braces
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Word => "word",
            ParamType::Any => "",
        }
    }

    // Numeric placeholders take any token so that bad input surfaces as a
    // coercion error instead of a missing match.
    fn regex(&self) -> &'static str {
        match self {
            ParamType::String => r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#,
            ParamType::Int | ParamType::Float | ParamType::Word => r"\S+",
            ParamType::Any => r".*",
        }
    }

    /// Convert a raw capture to this type.
    pub fn coerce(&self, raw: &str) -> StepResult<ParamValue> {
        let mismatch = |expected: &'static str| StepError::TypeCoercion {
            placeholder: self.name().to_string(),
            value: raw.to_string(),
            expected,
        };

        match self {
            ParamType::String => unquote(raw)
                .map(ParamValue::Str)
                .ok_or_else(|| mismatch("quoted string")),
            ParamType::Int => raw
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| mismatch("integer")),
            ParamType::Float => raw
                .parse::<f64>()
                .map(ParamValue::Float)
                .map_err(|_| mismatch("float")),
            ParamType::Word | ParamType::Any => Ok(ParamValue::Str(raw.to_string())),
        }
    }
}

/// Strip the surrounding quotes and unescape `\"` and `\'`.
fn unquote(raw: &str) -> Option<String> {
    let quote = raw.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = raw
        .strip_prefix(quote)?
        .strip_suffix(quote)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some('"' | '\'')) {
            continue;
        }
        out.push(c);
    }
    Some(out)
}

/// A compiled step pattern
#[derive(Debug, Clone)]
pub struct StepPattern {
    source: String,
    regex: Regex,
    params: Vec<ParamType>,
}

impl StepPattern {
    pub fn compile(source: &str) -> StepResult<Self> {
        let invalid = |reason: String| StepError::InvalidPattern {
            pattern: source.to_string(),
            reason,
        };

        let mut expr = String::with_capacity(source.len() * 2 + 2);
        expr.push('^');
        let mut literal = String::new();
        let mut params = Vec::new();

        let mut chars = source.char_indices().peekable();
        while let Some((pos, c)) = chars.next() {
            match c {
                '\\' => match chars.peek() {
                    Some(&(_, escaped @ ('{' | '}' | '\\'))) => {
                        literal.push(escaped);
                        chars.next();
                    }
                    _ => literal.push('\\'),
                },
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(invalid(format!("nested '{{' in placeholder at byte {pos}"))),
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(invalid(format!("unclosed placeholder at byte {pos}")));
                    }

                    let ty = ParamType::from_name(name.trim())
                        .ok_or_else(|| invalid(format!("unknown placeholder type {{{name}}}")))?;

                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                    expr.push('(');
                    expr.push_str(ty.regex());
                    expr.push(')');
                    params.push(ty);
                }
                '}' => return Err(invalid(format!("unmatched '}}' at byte {pos}"))),
                other => literal.push(other),
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            source: source.to_string(),
            regex,
            params,
        })
    }

    /// Pattern text as registered
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Raw placeholder captures when `text` matches, in declaration order.
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    /// Coerce raw captures into typed arguments.
    pub fn bind(&self, raw: &[String]) -> StepResult<StepArgs> {
        let values = self
            .params
            .iter()
            .zip(raw)
            .map(|(ty, value)| ty.coerce(value))
            .collect::<StepResult<Vec<_>>>()?;
        Ok(StepArgs::new(values))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}
