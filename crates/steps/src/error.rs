//! Error types for step registration, resolution and execution

use thiserror::Error;

use crate::kind::StepKind;

/// Result type alias using [`StepError`]
pub type StepResult<T> = std::result::Result<T, StepError>;

/// Step error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("Duplicate step definition: {kind} \"{pattern}\" is already registered")]
    DuplicatePattern { kind: StepKind, pattern: String },

    #[error("Invalid step pattern \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("No step definition matches: {line}")]
    NoMatch { line: String },

    #[error("Ambiguous step \"{line}\" matches {} definitions: {}", .patterns.len(), .patterns.join(" | "))]
    AmbiguousMatch { line: String, patterns: Vec<String> },

    #[error("Step has no leading Given/When/Then keyword: {line}")]
    MissingKeyword { line: String },

    #[error("Cannot convert {value:?} to {expected} for placeholder {{{placeholder}}}")]
    TypeCoercion {
        placeholder: String,
        value: String,
        expected: &'static str,
    },

    #[error("Step argument {index} is missing")]
    MissingArgument { index: usize },

    #[error("Step argument {index} is {found}, expected {expected}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Cannot interact with {selector}: {reason}")]
    Interaction { selector: String, reason: String },

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Operation timeout after {ms}ms: {operation}")]
    Timeout { operation: String, ms: u64 },

    #[error("Page session error: {0}")]
    Session(String),

    #[error("Assertion failed: expected {expected:?}, got {}\n{report}", display_actual(.actual))]
    AssertionMismatch {
        expected: String,
        actual: Option<String>,
        report: String,
    },
}

fn display_actual(actual: &Option<String>) -> String {
    match actual {
        Some(text) => format!("{text:?}"),
        None => "null".to_string(),
    }
}

impl StepError {
    /// Whether this error comes from the step table rather than from running a step.
    ///
    /// Configuration errors are fatal to the whole run.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StepError::DuplicatePattern { .. }
                | StepError::InvalidPattern { .. }
                | StepError::NoMatch { .. }
                | StepError::AmbiguousMatch { .. }
                | StepError::MissingKeyword { .. }
        )
    }
}
