//! Text equality assertion with a mismatch report

use crate::error::{StepError, StepResult};

/// Assert that observed text equals the expected value.
///
/// `actual` is `None` when the element exists but has no text content.
pub fn assert_text_eq(expected: &str, actual: Option<&str>) -> StepResult<()> {
    if actual == Some(expected) {
        return Ok(());
    }

    Err(StepError::AssertionMismatch {
        expected: expected.to_string(),
        actual: actual.map(str::to_string),
        report: mismatch_report(expected, actual),
    })
}

/// Render expected and actual values one above the other with a caret under
/// the first differing character.
pub fn mismatch_report(expected: &str, actual: Option<&str>) -> String {
    let Some(actual) = actual else {
        return format!("- expected: {expected:?}\n+ actual:   null");
    };

    let at = expected
        .chars()
        .zip(actual.chars())
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.chars().count().min(actual.chars().count()));

    // Column in the debug rendering, where quotes and control characters
    // take more than one column. The opening quote is included.
    let prefix: String = actual.chars().take(at).collect();
    let column = format!("{prefix:?}").chars().count() - 1;
    let marker = format!("{}^", " ".repeat(column));

    format!(
        "- expected: {expected:?}\n+ actual:   {actual:?}\n            {marker} first difference at char {at}"
    )
}
