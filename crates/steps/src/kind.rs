//! Step keywords and keyword-prefixed scenario lines

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StepError, StepResult};

/// Kind of a step definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Given,
    When,
    Then,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Given => "Given",
            StepKind::When => "When",
            StepKind::Then => "Then",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scenario line split into its effective kind and the text after the keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepLine {
    pub kind: StepKind,
    /// Keyword as written (`And`, `But` and `*` keep their spelling here)
    pub keyword: String,
    pub text: String,
}

impl StepLine {
    /// Parse a keyword-prefixed line.
    ///
    /// `And`, `But` and `*` continue the kind of `previous`; without a
    /// previous step they are rejected with [`StepError::MissingKeyword`].
    pub fn parse(line: &str, previous: Option<StepKind>) -> StepResult<Self> {
        let trimmed = line.trim();
        let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim_start()),
            None => (trimmed, ""),
        };

        let kind = match keyword {
            "Given" => Some(StepKind::Given),
            "When" => Some(StepKind::When),
            "Then" => Some(StepKind::Then),
            "And" | "But" | "*" => previous,
            _ => None,
        };

        match kind {
            Some(kind) if !rest.is_empty() => Ok(Self {
                kind,
                keyword: keyword.to_string(),
                text: rest.to_string(),
            }),
            _ => Err(StepError::MissingKeyword {
                line: trimmed.to_string(),
            }),
        }
    }
}

impl fmt::Display for StepLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Given the user is on the form page", StepKind::Given; "given")]
    #[test_case("When the user clicks the submit button", StepKind::When; "when")]
    #[test_case("  Then the message \"x\" should be displayed  ", StepKind::Then; "padded then")]
    fn test_parse_primary_keywords(line: &str, kind: StepKind) {
        let parsed = StepLine::parse(line, None).unwrap();
        assert_eq!(parsed.kind, kind);
        assert!(!parsed.text.starts_with(' '));
        assert!(!parsed.text.ends_with(' '));
    }

    #[test]
    fn test_continuation_inherits_previous_kind() {
        let parsed = StepLine::parse("And the user clicks the submit button", Some(StepKind::When)).unwrap();
        assert_eq!(parsed.kind, StepKind::When);
        assert_eq!(parsed.keyword, "And");
        assert_eq!(parsed.text, "the user clicks the submit button");
        assert_eq!(parsed.to_string(), "And the user clicks the submit button");
    }

    #[test_case("And something"; "and without previous")]
    #[test_case("the user is on the form page"; "no keyword")]
    #[test_case("Given"; "keyword only")]
    #[test_case("given lowercase keyword"; "lowercase")]
    fn test_parse_rejects(line: &str) {
        let err = StepLine::parse(line, None).unwrap_err();
        assert!(matches!(err, StepError::MissingKeyword { .. }));
    }
}
