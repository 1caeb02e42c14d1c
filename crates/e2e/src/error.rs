//! Error types for the scenario runner

use thiserror::Error;

use formcheck_steps::StepError;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Scenario spec parse error: {0}")]
    SpecParse(String),

    #[error("Scenario not found: {0}")]
    SpecNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageError;

    #[test]
    fn test_page_failures_surface_as_step_errors() {
        let err: E2eError = StepError::from(PageError::Closed).into();
        assert!(matches!(err, E2eError::Step(StepError::Session(_))));
        assert_eq!(err.to_string(), "Page session error: Page session is closed");
    }
}
