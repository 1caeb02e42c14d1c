//! Runner configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{E2eError, E2eResult};
use crate::form_steps::FormTarget;
use crate::playwright::PlaywrightConfig;

/// Runner configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory searched for scenario YAML files
    pub specs_dir: PathBuf,

    /// Where `test-results.json` is written
    pub output_dir: PathBuf,

    /// Run against the in-memory form instead of a browser
    pub simulate: bool,

    pub playwright: PlaywrightConfig,

    pub form: FormTarget,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            specs_dir: PathBuf::from("tests/specs"),
            output_dir: PathBuf::from("test-results"),
            simulate: true,
            playwright: PlaywrightConfig::default(),
            form: FormTarget::default(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise defaults.
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> E2eResult<()> {
        let form = &self.form;
        for (field, value) in [
            ("form.url", &form.url),
            ("form.message_selector", &form.message_selector),
            ("form.submit_selector", &form.submit_selector),
            ("form.display_selector", &form.display_selector),
        ] {
            if value.trim().is_empty() {
                return Err(E2eError::Config(format!("{field} must not be empty")));
            }
        }
        if self.playwright.timeout_ms == 0 {
            return Err(E2eError::Config("playwright.timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playwright::Browser;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formcheck.toml");
        std::fs::write(
            &path,
            r##"
simulate = false
output_dir = "out"

[playwright]
browser = "firefox"

[form]
url = "http://127.0.0.1:8080/simple-form"
"##,
        )
        .unwrap();

        let config = RunnerConfig::from_file(&path).unwrap();
        assert!(!config.simulate);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.specs_dir, PathBuf::from("tests/specs"));
        assert_eq!(config.playwright.browser, Browser::Firefox);
        assert_eq!(config.form.url, "http://127.0.0.1:8080/simple-form");
        assert_eq!(config.form.message_selector, "#user-message");
    }

    #[test]
    fn test_empty_selector_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formcheck.toml");
        std::fs::write(&path, "[form]\nsubmit_selector = \"\"\n").unwrap();

        let err = RunnerConfig::from_file(&path).unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: form.submit_selector must not be empty");
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(RunnerConfig::load(None).unwrap(), RunnerConfig::default());
    }
}
