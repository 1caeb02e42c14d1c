//! Declarative YAML scenario files

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A scenario parsed from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Keyword-prefixed step lines, executed in order
    pub steps: Vec<String>,
}

impl ScenarioSpec {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        if spec.steps.is_empty() {
            return Err(E2eError::SpecParse(format!(
                "scenario '{}' has no steps",
                spec.name
            )));
        }
        Ok(spec)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios under a directory, ordered by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        paths.iter().map(|path| Self::from_file(path)).collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.has_tag(tag)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBMIT_FORM: &str = r#"
name: submit-form
description: Submitting a message echoes it back
tags:
  - form
  - smoke
steps:
  - Given the user is on the form page
  - When the user enters "hello world" into the message field
  - And the user clicks the submit button
  - Then the message "hello world" should be displayed on the page
"#;

    #[test]
    fn test_parse_scenario() {
        let spec = ScenarioSpec::from_yaml(SUBMIT_FORM).unwrap();
        assert_eq!(spec.name, "submit-form");
        assert_eq!(spec.steps.len(), 4);
        assert_eq!(
            spec.steps[1],
            r#"When the user enters "hello world" into the message field"#
        );
        assert!(spec.has_tag("smoke"));
    }

    #[test]
    fn test_scenario_without_steps_is_rejected() {
        let err = ScenarioSpec::from_yaml("name: empty\nsteps: []\n").unwrap_err();
        assert!(matches!(err, E2eError::SpecParse(_)));
    }

    #[test]
    fn test_load_all_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.yaml"), SUBMIT_FORM.replace("submit-form", "b")).unwrap();
        std::fs::write(
            dir.path().join("nested/a.yml"),
            "name: a\nsteps:\n  - Given the user is on the form page\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let specs = ScenarioSpec::load_all(dir.path()).unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);

        let smoke = ScenarioSpec::filter_by_tag(&specs, "smoke");
        assert_eq!(smoke.len(), 1);
        assert_eq!(smoke[0].name, "b");
    }

    #[test]
    fn test_bad_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "name: [unclosed").unwrap();
        let err = ScenarioSpec::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }
}
