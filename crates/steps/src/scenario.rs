//! Ordered execution of a resolved scenario

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StepError;
use crate::registry::BoundStep;

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
    /// Not run because an earlier step failed
    Skipped,
}

/// Result of executing a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: String,
    pub pattern: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of executing a whole scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: Vec<StepOutcome>,
    pub duration_ms: u64,
    /// The error that aborted the scenario, if any
    #[serde(skip)]
    pub failure: Option<StepError>,
}

impl ScenarioReport {
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn error_message(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }
}

/// A scenario whose every line resolved to exactly one step definition
pub struct ScenarioPlan<'r, C> {
    name: String,
    steps: Vec<BoundStep<'r, C>>,
}

impl<C> std::fmt::Debug for ScenarioPlan<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioPlan")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .finish()
    }
}

impl<'r, C> ScenarioPlan<'r, C> {
    pub(crate) fn new(name: &str, steps: Vec<BoundStep<'r, C>>) -> Self {
        Self {
            name: name.to_string(),
            steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[BoundStep<'r, C>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run the steps in order against `ctx`.
    ///
    /// Each step is awaited before the next starts. The first error aborts the
    /// scenario; the remaining steps are reported as skipped.
    pub async fn execute(&self, ctx: &mut C) -> ScenarioReport {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(self.steps.len());
        let mut failure: Option<StepError> = None;

        debug!("Running scenario: {}", self.name);

        for step in &self.steps {
            let pattern = step.definition().pattern.source().to_string();

            if failure.is_some() {
                outcomes.push(StepOutcome {
                    step: step.line.to_string(),
                    pattern,
                    status: StepStatus::Skipped,
                    duration_ms: 0,
                    error: None,
                });
                continue;
            }

            let step_start = Instant::now();
            let result = step.invoke(ctx).await;
            let duration_ms = step_start.elapsed().as_millis() as u64;

            match result {
                Ok(()) => {
                    info!("  ✓ {} ({} ms)", step.line, duration_ms);
                    outcomes.push(StepOutcome {
                        step: step.line.to_string(),
                        pattern,
                        status: StepStatus::Passed,
                        duration_ms,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("  ✗ {} - {}", step.line, e);
                    outcomes.push(StepOutcome {
                        step: step.line.to_string(),
                        pattern,
                        status: StepStatus::Failed,
                        duration_ms,
                        error: Some(e.to_string()),
                    });
                    failure = Some(e);
                }
            }
        }

        ScenarioReport {
            name: self.name.clone(),
            steps: outcomes,
            duration_ms: start.elapsed().as_millis() as u64,
            failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::StepArgs;
    use crate::registry::{StepFuture, StepRegistry};

    /// Records the order in which steps ran and what each one saw
    #[derive(Default)]
    struct Form {
        field: Option<String>,
        display: Option<String>,
        trace: Vec<&'static str>,
    }

    fn fill(form: &mut Form, args: StepArgs) -> StepFuture<'_> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            form.field = Some(args.str(0)?.to_string());
            form.trace.push("fill");
            Ok(())
        })
    }

    fn submit(form: &mut Form, _: StepArgs) -> StepFuture<'_> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            form.display = form.field.clone();
            form.trace.push("submit");
            Ok(())
        })
    }

    fn check(form: &mut Form, args: StepArgs) -> StepFuture<'_> {
        Box::pin(async move {
            form.trace.push("check");
            crate::assert::assert_text_eq(args.str(0)?, form.display.as_deref())
        })
    }

    fn registry() -> StepRegistry<Form> {
        let mut registry = StepRegistry::new();
        registry
            .when("the user enters {string}", fill)
            .unwrap()
            .when("the user submits", submit)
            .unwrap()
            .then("the page shows {string}", check)
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_steps_observe_earlier_side_effects() {
        let registry = registry();
        let plan = registry
            .plan(
                "ordered",
                [
                    "When the user enters \"hello world\"",
                    "And the user submits",
                    "Then the page shows \"hello world\"",
                ],
            )
            .unwrap();

        let mut form = Form::default();
        let report = plan.execute(&mut form).await;

        assert!(report.success(), "{:?}", report.error_message());
        assert_eq!(form.trace, vec!["fill", "submit", "check"]);
        assert!(report.steps.iter().all(|s| s.status == StepStatus::Passed));
        assert_eq!(report.steps[1].step, "And the user submits");
    }

    #[tokio::test]
    async fn test_failure_skips_remaining_steps() {
        let registry = registry();
        let plan = registry
            .plan(
                "skip",
                [
                    "When the user enters \"hello\"",
                    "Then the page shows \"hello\"",
                    "When the user submits",
                ],
            )
            .unwrap();

        let mut form = Form::default();
        let report = plan.execute(&mut form).await;

        assert!(!report.success());
        assert_eq!(form.trace, vec!["fill", "check"]);
        let statuses: Vec<StepStatus> = report.steps.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![StepStatus::Passed, StepStatus::Failed, StepStatus::Skipped]
        );
        assert!(matches!(
            report.failure,
            Some(StepError::AssertionMismatch { actual: None, .. })
        ));
    }

    #[test]
    fn test_report_serializes_without_failure_object() {
        let report = ScenarioReport {
            name: "n".into(),
            steps: vec![StepOutcome {
                step: "Given x".into(),
                pattern: "x".into(),
                status: StepStatus::Skipped,
                duration_ms: 0,
                error: None,
            }],
            duration_ms: 1,
            failure: Some(StepError::NoMatch { line: "y".into() }),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0]["status"], "skipped");
        assert!(json.get("failure").is_none());
    }
}
