//! Scenario runner: plans every scenario up front, then runs each against its
//! own page session

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use formcheck_steps::{ScenarioPlan, StepOutcome, StepRegistry};

use crate::config::RunnerConfig;
use crate::error::{E2eError, E2eResult};
use crate::form_steps::{form_registry, FormTarget, FormWorld};
use crate::page::SessionLauncher;
use crate::playwright::{PlaywrightLauncher, PlaywrightSession};
use crate::simulated::{SimulatedLauncher, SimulatedPage};
use crate::spec::ScenarioSpec;

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepOutcome>,
    pub error: Option<String>,
}

impl TestResult {
    fn failed(name: &str, error: String) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration_ms: 0,
            steps: vec![],
            error: Some(error),
        }
    }
}

/// Result of running all selected scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs form scenarios
pub struct TestRunner {
    registry: StepRegistry<FormWorld>,
    launcher: Box<dyn SessionLauncher>,
    target: FormTarget,
    specs_dir: PathBuf,
    output_dir: PathBuf,
}

impl TestRunner {
    /// Create a runner using the launcher the configuration asks for
    pub fn from_config(config: RunnerConfig) -> E2eResult<Self> {
        let launcher: Box<dyn SessionLauncher> = if config.simulate {
            Box::new(SimulatedLauncher::new(SimulatedPage::new(config.form.clone())))
        } else {
            PlaywrightSession::check_playwright_installed()?;
            Box::new(PlaywrightLauncher::new(config.playwright.clone()))
        };
        Self::with_launcher(config, launcher)
    }

    /// Create a runner with a custom session launcher
    pub fn with_launcher(config: RunnerConfig, launcher: Box<dyn SessionLauncher>) -> E2eResult<Self> {
        config.validate()?;
        let registry = form_registry()?;
        debug!("{} step definitions registered", registry.len());

        Ok(Self {
            registry,
            launcher,
            target: config.form,
            specs_dir: config.specs_dir,
            output_dir: config.output_dir,
        })
    }

    pub fn registry(&self) -> &StepRegistry<FormWorld> {
        &self.registry
    }

    /// Run all scenarios in the specs directory
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        let specs = ScenarioSpec::load_all(&self.specs_dir)?;
        self.run_specs(&specs).await
    }

    /// Run scenarios carrying a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        let specs = ScenarioSpec::load_all(&self.specs_dir)?;
        let filtered: Vec<ScenarioSpec> = ScenarioSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_specs(&filtered).await
    }

    /// Run a specific scenario by name
    pub async fn run_test(&self, name: &str) -> E2eResult<TestSuiteResult> {
        let specs = ScenarioSpec::load_all(&self.specs_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecNotFound(name.to_string()))?;
        self.run_specs(std::slice::from_ref(&spec)).await
    }

    /// Run a list of scenarios.
    ///
    /// Every scenario is resolved against the step table before any of them
    /// runs; an unknown, ambiguous or malformed step fails the whole run.
    pub async fn run_specs(&self, specs: &[ScenarioSpec]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();

        let plans = specs
            .iter()
            .map(|spec| self.registry.plan(&spec.name, &spec.steps))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Running {} scenario(s) on {}...", plans.len(), self.launcher.describe());

        let mut results = Vec::with_capacity(plans.len());
        let mut passed = 0;
        let mut failed = 0;

        for plan in &plans {
            let result = match self.run_plan(plan).await {
                Ok(result) => result,
                Err(e) => TestResult::failed(plan.name(), e.to_string()),
            };

            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!("✗ {} - {}", result.name, result.error.as_deref().unwrap_or("unknown error"));
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Scenario results: {} passed, {} failed ({} ms)", passed, failed, duration_ms);

        Ok(TestSuiteResult {
            run_id: Uuid::new_v4(),
            started_at,
            total: plans.len(),
            passed,
            failed,
            duration_ms,
            results,
        })
    }

    /// Run a single scenario
    pub async fn run_spec(&self, spec: &ScenarioSpec) -> E2eResult<TestResult> {
        let plan = self.registry.plan(&spec.name, &spec.steps)?;
        self.run_plan(&plan).await
    }

    async fn run_plan(&self, plan: &ScenarioPlan<'_, FormWorld>) -> E2eResult<TestResult> {
        debug!("Running scenario: {}", plan.name());

        let page = self.launcher.launch().await?;
        let mut world = FormWorld::new(page, self.target.clone());

        let report = plan.execute(&mut world).await;

        // The page is released whether or not the scenario passed
        if let Err(e) = world.page.close().await {
            warn!("Failed to close page for '{}': {}", plan.name(), e);
        }

        Ok(TestResult {
            success: report.success(),
            error: report.error_message(),
            name: report.name,
            duration_ms: report.duration_ms,
            steps: report.steps,
        })
    }

    /// Write results to `test-results.json` in the output directory
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
