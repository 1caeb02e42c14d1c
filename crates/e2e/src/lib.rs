//! formcheck E2E runner
//!
//! Drives the message form scenario through the step registry:
//! - Parses declarative YAML scenarios made of keyword-prefixed step lines
//! - Resolves every line against the form step table before anything runs
//! - Executes each scenario against its own page session, either a
//!   Playwright-controlled browser or an in-memory simulation of the form
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── registry: StepRegistry<FormWorld>                    │
//! │    ├── launcher: dyn SessionLauncher                        │
//! │    │     ├── PlaywrightLauncher (node + playwright)         │
//! │    │     └── SimulatedLauncher  (in-memory form)            │
//! │    └── run_specs(specs) -> TestSuiteResult                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioSpec (YAML)                                        │
//! │    ├── name, description, tags                              │
//! │    └── steps:                                               │
//! │          - Given the user is on the form page               │
//! │          - When the user enters "..." into the message field│
//! │          - And the user clicks the submit button            │
//! │          - Then the message "..." should be displayed ...   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod form_steps;
pub mod harness;
pub mod page;
pub mod playwright;
pub mod runner;
pub mod simulated;
pub mod spec;

pub use config::RunnerConfig;
pub use error::{E2eError, E2eResult};
pub use form_steps::{form_registry, register_form_steps, FormTarget, FormWorld};
pub use page::{PageError, PageResult, PageSession, SessionLauncher};
pub use runner::{TestResult, TestRunner, TestSuiteResult};
pub use simulated::{PageOp, SimulatedLauncher, SimulatedPage};
pub use spec::ScenarioSpec;
