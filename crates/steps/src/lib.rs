//! formcheck step registry
//!
//! Binds human-readable scenario lines to async step handlers:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StepRegistry<C>                                             │
//! │    ├── register(kind, pattern, handler)                      │
//! │    ├── resolve(line) -> BoundStep { args, handler }          │
//! │    └── plan(name, lines) -> ScenarioPlan                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ScenarioPlan<C>                                             │
//! │    └── execute(&mut ctx) -> ScenarioReport                   │
//! │          steps run strictly in order, first error aborts     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers are plain functions returning a boxed future:
//!
//! ```
//! use formcheck_steps::{StepArgs, StepFuture, StepRegistry};
//!
//! #[derive(Default)]
//! struct Counter(i64);
//!
//! fn add(counter: &mut Counter, args: StepArgs) -> StepFuture<'_> {
//!     Box::pin(async move {
//!         counter.0 += args.int(0)?;
//!         Ok(())
//!     })
//! }
//!
//! let mut registry = StepRegistry::new();
//! registry.when("I add {int}", add).unwrap();
//! let step = registry.resolve("When I add 42").unwrap();
//! assert_eq!(step.args.int(0).unwrap(), 42);
//! ```

pub mod args;
pub mod assert;
pub mod error;
pub mod kind;
pub mod pattern;
pub mod registry;
pub mod scenario;

pub use args::{ParamValue, StepArgs};
pub use assert::assert_text_eq;
pub use error::{StepError, StepResult};
pub use kind::{StepKind, StepLine};
pub use pattern::{ParamType, StepPattern};
pub use registry::{BoundStep, StepDefinition, StepFn, StepFuture, StepRegistry};
pub use scenario::{ScenarioPlan, ScenarioReport, StepOutcome, StepStatus};
