//! Step registry: pattern → handler table and line resolution

use futures::future::BoxFuture;
use tracing::debug;

use crate::args::StepArgs;
use crate::error::{StepError, StepResult};
use crate::kind::{StepKind, StepLine};
use crate::pattern::StepPattern;
use crate::scenario::ScenarioPlan;

/// Future returned by a step handler
pub type StepFuture<'a> = BoxFuture<'a, StepResult<()>>;

/// Step handler signature.
///
/// The handler borrows the scenario context for the duration of its future,
/// so a step cannot outlive the scenario it runs in.
pub type StepFn<C> = for<'a> fn(&'a mut C, StepArgs) -> StepFuture<'a>;

/// A registered (kind, pattern, handler) binding
pub struct StepDefinition<C> {
    pub kind: StepKind,
    pub pattern: StepPattern,
    handler: StepFn<C>,
}

impl<C> std::fmt::Debug for StepDefinition<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepDefinition")
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.source())
            .finish()
    }
}

/// A resolved scenario line: the matching definition plus its bound arguments
pub struct BoundStep<'r, C> {
    pub line: StepLine,
    pub args: StepArgs,
    definition: &'r StepDefinition<C>,
}

impl<'r, C> BoundStep<'r, C> {
    pub fn definition(&self) -> &'r StepDefinition<C> {
        self.definition
    }

    /// Run the handler against `ctx`. The caller must await the returned
    /// future before invoking the next step.
    pub fn invoke<'a>(&self, ctx: &'a mut C) -> StepFuture<'a> {
        (self.definition.handler)(ctx, self.args.clone())
    }
}

impl<C> std::fmt::Debug for BoundStep<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundStep")
            .field("line", &self.line)
            .field("args", &self.args)
            .field("pattern", &self.definition.pattern.source())
            .finish()
    }
}

/// Ordered table of step definitions for context type `C`
pub struct StepRegistry<C> {
    definitions: Vec<StepDefinition<C>>,
}

impl<C> std::fmt::Debug for StepRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.definitions).finish()
    }
}

impl<C> Default for StepRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> StepRegistry<C> {
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// Add a binding. Fails if the same (kind, pattern) pair is already
    /// registered or the pattern does not compile.
    pub fn register(&mut self, kind: StepKind, pattern: &str, handler: StepFn<C>) -> StepResult<&mut Self> {
        if self
            .definitions
            .iter()
            .any(|d| d.kind == kind && d.pattern.source() == pattern)
        {
            return Err(StepError::DuplicatePattern {
                kind,
                pattern: pattern.to_string(),
            });
        }

        let pattern = StepPattern::compile(pattern)?;
        debug!("Registered step: {} {}", kind, pattern.source());

        self.definitions.push(StepDefinition {
            kind,
            pattern,
            handler,
        });
        Ok(self)
    }

    pub fn given(&mut self, pattern: &str, handler: StepFn<C>) -> StepResult<&mut Self> {
        self.register(StepKind::Given, pattern, handler)
    }

    pub fn when(&mut self, pattern: &str, handler: StepFn<C>) -> StepResult<&mut Self> {
        self.register(StepKind::When, pattern, handler)
    }

    pub fn then(&mut self, pattern: &str, handler: StepFn<C>) -> StepResult<&mut Self> {
        self.register(StepKind::Then, pattern, handler)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definitions(&self) -> &[StepDefinition<C>] {
        &self.definitions
    }

    /// Resolve a keyword-prefixed line such as `Given the user is on the form page`.
    pub fn resolve(&self, line: &str) -> StepResult<BoundStep<'_, C>> {
        let line = StepLine::parse(line, None)?;
        self.resolve_line(line)
    }

    /// Resolve text that has already been classified by kind.
    pub fn resolve_step(&self, kind: StepKind, text: &str) -> StepResult<BoundStep<'_, C>> {
        self.resolve_line(StepLine {
            kind,
            keyword: kind.as_str().to_string(),
            text: text.to_string(),
        })
    }

    pub fn resolve_line(&self, line: StepLine) -> StepResult<BoundStep<'_, C>> {
        let mut matches: Vec<(&StepDefinition<C>, Vec<String>)> = self
            .definitions
            .iter()
            .filter(|d| d.kind == line.kind)
            .filter_map(|d| d.pattern.captures(&line.text).map(|raw| (d, raw)))
            .collect();

        let (definition, raw) = match matches.len() {
            0 => {
                return Err(StepError::NoMatch {
                    line: line.to_string(),
                })
            }
            1 => matches.remove(0),
            _ => {
                return Err(StepError::AmbiguousMatch {
                    line: line.to_string(),
                    patterns: matches
                        .iter()
                        .map(|(d, _)| d.pattern.source().to_string())
                        .collect(),
                })
            }
        };

        let args = definition.pattern.bind(&raw)?;
        debug!("Resolved '{}' -> {}", line, definition.pattern.source());

        Ok(BoundStep {
            line,
            args,
            definition,
        })
    }

    /// Resolve every line of a scenario before anything runs.
    ///
    /// `And`, `But` and `*` lines take the kind of the line before them.
    pub fn plan<I, S>(&self, name: &str, lines: I) -> StepResult<ScenarioPlan<'_, C>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut steps = Vec::new();
        let mut previous = None;

        for line in lines {
            let parsed = StepLine::parse(line.as_ref(), previous)?;
            previous = Some(parsed.kind);
            steps.push(self.resolve_line(parsed)?);
        }

        Ok(ScenarioPlan::new(name, steps))
    }
}
