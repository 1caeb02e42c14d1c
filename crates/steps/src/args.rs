//! Typed values extracted from a matched scenario line

use serde::{Deserialize, Serialize};

use crate::error::{StepError, StepResult};

/// A placeholder capture after coercion to its declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl ParamValue {
    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Str(_) => "string",
            ParamValue::Int(_) => "integer",
            ParamValue::Float(_) => "float",
        }
    }
}

/// Arguments handed to a step handler, in placeholder declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepArgs(Vec<ParamValue>);

impl StepArgs {
    pub fn new(values: Vec<ParamValue>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[ParamValue] {
        &self.0
    }

    fn get(&self, index: usize) -> StepResult<&ParamValue> {
        self.0.get(index).ok_or(StepError::MissingArgument { index })
    }

    /// String argument at `index`.
    pub fn str(&self, index: usize) -> StepResult<&str> {
        match self.get(index)? {
            ParamValue::Str(s) => Ok(s),
            other => Err(StepError::ArgumentType {
                index,
                expected: "string",
                found: other.type_name(),
            }),
        }
    }

    pub fn int(&self, index: usize) -> StepResult<i64> {
        match self.get(index)? {
            ParamValue::Int(n) => Ok(*n),
            other => Err(StepError::ArgumentType {
                index,
                expected: "integer",
                found: other.type_name(),
            }),
        }
    }

    /// Float argument at `index`; integer captures widen.
    pub fn float(&self, index: usize) -> StepResult<f64> {
        match self.get(index)? {
            ParamValue::Float(f) => Ok(*f),
            ParamValue::Int(n) => Ok(*n as f64),
            other => Err(StepError::ArgumentType {
                index,
                expected: "float",
                found: other.type_name(),
            }),
        }
    }
}
