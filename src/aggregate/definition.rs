//! Aggregate definitions and the closed set of operations

use super::error::AggregateError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Sum,
    Count,
    Min,
    Max,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Sum => "sum",
            Operation::Count => "count",
            Operation::Min => "min",
            Operation::Max => "max",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AggregateError> {
        match s {
            "sum" => Ok(Operation::Sum),
            "count" => Ok(Operation::Count),
            "min" => Ok(Operation::Min),
            "max" => Ok(Operation::Max),
            other => Err(AggregateError::UnknownOperation(other.to_string())),
        }
    }

    /// Accumulator value before any observation
    ///
    /// Min/Max start at the far end of the f64 range so the first real value
    /// always replaces them.
    pub fn initial_value(&self) -> f64 {
        match self {
            Operation::Sum | Operation::Count => 0.0,
            Operation::Min => f64::MAX,
            Operation::Max => -f64::MAX,
        }
    }

    /// Whether the operation reads the input field at all
    pub fn needs_input(&self) -> bool {
        !matches!(self, Operation::Count)
    }

    /// Next accumulator value
    ///
    /// Count ignores `value` and always adds one. Sum/Min/Max leave the
    /// accumulator unchanged when `value` is `None`.
    pub fn apply(&self, acc: f64, value: Option<f64>) -> f64 {
        match (self, value) {
            (Operation::Count, _) => acc + 1.0,
            (Operation::Sum, Some(v)) => acc + v,
            (Operation::Min, Some(v)) => acc.min(v),
            (Operation::Max, Some(v)) => acc.max(v),
            (_, None) => acc,
        }
    }
}

/// One configured aggregate, shared by the conntrack and extract paths
///
/// Conntrack uses `input`/`output`/`split_ab`; extract uses `record_key`
/// (an alias of `input`) and `by`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateDefinition {
    pub name: String,
    pub operation: String,
    #[serde(default, alias = "record_key", skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, alias = "splitAB")]
    pub split_ab: bool,
    #[serde(default)]
    pub by: Vec<String>,
}

impl AggregateDefinition {
    pub fn new(name: &str, operation: &str) -> Self {
        Self {
            name: name.to_string(),
            operation: operation.to_string(),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, input: &str) -> Self {
        self.input = Some(input.to_string());
        self
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.output = Some(output.to_string());
        self
    }

    pub fn split_by_direction(mut self) -> Self {
        self.split_ab = true;
        self
    }

    pub fn group_by(mut self, fields: &[&str]) -> Self {
        self.by = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Reject empty names and unknown operations
    pub fn validate(&self) -> Result<Operation, AggregateError> {
        if self.name.is_empty() {
            return Err(AggregateError::EmptyName);
        }
        Operation::parse(&self.operation)
    }

    /// Field read from each record on the conntrack path; falls back to `name`
    /// when no input is set
    pub fn input_field(&self) -> &str {
        match self.input.as_deref() {
            Some(input) if !input.is_empty() => input,
            _ => &self.name,
        }
    }

    /// Configured input text verbatim; the extract path reads and reports
    /// exactly this field
    pub fn record_key(&self) -> &str {
        self.input.as_deref().unwrap_or("")
    }

    pub fn output_field_base(&self) -> &str {
        match self.output.as_deref() {
            Some(output) if !output.is_empty() => output,
            _ => &self.name,
        }
    }
}
