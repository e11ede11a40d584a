//! Per-field operation strategies applied to connection accumulators

use super::definition::{AggregateDefinition, Operation};
use super::direction::{output_field_name, Direction};
use super::error::AggregateError;
use crate::conntrack::Connection;
use crate::record::{read_f64, GenericMap};

/// Immutable operation built once from a validated definition
#[derive(Debug, Clone, PartialEq)]
pub struct OperationInstance {
    operation: Operation,
    input_field: String,
    output_field: String,
    split_ab: bool,
}

impl OperationInstance {
    pub fn new(definition: &AggregateDefinition) -> Result<Self, AggregateError> {
        let operation = definition.validate()?;
        Ok(Self {
            operation,
            input_field: definition.input_field().to_string(),
            output_field: definition.output_field_base().to_string(),
            split_ab: definition.split_ab,
        })
    }

    pub fn output_field(&self) -> &str {
        &self.output_field
    }

    pub fn split_ab(&self) -> bool {
        self.split_ab
    }

    pub fn initial_value(&self) -> f64 {
        self.operation.initial_value()
    }

    pub fn output_field_for(&self, direction: Direction) -> Result<String, AggregateError> {
        output_field_name(&self.output_field, self.split_ab, direction)
    }

    /// Register this operation's accumulator(s) on a new connection
    pub fn add_field<C: Connection + ?Sized>(&self, conn: &mut C) {
        let init = self.initial_value();
        let directions: &[Direction] = if self.split_ab {
            &[Direction::AB, Direction::BA]
        } else {
            &[Direction::NA]
        };
        for &direction in directions {
            if let Ok(field) = self.output_field_for(direction) {
                conn.add_agg(&field, init);
            }
        }
    }

    /// Fold one record into the connection's accumulator
    ///
    /// A missing or non-numeric input is logged and skipped (`Ok`). Updating a
    /// split field without an AB/BA direction is a wiring bug and returns
    /// `AggregateError::DirectionRequired`.
    pub fn update<C: Connection + ?Sized>(
        &self,
        conn: &mut C,
        record: &GenericMap,
        direction: Direction,
    ) -> Result<(), AggregateError> {
        let output_field = self.output_field_for(direction)?;

        let value = if self.operation.needs_input() {
            match read_f64(record, &self.input_field) {
                Ok(v) => Some(v),
                Err(e) => {
                    log::error!("error updating connection {}: {}", conn.id(), e);
                    return Ok(());
                }
            }
        } else {
            None
        };

        let operation = self.operation;
        conn.update_agg_value(&output_field, &mut |curr: f64| operation.apply(curr, value));
        Ok(())
    }
}
