//! Per-connection aggregate registry for the conntrack path

use super::connection::Connection;
use crate::aggregate::{AggregateDefinition, AggregateError, Direction, OperationInstance};
use crate::record::GenericMap;

/// All configured output-field operations applied to every connection
#[derive(Debug, Clone, Default)]
pub struct ConnectionAggregateRegistry {
    aggregators: Vec<OperationInstance>,
}

impl ConnectionAggregateRegistry {
    /// Build every operation up front; the first bad definition fails the whole set
    pub fn new(definitions: &[AggregateDefinition]) -> Result<Self, AggregateError> {
        let aggregators = definitions
            .iter()
            .map(OperationInstance::new)
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("conntrack registry built with {} aggregators", aggregators.len());
        Ok(Self { aggregators })
    }

    /// Whether any aggregate needs an AB/BA direction on update
    pub fn requires_direction(&self) -> bool {
        self.aggregators.iter().any(|a| a.split_ab())
    }

    /// Initialize accumulators on a newly created connection
    pub fn add_fields<C: Connection + ?Sized>(&self, conn: &mut C) {
        for agg in &self.aggregators {
            agg.add_field(conn);
        }
    }

    /// Apply one record attributed to `conn`
    ///
    /// Data errors only skip the affected field. A missing direction on a split
    /// aggregate aborts the update and is returned to the caller.
    pub fn update<C: Connection + ?Sized>(
        &self,
        conn: &mut C,
        record: &GenericMap,
        direction: Direction,
    ) -> Result<(), AggregateError> {
        // Reject before touching any field so the connection is never half-updated
        if direction == Direction::NA {
            if let Some(agg) = self.aggregators.iter().find(|a| a.split_ab()) {
                return Err(AggregateError::DirectionRequired(agg.output_field().to_string()));
            }
        }

        for agg in &self.aggregators {
            agg.update(conn, record, direction)?;
        }
        Ok(())
    }
}
