//! Connection seam used by the conntrack aggregators

use crate::record::GenericMap;
use serde_json::Value;
use std::collections::BTreeMap;

/// Connection collaborator owned by the external connection manager
///
/// `update_agg_value` must apply `f` as a single read-modify-write on the
/// named accumulator; `&mut self` gives that for free within one thread.
pub trait Connection {
    /// Identity used in log lines
    fn id(&self) -> &str;

    /// Create an accumulator with its initial value
    fn add_agg(&mut self, field: &str, init: f64);

    /// Replace the accumulator with `f(current)`
    fn update_agg_value(&mut self, field: &str, f: &mut dyn FnMut(f64) -> f64);
}

/// In-memory connection holding identity fields and aggregate state
#[derive(Debug, Clone, Default)]
pub struct FlowConnection {
    id: String,
    keys: GenericMap,
    aggregates: BTreeMap<String, f64>,
}

impl FlowConnection {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Attach the identity fields (addresses, ports, protocol) copied into outputs
    pub fn with_keys(mut self, keys: GenericMap) -> Self {
        self.keys = keys;
        self
    }

    pub fn agg(&self, field: &str) -> Option<f64> {
        self.aggregates.get(field).copied()
    }

    pub fn aggregates(&self) -> &BTreeMap<String, f64> {
        &self.aggregates
    }

    /// Identity fields merged with every accumulator
    pub fn to_record(&self) -> GenericMap {
        let mut record = self.keys.clone();
        for (field, value) in &self.aggregates {
            record.insert(field.clone(), Value::from(*value));
        }
        record
    }
}

impl Connection for FlowConnection {
    fn id(&self) -> &str {
        &self.id
    }

    fn add_agg(&mut self, field: &str, init: f64) {
        self.aggregates.insert(field.to_string(), init);
    }

    fn update_agg_value(&mut self, field: &str, f: &mut dyn FnMut(f64) -> f64) {
        match self.aggregates.get_mut(field) {
            Some(curr) => *curr = f(*curr),
            None => log::warn!(
                "connection {} has no aggregate field {}, update dropped",
                self.id,
                field
            ),
        }
    }
}
