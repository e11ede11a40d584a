//! Group aggregate cache owned by one extract stage

use crate::aggregate::Operation;
use serde_json::Value;
use std::collections::HashMap;

/// Cache key: aggregate name plus the group-by values joined with ","
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub definition: String,
    pub values: String,
}

impl GroupKey {
    pub fn new(definition: &str, values: &[String]) -> Self {
        Self {
            definition: definition.to_string(),
            values: values.join(","),
        }
    }
}

/// Running state for one (aggregate, group) pair
///
/// `accumulated_value` and `cumulative_count` live as long as the entry.
/// `recent_raw_values` only holds what the current batch contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregateEntry {
    pub labels: Vec<(String, Value)>,
    pub accumulated_value: f64,
    pub cumulative_count: u64,
    pub recent_raw_values: Vec<f64>,
}

impl GroupAggregateEntry {
    pub fn new(operation: Operation, labels: Vec<(String, Value)>) -> Self {
        Self {
            labels,
            accumulated_value: operation.initial_value(),
            cumulative_count: 0,
            recent_raw_values: Vec::new(),
        }
    }

    /// Drop the previous batch's raw values
    pub fn begin_batch(&mut self) {
        self.recent_raw_values.clear();
    }

    /// Fold one matched record into the entry
    ///
    /// Count records a sentinel 1.0 raw value since it has no input.
    pub fn observe(&mut self, operation: Operation, value: Option<f64>) {
        self.accumulated_value = operation.apply(self.accumulated_value, value);
        self.recent_raw_values.push(value.unwrap_or(1.0));
        self.cumulative_count += 1;
    }
}

#[derive(Debug, Default)]
pub struct GroupAggregateCache {
    entries: HashMap<GroupKey, GroupAggregateEntry>,
}

impl GroupAggregateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&GroupAggregateEntry> {
        self.entries.get(key)
    }

    /// Existing entry for `key`, or a fresh one at the operation's initial value
    pub fn get_or_create(
        &mut self,
        key: GroupKey,
        operation: Operation,
        labels: impl FnOnce() -> Vec<(String, Value)>,
    ) -> &mut GroupAggregateEntry {
        self.entries
            .entry(key)
            .or_insert_with(|| GroupAggregateEntry::new(operation, labels()))
    }
}
