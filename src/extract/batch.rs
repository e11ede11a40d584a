//! Batch aggregation: group records, update the cache, emit one record per touched group

use super::cache::{GroupAggregateCache, GroupAggregateEntry, GroupKey};
use crate::aggregate::{AggregateDefinition, AggregateError, Operation};
use crate::record::{label_text, read_f64, GenericMap};
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone)]
struct CompiledAggregate {
    definition: AggregateDefinition,
    operation: Operation,
}

/// Extract-stage aggregator
///
/// Owns its group cache, so state lives exactly as long as the stage instance.
#[derive(Debug)]
pub struct BatchAggregator {
    aggregates: Vec<CompiledAggregate>,
    cache: GroupAggregateCache,
}

impl BatchAggregator {
    /// Build the aggregator, rejecting any definition that cannot run
    ///
    /// Sum, Min and Max read `record_key` from every record, so it must be set.
    pub fn new(definitions: Vec<AggregateDefinition>) -> Result<Self, AggregateError> {
        let aggregates = definitions
            .into_iter()
            .map(|definition| {
                let operation = definition.validate()?;
                if operation.needs_input() && definition.record_key().is_empty() {
                    return Err(AggregateError::MissingRecordKey(definition.name));
                }
                Ok(CompiledAggregate {
                    definition,
                    operation,
                })
            })
            .collect::<Result<Vec<_>, AggregateError>>()?;

        Ok(Self {
            aggregates,
            cache: GroupAggregateCache::new(),
        })
    }

    pub fn cache(&self) -> &GroupAggregateCache {
        &self.cache
    }

    /// Process one batch and return the aggregate records for every group it touched
    ///
    /// Output order across groups is not meaningful.
    pub fn extract(&mut self, batch: &[GenericMap]) -> Vec<GenericMap> {
        let mut touched: Vec<(usize, GroupKey)> = Vec::new();
        let mut seen: HashSet<GroupKey> = HashSet::new();

        for (idx, agg) in self.aggregates.iter().enumerate() {
            let definition = &agg.definition;

            for record in batch {
                let Some(labels) = group_labels(record, &definition.by) else {
                    log::debug!(
                        "aggregate {}: record missing a group-by field, skipped",
                        definition.name
                    );
                    continue;
                };

                let value = if agg.operation.needs_input() {
                    match read_f64(record, definition.record_key()) {
                        Ok(v) => Some(v),
                        Err(e) => {
                            log::warn!("aggregate {}: {}, record skipped", definition.name, e);
                            continue;
                        }
                    }
                } else {
                    None
                };

                let values: Vec<String> = labels.iter().map(|(_, v)| label_text(v)).collect();
                let key = GroupKey::new(&definition.name, &values);

                let entry = self
                    .cache
                    .get_or_create(key.clone(), agg.operation, || labels);

                if seen.insert(key.clone()) {
                    entry.begin_batch();
                    touched.push((idx, key));
                }
                entry.observe(agg.operation, value);
            }
        }

        let outputs: Vec<GenericMap> = touched
            .iter()
            .filter_map(|(idx, key)| {
                let agg = &self.aggregates[*idx];
                self.cache
                    .get(key)
                    .map(|entry| output_record(&agg.definition, agg.operation, key, entry))
            })
            .collect();

        log::debug!(
            "batch of {} records produced {} aggregate records ({} groups cached)",
            batch.len(),
            outputs.len(),
            self.cache.len()
        );

        outputs
    }
}

/// Group-by field values in declared order, or `None` if any is missing
fn group_labels(record: &GenericMap, by: &[String]) -> Option<Vec<(String, Value)>> {
    by.iter()
        .map(|field| record.get(field).map(|v| (field.clone(), v.clone())))
        .collect()
}

/// Fixed six-decimal rendering used for emitted values
pub fn format_value(value: f64) -> String {
    format!("{:.6}", value)
}

fn output_record(
    definition: &AggregateDefinition,
    operation: Operation,
    key: &GroupKey,
    entry: &GroupAggregateEntry,
) -> GenericMap {
    let mut out = GenericMap::new();
    out.insert("name".to_string(), Value::from(definition.name.clone()));
    out.insert("record_key".to_string(), Value::from(definition.record_key()));
    out.insert("by".to_string(), Value::from(definition.by.join(",")));
    out.insert("aggregate".to_string(), Value::from(key.values.clone()));

    for (field, value) in &entry.labels {
        out.insert(field.clone(), value.clone());
    }

    let value = format_value(entry.accumulated_value);
    out.insert("operation".to_string(), Value::from(operation.as_str()));
    out.insert("value".to_string(), Value::from(value.clone()));
    out.insert(format!("{}_value", definition.name), Value::from(value));
    out.insert(
        "recentRawValues".to_string(),
        Value::from(entry.recent_raw_values.clone()),
    );
    out.insert(
        "count".to_string(),
        Value::from(entry.cumulative_count.to_string()),
    );
    out
}
