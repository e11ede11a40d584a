//! Extract aggregation
//!
//! ```text
//! batch of GenericMap
//!     ↓
//! BatchAggregator::extract (per definition: group key, numeric input)
//!     ↓
//! GroupAggregateCache (accumulated value, cumulative count, batch raw values)
//!     ↓
//! one GenericMap per touched (definition, group)
//! ```

pub mod batch;
pub mod cache;

pub use batch::{format_value, BatchAggregator};
pub use cache::{GroupAggregateCache, GroupAggregateEntry, GroupKey};
