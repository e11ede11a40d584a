//! Flow aggregation stage
//!
//! Computes running sum/count/min/max statistics over flow records, either per
//! connection (conntrack path) or per group of record fields across batches
//! (extract path).
//!
//! # Architecture
//!
//! ```text
//! flow record (GenericMap)
//!     ├─→ ConnectionAggregateRegistry ─→ Connection accumulators (per record, AB/BA aware)
//!     └─→ BatchAggregator ─→ GroupAggregateCache ─→ aggregate records (per batch)
//!                                                        ↓
//!                                              AggregateWriterBackend (JSONL)
//! ```

pub mod aggregate;
pub mod config;
pub mod conntrack;
pub mod extract;
pub mod record;
pub mod writer;

pub use aggregate::{AggregateDefinition, AggregateError, Direction, Operation, OperationInstance};
pub use conntrack::{Connection, ConnectionAggregateRegistry, FlowConnection};
pub use extract::{BatchAggregator, GroupAggregateCache, GroupAggregateEntry, GroupKey};
pub use record::{FieldError, GenericMap};
