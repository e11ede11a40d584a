//! Conntrack aggregation
//!
//! Registers accumulator fields on each connection handed over by the
//! connection manager and folds every attributed record into them. Connection
//! lifecycle (creation, direction assignment, eviction) stays with the manager.

pub mod connection;
pub mod registry;

pub use connection::{Connection, FlowConnection};
pub use registry::ConnectionAggregateRegistry;
