//! Aggregate definitions, operations and direction-aware naming

pub mod definition;
pub mod direction;
pub mod error;
pub mod operation;

pub use definition::{AggregateDefinition, Operation};
pub use direction::{output_field_name, Direction};
pub use error::AggregateError;
pub use operation::OperationInstance;
