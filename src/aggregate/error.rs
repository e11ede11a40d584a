//! Configuration errors raised by aggregate construction and wiring

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateError {
    /// Aggregate definition has an empty name
    EmptyName,
    /// Operation text is not one of sum, count, min, max
    UnknownOperation(String),
    /// Extract aggregate that reads input has no record_key
    MissingRecordKey(String),
    /// A split aggregate was updated without an AB/BA direction
    DirectionRequired(String),
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::EmptyName => write!(f, "aggregate definition has an empty name"),
            AggregateError::UnknownOperation(op) => write!(f, "unknown operation: {:?}", op),
            AggregateError::MissingRecordKey(name) => {
                write!(f, "aggregate {} reads input but has no record_key", name)
            }
            AggregateError::DirectionRequired(field) => write!(
                f,
                "split aggregate {} cannot determine output field because direction is missing, check configuration",
                field
            ),
        }
    }
}

impl std::error::Error for AggregateError {}
