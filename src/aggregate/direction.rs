//! Flow direction relative to a connection and directional field naming

use super::error::AggregateError;

/// Direction of a record within its connection
///
/// AB is the first-observed direction, BA the reverse. NA is used for
/// aggregates that are not split by direction. The connection manager
/// decides which one applies; nothing in this crate infers it.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    AB,
    BA,
    NA,
}

impl Direction {
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Direction::AB => Some("_AB"),
            Direction::BA => Some("_BA"),
            Direction::NA => None,
        }
    }
}

/// Resolve the output field name for `base`
///
/// Non-split fields always use `base`, whatever the direction. Split fields
/// need AB or BA.
pub fn output_field_name(
    base: &str,
    split_ab: bool,
    direction: Direction,
) -> Result<String, AggregateError> {
    if !split_ab {
        return Ok(base.to_string());
    }
    match direction.suffix() {
        Some(suffix) => Ok(format!("{}{}", base, suffix)),
        None => Err(AggregateError::DirectionRequired(base.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsplit_ignores_direction() {
        for d in [Direction::AB, Direction::BA, Direction::NA] {
            assert_eq!(output_field_name("bytes", false, d).unwrap(), "bytes");
        }
    }

    #[test]
    fn test_split_naming() {
        assert_eq!(output_field_name("bytes", true, Direction::AB).unwrap(), "bytes_AB");
        assert_eq!(output_field_name("bytes", true, Direction::BA).unwrap(), "bytes_BA");
    }

    #[test]
    fn test_split_without_direction() {
        assert_eq!(
            output_field_name("bytes", true, Direction::NA),
            Err(AggregateError::DirectionRequired("bytes".to_string()))
        );
    }
}
