//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// More entities were requested than the grid has cells.
    #[error("Too many entities: requested {requested}, capacity {capacity}")]
    OverCapacity { requested: usize, capacity: usize },

    /// A coordinate fell outside the grid. Never expected in normal operation.
    #[error("Invalid coordinate ({row}, {col}) for grid of side {side}")]
    InvalidCoordinate { row: usize, col: usize, side: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_capacity_message() {
        let err = Error::OverCapacity {
            requested: 300,
            capacity: 225,
        };
        assert_eq!(
            err.to_string(),
            "Too many entities: requested 300, capacity 225"
        );
    }

    #[test]
    fn test_config_message() {
        let err = Error::Config("grid_side must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: grid_side must be positive"
        );
    }
}
