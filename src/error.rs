//! Error types for the matching core.

use thiserror::Error;

/// Errors the matching core can produce.
///
/// Precondition violations (out-of-range tick, zero quantity, double-free)
/// are not detected here; callers validate before submitting.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The order arena has no free slots left.
    ///
    /// Fills already applied by the failing call remain committed.
    #[error("order arena exhausted: all {capacity} slots in use")]
    CapacityExhausted {
        /// Total arena capacity
        capacity: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EngineError::CapacityExhausted { capacity: 64 };
        assert_eq!(err.to_string(), "order arena exhausted: all 64 slots in use");
    }
}
