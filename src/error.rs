//! Errors reported by the integrator.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrateError {
    /// The time grid is empty, contains a non-finite value, or decreases.
    #[error("invalid time grid: {reason}")]
    InvalidGrid { reason: GridDefect },

    #[error("initial state is empty")]
    InvalidInitialState,

    /// The model returned a derivative whose length differs from the state.
    #[error("model returned {found} derivatives at t = {t}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize, t: f64 },

    /// A conserved quantity moved further from its initial value than allowed.
    #[error("maximum drift {tolerance} exceeded (observed {drift})")]
    EnergyDrift { drift: f64, tolerance: f64 },
}

/// What is wrong with a rejected time grid.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GridDefect {
    #[error("no time points")]
    Empty,
    #[error("time point {index} is not finite")]
    NotFinite { index: usize },
    #[error("time point {index} is earlier than the one before it")]
    Decreasing { index: usize },
}

impl From<GridDefect> for IntegrateError {
    fn from(reason: GridDefect) -> IntegrateError {
        IntegrateError::InvalidGrid { reason }
    }
}
