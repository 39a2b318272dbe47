use thiserror::Error;

use crate::mode::{ConstraintMode, Quantity};

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, GasError>;

/// Reasons a state edit is rejected. The state is never mutated when one
/// of these is returned, and every variant is recoverable by issuing a
/// valid edit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GasError {
    /// Non-finite or non-positive P/V/T, or negative/non-finite n.
    #[error("invalid {quantity}: {value}")]
    InvalidInput { quantity: Quantity, value: f64 },

    /// The dependent recompute would divide by zero or overflow.
    #[error("cannot recompute {quantity}: indeterminate result")]
    ArithmeticIndeterminate { quantity: Quantity },

    /// A supplied starting state does not satisfy the gas law.
    #[error("inconsistent state: PV = {pv} but nRT = {nrt}")]
    Inconsistent { pv: f64, nrt: f64 },

    /// The setter targets the variable the active mode holds fixed.
    #[error("{quantity} is held fixed under {mode}")]
    FrozenQuantity {
        quantity: Quantity,
        mode: ConstraintMode,
    },
}
