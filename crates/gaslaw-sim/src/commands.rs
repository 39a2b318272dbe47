use std::fmt;

use gaslaw_core::{ConstraintMode, Quantity};
use serde::{Deserialize, Serialize};

/// A user edit routed through `Simulation::apply`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Edit {
    /// Slider edit of one quantity.
    Set(Quantity, f64),
    SetMode(ConstraintMode),
    /// The mode toggle button: ConstVolume → ConstTemperature → ConstPressure.
    CycleMode,
    ResetToStp,
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::Set(q, v) => write!(f, "set {q} = {v} {}", q.unit()),
            Edit::SetMode(mode) => write!(f, "mode {mode}"),
            Edit::CycleMode => write!(f, "cycle mode"),
            Edit::ResetToStp => write!(f, "reset to STP"),
        }
    }
}
