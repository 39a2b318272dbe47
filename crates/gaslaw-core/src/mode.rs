use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four macroscopic quantities in PV = nRT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantity {
    Pressure,
    Volume,
    Temperature,
    Moles,
}

/// All four quantities in display order (P, V, n, T).
pub const ALL_QUANTITIES: [Quantity; 4] = [
    Quantity::Pressure,
    Quantity::Volume,
    Quantity::Moles,
    Quantity::Temperature,
];

impl Quantity {
    /// Short symbol used in labels.
    pub fn symbol(self) -> &'static str {
        match self {
            Quantity::Pressure => "P",
            Quantity::Volume => "V",
            Quantity::Temperature => "T",
            Quantity::Moles => "n",
        }
    }

    /// Display unit.
    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Pressure => "atm",
            Quantity::Volume => "L",
            Quantity::Temperature => "K",
            Quantity::Moles => "mol",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quantity::Pressure => "pressure",
            Quantity::Volume => "volume",
            Quantity::Temperature => "temperature",
            Quantity::Moles => "moles",
        };
        f.write_str(name)
    }
}

/// Which macroscopic variable is held fixed while the other two interact.
/// Moles are adjustable under every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConstraintMode {
    #[default]
    ConstVolume,
    ConstTemperature,
    ConstPressure,
}

/// Modes in toggle order.
pub const ALL_MODES: [ConstraintMode; 3] = [
    ConstraintMode::ConstVolume,
    ConstraintMode::ConstTemperature,
    ConstraintMode::ConstPressure,
];

impl ConstraintMode {
    /// The quantity this mode holds fixed.
    pub fn frozen(self) -> Quantity {
        match self {
            ConstraintMode::ConstVolume => Quantity::Volume,
            ConstraintMode::ConstTemperature => Quantity::Temperature,
            ConstraintMode::ConstPressure => Quantity::Pressure,
        }
    }

    /// The two quantities that respond to each other under this mode.
    pub fn active_pair(self) -> [Quantity; 2] {
        match self {
            ConstraintMode::ConstVolume => [Quantity::Pressure, Quantity::Temperature],
            ConstraintMode::ConstTemperature => [Quantity::Pressure, Quantity::Volume],
            ConstraintMode::ConstPressure => [Quantity::Volume, Quantity::Temperature],
        }
    }

    /// Whether an edit of `quantity` is offered under this mode.
    pub fn is_adjustable(self, quantity: Quantity) -> bool {
        quantity != self.frozen()
    }

    /// Next mode in toggle order, wrapping back to ConstVolume.
    pub fn next(self) -> Self {
        match self {
            ConstraintMode::ConstVolume => ConstraintMode::ConstTemperature,
            ConstraintMode::ConstTemperature => ConstraintMode::ConstPressure,
            ConstraintMode::ConstPressure => ConstraintMode::ConstVolume,
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            ConstraintMode::ConstVolume => "Const. V",
            ConstraintMode::ConstTemperature => "Const. T",
            ConstraintMode::ConstPressure => "Const. P",
        }
    }
}

impl fmt::Display for ConstraintMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
