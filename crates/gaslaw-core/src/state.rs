use serde::{Deserialize, Serialize};

use crate::constants::{STP_MOLES, STP_PRESSURE, STP_TEMPERATURE};
use crate::mode::Quantity;

/// Snapshot of the four macroscopic quantities.
///
/// The engine owns the live copy; everything else reads snapshots. Pressure
/// is only ever zero when moles are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasState {
    /// Pressure in atm.
    pub pressure: f64,
    /// Volume in litres.
    pub volume: f64,
    /// Temperature in Kelvin.
    pub temperature: f64,
    /// Amount of gas in moles.
    pub moles: f64,
}

impl GasState {
    /// Standard temperature and pressure for one mole, with the volume
    /// solved from the gas constant (22.414 L for R = 0.082057).
    pub fn stp(gas_constant: f64) -> Self {
        Self {
            pressure: STP_PRESSURE,
            volume: STP_MOLES * gas_constant * STP_TEMPERATURE / STP_PRESSURE,
            temperature: STP_TEMPERATURE,
            moles: STP_MOLES,
        }
    }

    /// Build a state from V, T and n, solving P = nRT/V.
    pub fn from_volume_temperature_moles(
        volume: f64,
        temperature: f64,
        moles: f64,
        gas_constant: f64,
    ) -> Self {
        Self {
            pressure: moles * gas_constant * temperature / volume,
            volume,
            temperature,
            moles,
        }
    }

    /// Read one quantity by name.
    pub fn get(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Pressure => self.pressure,
            Quantity::Volume => self.volume,
            Quantity::Temperature => self.temperature,
            Quantity::Moles => self.moles,
        }
    }

    /// P·V − n·R·T.
    pub fn residual(&self, gas_constant: f64) -> f64 {
        self.pressure * self.volume - self.moles * gas_constant * self.temperature
    }

    /// Whether PV = nRT holds to within `eps`, relative to the larger side
    /// (absolute below magnitude 1).
    pub fn is_consistent(&self, gas_constant: f64, eps: f64) -> bool {
        let pv = (self.pressure * self.volume).abs();
        let nrt = (self.moles * gas_constant * self.temperature).abs();
        let scale = pv.max(nrt).max(1.0);
        self.residual(gas_constant).abs() <= eps * scale
    }
}
