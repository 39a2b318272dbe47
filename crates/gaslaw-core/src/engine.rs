//! Constrained-variable solver for PV = nRT.
//!
//! Every setter validates its input, computes the complete next state into a
//! local value, checks the dependent quantity it recomputed, and only then
//! commits. A rejected edit leaves the engine exactly as it was.

use serde::{Deserialize, Serialize};

use crate::constants::GAS_CONSTANT;
use crate::error::{GasError, Result};
use crate::mode::{ConstraintMode, Quantity};
use crate::state::GasState;

/// What `set_moles` recomputes under `ConstPressure`.
///
/// Under the other two modes moles always drive pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MolesPolicy {
    /// Keep V, recompute T = PV/(nR). Density changes with n.
    #[default]
    AdjustTemperature,
    /// Keep T, recompute V = nRT/P. Density stays constant.
    AdjustVolume,
}

/// Owns the live `GasState` and the active constraint mode.
#[derive(Debug, Clone)]
pub struct StateEngine {
    state: GasState,
    mode: ConstraintMode,
    gas_constant: f64,
    moles_policy: MolesPolicy,
}

impl Default for StateEngine {
    fn default() -> Self {
        Self::new(GAS_CONSTANT)
    }
}

impl StateEngine {
    /// Engine at STP under `ConstVolume`.
    pub fn new(gas_constant: f64) -> Self {
        Self {
            state: GasState::stp(gas_constant),
            mode: ConstraintMode::default(),
            gas_constant,
            moles_policy: MolesPolicy::default(),
        }
    }

    /// Engine starting from an explicit state. The state must already
    /// satisfy PV = nRT and the per-quantity sign rules.
    pub fn with_state(
        state: GasState,
        mode: ConstraintMode,
        gas_constant: f64,
        moles_policy: MolesPolicy,
    ) -> Result<Self> {
        positive(Quantity::Volume, state.volume)?;
        positive(Quantity::Temperature, state.temperature)?;
        non_negative(Quantity::Moles, state.moles)?;
        non_negative(Quantity::Pressure, state.pressure)?;
        if !state.is_consistent(gas_constant, 1e-9) {
            return Err(GasError::Inconsistent {
                pv: state.pressure * state.volume,
                nrt: state.moles * gas_constant * state.temperature,
            });
        }
        Ok(Self {
            state,
            mode,
            gas_constant,
            moles_policy,
        })
    }

    /// Current snapshot.
    pub fn state(&self) -> GasState {
        self.state
    }

    /// Active constraint mode.
    pub fn mode(&self) -> ConstraintMode {
        self.mode
    }

    /// Gas constant R used by every recompute.
    pub fn gas_constant(&self) -> f64 {
        self.gas_constant
    }

    pub fn moles_policy(&self) -> MolesPolicy {
        self.moles_policy
    }

    pub fn set_moles_policy(&mut self, policy: MolesPolicy) {
        self.moles_policy = policy;
    }

    /// Switch modes. Never touches the state.
    pub fn set_mode(&mut self, mode: ConstraintMode) {
        if mode != self.mode {
            log::debug!("constraint mode {} -> {}", self.mode, mode);
        }
        self.mode = mode;
    }

    /// Advance to the next mode in toggle order and return it.
    pub fn cycle_mode(&mut self) -> ConstraintMode {
        self.set_mode(self.mode.next());
        self.mode
    }

    /// Restore the STP preset. The mode is kept.
    pub fn reset_to_stp(&mut self) -> GasState {
        self.state = GasState::stp(self.gas_constant);
        log::debug!("reset to STP: {:?}", self.state);
        self.state
    }

    /// Dispatch to the setter for `quantity`.
    pub fn set(&mut self, quantity: Quantity, value: f64) -> Result<GasState> {
        match quantity {
            Quantity::Pressure => self.set_pressure(value),
            Quantity::Volume => self.set_volume(value),
            Quantity::Temperature => self.set_temperature(value),
            Quantity::Moles => self.set_moles(value),
        }
    }

    /// Set P. ConstVolume recomputes T, ConstTemperature recomputes V.
    pub fn set_pressure(&mut self, p: f64) -> Result<GasState> {
        positive(Quantity::Pressure, p)?;
        let s = self.state;
        let r = self.gas_constant;
        let next = match self.mode {
            ConstraintMode::ConstVolume => GasState {
                pressure: p,
                temperature: derived_positive(
                    Quantity::Temperature,
                    p * s.volume,
                    s.moles * r,
                )?,
                ..s
            },
            ConstraintMode::ConstTemperature => GasState {
                pressure: p,
                volume: derived_positive(Quantity::Volume, s.moles * r * s.temperature, p)?,
                ..s
            },
            ConstraintMode::ConstPressure => return Err(self.frozen(Quantity::Pressure)),
        };
        Ok(self.commit(Quantity::Pressure, next))
    }

    /// Set V. ConstTemperature recomputes P, ConstPressure recomputes T.
    pub fn set_volume(&mut self, v: f64) -> Result<GasState> {
        positive(Quantity::Volume, v)?;
        let s = self.state;
        let r = self.gas_constant;
        let next = match self.mode {
            ConstraintMode::ConstTemperature => GasState {
                volume: v,
                pressure: derived_pressure(s.moles * r * s.temperature, v)?,
                ..s
            },
            ConstraintMode::ConstPressure => GasState {
                volume: v,
                temperature: derived_positive(
                    Quantity::Temperature,
                    s.pressure * v,
                    s.moles * r,
                )?,
                ..s
            },
            ConstraintMode::ConstVolume => return Err(self.frozen(Quantity::Volume)),
        };
        Ok(self.commit(Quantity::Volume, next))
    }

    /// Set T. ConstVolume recomputes P, ConstPressure recomputes V.
    pub fn set_temperature(&mut self, t: f64) -> Result<GasState> {
        positive(Quantity::Temperature, t)?;
        let s = self.state;
        let r = self.gas_constant;
        let next = match self.mode {
            ConstraintMode::ConstVolume => GasState {
                temperature: t,
                pressure: derived_pressure(s.moles * r * t, s.volume)?,
                ..s
            },
            ConstraintMode::ConstPressure => GasState {
                temperature: t,
                volume: derived_positive(Quantity::Volume, s.moles * r * t, s.pressure)?,
                ..s
            },
            ConstraintMode::ConstTemperature => {
                return Err(self.frozen(Quantity::Temperature))
            }
        };
        Ok(self.commit(Quantity::Temperature, next))
    }

    /// Set n. Volume is left alone unless the moles policy says otherwise
    /// under ConstPressure.
    pub fn set_moles(&mut self, m: f64) -> Result<GasState> {
        non_negative(Quantity::Moles, m)?;
        let s = self.state;
        let r = self.gas_constant;
        let next = match (self.mode, self.moles_policy) {
            (ConstraintMode::ConstVolume | ConstraintMode::ConstTemperature, _) => GasState {
                moles: m,
                pressure: derived_pressure(m * r * s.temperature, s.volume)?,
                ..s
            },
            (ConstraintMode::ConstPressure, MolesPolicy::AdjustTemperature) => GasState {
                moles: m,
                temperature: derived_positive(
                    Quantity::Temperature,
                    s.pressure * s.volume,
                    m * r,
                )?,
                ..s
            },
            (ConstraintMode::ConstPressure, MolesPolicy::AdjustVolume) => GasState {
                moles: m,
                volume: derived_positive(Quantity::Volume, m * r * s.temperature, s.pressure)?,
                ..s
            },
        };
        Ok(self.commit(Quantity::Moles, next))
    }

    fn commit(&mut self, edited: Quantity, next: GasState) -> GasState {
        log::debug!(
            "set {} under {}: P={:.4} V={:.4} T={:.4} n={:.4}",
            edited,
            self.mode,
            next.pressure,
            next.volume,
            next.temperature,
            next.moles
        );
        self.state = next;
        next
    }

    fn frozen(&self, quantity: Quantity) -> GasError {
        GasError::FrozenQuantity {
            quantity,
            mode: self.mode,
        }
    }
}

fn positive(quantity: Quantity, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GasError::InvalidInput { quantity, value })
    }
}

fn non_negative(quantity: Quantity, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(GasError::InvalidInput { quantity, value })
    }
}

/// numerator / denominator, rejecting a zero denominator or a non-finite result.
fn quotient(quantity: Quantity, numerator: f64, denominator: f64) -> Result<f64> {
    if denominator == 0.0 {
        return Err(GasError::ArithmeticIndeterminate { quantity });
    }
    let value = numerator / denominator;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GasError::ArithmeticIndeterminate { quantity })
    }
}

/// Recomputed V or T: must come out strictly positive.
fn derived_positive(quantity: Quantity, numerator: f64, denominator: f64) -> Result<f64> {
    let value = quotient(quantity, numerator, denominator)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(GasError::ArithmeticIndeterminate { quantity })
    }
}

/// Recomputed P: zero is allowed (empty container).
fn derived_pressure(numerator: f64, denominator: f64) -> Result<f64> {
    let value = quotient(Quantity::Pressure, numerator, denominator)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(GasError::ArithmeticIndeterminate {
            quantity: Quantity::Pressure,
        })
    }
}
