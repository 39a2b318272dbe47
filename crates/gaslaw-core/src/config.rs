use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::engine::{MolesPolicy, StateEngine};
use crate::mode::{ConstraintMode, Quantity, ALL_QUANTITIES};
use crate::state::GasState;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config RON: {0}")]
    Parse(String),
    #[error("Invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Inclusive slider bounds for one quantity.
///
/// Advisory only: presentation layers clamp raw input with it, the engine
/// itself only rejects non-positive and non-finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantityRange {
    pub min: f64,
    pub max: f64,
}

impl QuantityRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Position of `value` within the range, 0.0–1.0. Used for slider
    /// placement and temperature tinting.
    pub fn fraction(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Slider bounds for all four quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ranges {
    pub pressure: QuantityRange,
    pub volume: QuantityRange,
    pub temperature: QuantityRange,
    pub moles: QuantityRange,
}

impl Default for Ranges {
    fn default() -> Self {
        Self {
            pressure: QuantityRange::new(PRESSURE_RANGE.0, PRESSURE_RANGE.1),
            volume: QuantityRange::new(VOLUME_RANGE.0, VOLUME_RANGE.1),
            temperature: QuantityRange::new(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1),
            moles: QuantityRange::new(MOLES_RANGE.0, MOLES_RANGE.1),
        }
    }
}

impl Ranges {
    pub fn get(&self, quantity: Quantity) -> QuantityRange {
        match quantity {
            Quantity::Pressure => self.pressure,
            Quantity::Volume => self.volume,
            Quantity::Temperature => self.temperature,
            Quantity::Moles => self.moles,
        }
    }
}

/// Starting point given as V, T and n; P is solved from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialState {
    pub volume: f64,
    pub temperature: f64,
    pub moles: f64,
}

/// Every tunable of the simulation. `Default` carries the reference values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// R in L·atm/(mol·K).
    pub gas_constant: f64,
    /// Particles per mole.
    pub mole_scale: f64,
    /// Fixed tick length in seconds.
    pub tick_interval: f64,
    /// Longest frame delta the clock accepts before clamping.
    pub max_frame_delta: f64,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    pub particle_radius: f64,
    pub particle_density: f64,
    pub wall_thickness: f64,
    /// Gap between the container edge and the spawn area.
    pub spawn_margin: f64,
    pub velocity_threshold: f64,
    pub moles_policy: MolesPolicy,
    pub initial_mode: ConstraintMode,
    /// None starts at STP.
    pub initial_state: Option<InitialState>,
    /// Fixed seed for reproducible spawns. None draws one at startup.
    pub seed: Option<u64>,
    pub ranges: Ranges,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gas_constant: GAS_CONSTANT,
            mole_scale: MOLE_SCALE,
            tick_interval: TICK_INTERVAL,
            max_frame_delta: MAX_FRAME_DELTA,
            velocity_iterations: VELOCITY_ITERATIONS,
            position_iterations: POSITION_ITERATIONS,
            particle_radius: PARTICLE_RADIUS,
            particle_density: PARTICLE_DENSITY,
            wall_thickness: WALL_THICKNESS,
            spawn_margin: SPAWN_MARGIN,
            velocity_threshold: VELOCITY_THRESHOLD,
            moles_policy: MolesPolicy::default(),
            initial_mode: ConstraintMode::default(),
            initial_state: None,
            seed: None,
            ranges: Ranges::default(),
        }
    }
}

impl SimConfig {
    /// Parse a RON config and validate it. Missing fields take defaults.
    pub fn from_ron(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        let config: SimConfig = options
            .from_str(ron_str)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("gas_constant", self.gas_constant)?;
        require_positive("mole_scale", self.mole_scale)?;
        require_positive("tick_interval", self.tick_interval)?;
        require_positive("particle_radius", self.particle_radius)?;
        require_positive("particle_density", self.particle_density)?;
        require_positive("wall_thickness", self.wall_thickness)?;
        if !self.max_frame_delta.is_finite() || self.max_frame_delta < self.tick_interval {
            return Err(ConfigError::Invalid {
                field: "max_frame_delta",
                reason: format!(
                    "must be at least tick_interval ({}), got {}",
                    self.tick_interval, self.max_frame_delta
                ),
            });
        }
        if !self.spawn_margin.is_finite() || self.spawn_margin < 0.0 {
            return Err(ConfigError::Invalid {
                field: "spawn_margin",
                reason: format!("must be finite and >= 0, got {}", self.spawn_margin),
            });
        }
        if !self.velocity_threshold.is_finite() || self.velocity_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "velocity_threshold",
                reason: format!("must be finite and >= 0, got {}", self.velocity_threshold),
            });
        }
        // Below this speed wall contacts lose their normal motion, so the
        // coldest particles would settle against the walls.
        let slowest_thermal_speed = (2.0 * self.ranges.temperature.min.max(0.0)).sqrt();
        if self.velocity_threshold > 0.0 && self.velocity_threshold >= slowest_thermal_speed {
            return Err(ConfigError::Invalid {
                field: "velocity_threshold",
                reason: format!(
                    "must be below the thermal speed {slowest_thermal_speed:.4} at the minimum \
                     temperature {}, got {}",
                    self.ranges.temperature.min, self.velocity_threshold
                ),
            });
        }
        if self.velocity_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "velocity_iterations",
                reason: "must be > 0".into(),
            });
        }
        if self.position_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "position_iterations",
                reason: "must be > 0".into(),
            });
        }
        for q in ALL_QUANTITIES {
            let range = self.ranges.get(q);
            if !(range.min.is_finite() && range.max.is_finite() && range.min <= range.max) {
                return Err(ConfigError::Invalid {
                    field: "ranges",
                    reason: format!("{q} range [{}, {}] is empty", range.min, range.max),
                });
            }
        }
        self.build_engine().map(|_| ())
    }

    /// The starting state described by this config.
    pub fn initial_gas_state(&self) -> GasState {
        match self.initial_state {
            Some(init) => GasState::from_volume_temperature_moles(
                init.volume,
                init.temperature,
                init.moles,
                self.gas_constant,
            ),
            None => GasState::stp(self.gas_constant),
        }
    }

    /// Construct the state engine this config describes.
    pub fn build_engine(&self) -> Result<StateEngine, ConfigError> {
        StateEngine::with_state(
            self.initial_gas_state(),
            self.initial_mode,
            self.gas_constant,
            self.moles_policy,
        )
        .map_err(|e| ConfigError::Invalid {
            field: "initial_state",
            reason: e.to_string(),
        })
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be finite and > 0, got {value}"),
        })
    }
}
