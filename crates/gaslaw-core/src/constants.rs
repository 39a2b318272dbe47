//! Single source of truth for shared constants.
//! Every value here is a default; `SimConfig` can override the tunable ones.

/// Gas constant in L·atm/(mol·K).
pub const GAS_CONSTANT: f64 = 0.082057;

/// Particles rendered per mole of gas. A visualization scale, not physics.
pub const MOLE_SCALE: f64 = 20.0;

/// Container half-size per square root of volume: half_size = 5 * sqrt(V).
pub const CONTAINER_SCALE: f64 = 5.0;

/// Fixed simulation tick in seconds (60 Hz).
pub const TICK_INTERVAL: f64 = 1.0 / 60.0;

/// Frame deltas longer than this are clamped before reaching the clock.
pub const MAX_FRAME_DELTA: f64 = 0.25;

/// Velocity solver iterations per physics step.
pub const VELOCITY_ITERATIONS: u32 = 3;

/// Position solver iterations per physics step.
pub const POSITION_ITERATIONS: u32 = 6;

/// Particle disc radius in world units.
pub const PARTICLE_RADIUS: f64 = 3.0 / 16.0;

/// Particle density (mass per unit area).
pub const PARTICLE_DENSITY: f64 = 1.0;

/// Thickness of each container wall.
pub const WALL_THICKNESS: f64 = 3.0;

/// Distance kept between newly spawned particles and the container edge.
pub const SPAWN_MARGIN: f64 = WALL_THICKNESS / 2.0;

/// Contacts closing slower than this are resolved inelastically by the
/// physics engine. Zero keeps every contact elastic; any positive value
/// must stay below the thermal speed at the coldest allowed temperature.
pub const VELOCITY_THRESHOLD: f64 = 0.0;

/// Standard temperature in Kelvin.
pub const STP_TEMPERATURE: f64 = 273.15;

/// Standard pressure in atm.
pub const STP_PRESSURE: f64 = 1.0;

/// Moles at the STP preset.
pub const STP_MOLES: f64 = 1.0;

/// Slider range for moles.
pub const MOLES_RANGE: (f64, f64) = (0.0, 10.0);

/// Slider range for volume (L).
pub const VOLUME_RANGE: (f64, f64) = (1.0, 50.0);

/// Slider range for temperature (K).
pub const TEMPERATURE_RANGE: (f64, f64) = (0.1, 2000.0);

/// Slider range for pressure (atm).
pub const PRESSURE_RANGE: (f64, f64) = (0.0, 100.0);
