pub mod clock;
pub mod commands;
pub mod particles;
pub mod physics;
pub mod pipeline;
pub mod rng;
pub mod thermostat;

pub use clock::SimulationClock;
pub use commands::Edit;
pub use physics::{BallisticWorld, BodyHandle, PhysicsWorld};
pub use pipeline::Simulation;
pub use thermostat::{Rescale, Thermostat, ThermostatReport};
