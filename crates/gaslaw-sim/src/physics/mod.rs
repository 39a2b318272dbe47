//! Capability interface to the 2D rigid-body engine.
//!
//! The simulation only ever creates and destroys bodies, reads and writes
//! particle velocities, and steps the world. Any engine that can do that
//! with a gravity-free world, perfectly elastic frictionless contacts and
//! sleeping disabled can stand behind this trait.

pub mod ballistic;

use gaslaw_core::population::WallBox;
use gaslaw_core::SimConfig;
use glam::DVec2;

pub use ballistic::BallisticWorld;

/// Opaque body identifier issued by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// World-wide settings applied once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSettings {
    /// Always zero for the gas demo.
    pub gravity: DVec2,
    /// Contacts closing slower than this are resolved inelastically.
    pub velocity_threshold: f64,
    /// Must stay false: resting particles would stop representing heat.
    pub allow_sleep: bool,
}

impl WorldSettings {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            gravity: DVec2::ZERO,
            velocity_threshold: config.velocity_threshold,
            allow_sleep: false,
        }
    }
}

/// A dynamic circular particle body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleDef {
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub density: f64,
    pub restitution: f64,
    pub friction: f64,
}

/// Contact material of the static container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallMaterial {
    pub restitution: f64,
    pub friction: f64,
}

impl Default for WallMaterial {
    fn default() -> Self {
        Self {
            restitution: 1.0,
            friction: 0.0,
        }
    }
}

pub trait PhysicsWorld {
    /// Apply world settings. Called once before any body is created.
    fn configure(&mut self, settings: &WorldSettings);

    fn create_particle(&mut self, def: &ParticleDef) -> BodyHandle;

    /// Create one static body carrying the four container walls.
    fn create_walls(&mut self, walls: &[WallBox; 4], material: &WallMaterial) -> BodyHandle;

    /// Destroy a body. Returns false if the handle was unknown.
    fn destroy_body(&mut self, handle: BodyHandle) -> bool;

    fn position(&self, handle: BodyHandle) -> Option<DVec2>;

    fn velocity(&self, handle: BodyHandle) -> Option<DVec2>;

    /// Overwrite a body's linear velocity. Returns false if the handle was unknown.
    fn set_velocity(&mut self, handle: BodyHandle, velocity: DVec2) -> bool;

    /// Advance the world by exactly `dt` seconds.
    fn step(&mut self, dt: f64, velocity_iterations: u32, position_iterations: u32);

    /// Number of live bodies, walls included.
    fn body_count(&self) -> usize;
}
