use gaslaw_core::population::{container_half_size, target_particle_count, wall_boxes};
use gaslaw_core::{
    ConfigError, ConstraintMode, GasError, GasState, Quantity, SimConfig, StateEngine,
};

use crate::clock::SimulationClock;
use crate::commands::Edit;
use crate::particles::{ParticleSet, ParticleView};
use crate::physics::{BodyHandle, PhysicsWorld, WallMaterial, WorldSettings};
use crate::rng::SpawnRng;
use crate::thermostat::{Thermostat, ThermostatReport, TickTarget};

/// Single public struct owning the whole kinetic gas loop.
///
/// Edits go through the StateEngine and take effect immediately on the
/// macroscopic state and the container walls. The particle population and
/// velocities follow on the next tick.
pub struct Simulation<W: PhysicsWorld> {
    config: SimConfig,
    engine: StateEngine,
    world: W,
    walls: Option<BodyHandle>,
    half_size: f64,
    particles: ParticleSet,
    thermostat: Thermostat,
    clock: SimulationClock,
    rng: SpawnRng,
    tick_count: u64,
    edits_applied: u64,
    edits_rejected: u64,
    last_report: Option<ThermostatReport>,
}

impl<W: PhysicsWorld> Simulation<W> {
    /// Validate `config`, configure `world`, build the container and spawn
    /// the initial population.
    pub fn new(config: SimConfig, mut world: W) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = config.build_engine()?;
        world.configure(&WorldSettings::from_config(&config));

        let rng = SpawnRng::new(config.seed);
        log::info!(
            "simulation start: {:?} under {}, moles policy {:?}, seed {}",
            engine.state(),
            engine.mode(),
            engine.moles_policy(),
            rng.seed()
        );

        let mut sim = Self {
            thermostat: Thermostat::from_config(&config),
            clock: SimulationClock::from_config(&config),
            half_size: container_half_size(engine.state().volume),
            config,
            engine,
            world,
            walls: None,
            particles: ParticleSet::new(),
            rng,
            tick_count: 0,
            edits_applied: 0,
            edits_rejected: 0,
            last_report: None,
        };
        sim.rebuild_walls();
        let target = sim.tick_target();
        sim.thermostat
            .repopulate(&mut sim.world, &mut sim.particles, &target, &mut sim.rng);
        Ok(sim)
    }

    // --- edits ---

    /// Apply one edit. On error nothing changes.
    pub fn apply(&mut self, edit: Edit) -> Result<GasState, GasError> {
        let result = match edit {
            Edit::Set(quantity, value) => self.engine.set(quantity, value),
            Edit::SetMode(mode) => {
                self.engine.set_mode(mode);
                Ok(self.engine.state())
            }
            Edit::CycleMode => {
                self.engine.cycle_mode();
                Ok(self.engine.state())
            }
            Edit::ResetToStp => Ok(self.engine.reset_to_stp()),
        };

        match result {
            Ok(state) => {
                log::debug!("applied {edit}");
                self.edits_applied += 1;
                self.sync_container(state.volume);
                Ok(state)
            }
            Err(e) => {
                log::warn!("rejected {edit}: {e}");
                self.edits_rejected += 1;
                Err(e)
            }
        }
    }

    pub fn set_pressure(&mut self, p: f64) -> Result<GasState, GasError> {
        self.apply(Edit::Set(Quantity::Pressure, p))
    }

    pub fn set_volume(&mut self, v: f64) -> Result<GasState, GasError> {
        self.apply(Edit::Set(Quantity::Volume, v))
    }

    pub fn set_temperature(&mut self, t: f64) -> Result<GasState, GasError> {
        self.apply(Edit::Set(Quantity::Temperature, t))
    }

    pub fn set_moles(&mut self, n: f64) -> Result<GasState, GasError> {
        self.apply(Edit::Set(Quantity::Moles, n))
    }

    pub fn set_mode(&mut self, mode: ConstraintMode) -> Result<GasState, GasError> {
        self.apply(Edit::SetMode(mode))
    }

    pub fn cycle_mode(&mut self) -> Result<GasState, GasError> {
        self.apply(Edit::CycleMode)
    }

    pub fn reset_to_stp(&mut self) -> Result<GasState, GasError> {
        self.apply(Edit::ResetToStp)
    }

    // --- stepping ---

    /// Feed one frame delta. Runs every tick that became due and returns
    /// how many ran.
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        let due = self.clock.advance(frame_dt);
        for _ in 0..due {
            self.tick();
        }
        due
    }

    /// One fixed tick: thermostat pass, then a physics step of exactly
    /// `tick_interval` seconds.
    pub fn tick(&mut self) -> ThermostatReport {
        let target = self.tick_target();
        let report =
            self.thermostat
                .pass(&mut self.world, &mut self.particles, &target, &mut self.rng);
        self.world.step(
            self.clock.interval(),
            self.config.velocity_iterations,
            self.config.position_iterations,
        );
        self.tick_count += 1;
        self.last_report = Some(report);
        report
    }

    fn tick_target(&self) -> TickTarget {
        let state = self.engine.state();
        TickTarget {
            count: target_particle_count(state.moles, self.config.mole_scale),
            half_size: self.half_size,
            temperature: state.temperature,
        }
    }

    fn sync_container(&mut self, volume: f64) {
        let half_size = container_half_size(volume);
        if half_size != self.half_size {
            self.half_size = half_size;
            self.rebuild_walls();
        }
    }

    /// Destroy the current container and build one sized for `half_size`.
    fn rebuild_walls(&mut self) {
        if let Some(old) = self.walls.take() {
            self.world.destroy_body(old);
        }
        let boxes = wall_boxes(self.half_size, self.config.wall_thickness);
        self.walls = Some(self.world.create_walls(&boxes, &WallMaterial::default()));
        log::debug!("container rebuilt, half-size {:.3}", self.half_size);
    }

    // --- accessors ---

    pub fn state(&self) -> GasState {
        self.engine.state()
    }

    pub fn mode(&self) -> ConstraintMode {
        self.engine.mode()
    }

    pub fn engine(&self) -> &StateEngine {
        &self.engine
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Direct world access for hosts and tests. Bodies created here are not
    /// part of the gas.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn walls(&self) -> Option<BodyHandle> {
        self.walls
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// floor(n · mole_scale) for the current state.
    pub fn target_particle_count(&self) -> usize {
        target_particle_count(self.engine.state().moles, self.config.mole_scale)
    }

    pub fn container_half_size(&self) -> f64 {
        self.half_size
    }

    pub fn particles(&self) -> impl Iterator<Item = ParticleView> + '_ {
        self.particles.views(&self.world)
    }

    /// Live mean |v|², which drifts from 2T between thermostat passes.
    pub fn mean_squared_speed(&self) -> Option<f64> {
        self.particles.mean_squared_speed(&self.world)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Edits accepted so far, mode changes and resets included.
    pub fn edits_applied(&self) -> u64 {
        self.edits_applied
    }

    pub fn edits_rejected(&self) -> u64 {
        self.edits_rejected
    }

    pub fn last_report(&self) -> Option<&ThermostatReport> {
        self.last_report.as_ref()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}
