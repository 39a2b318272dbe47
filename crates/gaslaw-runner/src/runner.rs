use gaslaw_core::{ConfigError, ConstraintMode, GasState, SimConfig};
use gaslaw_sim::{BallisticWorld, Simulation};

use crate::scenarios::ScenarioConfig;

/// Outcome of one scenario run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub final_mode: ConstraintMode,
    pub final_state: GasState,
    pub particle_count: usize,
    pub target_count: usize,
    /// Mean |v|² right after the last thermostat pass.
    pub mean_sq_speed: f64,
    /// 2T for the final state.
    pub expected_mean_sq_speed: f64,
    pub ticks: u64,
    pub applied_edits: u64,
    pub rejected_edits: u64,
    pub seed: u64,
}

impl ScenarioResult {
    /// True when the run ended in the state the thermostat promises:
    /// population on target and mean squared speed at 2T.
    pub fn settled(&self) -> bool {
        let tolerance = 1e-6 * self.expected_mean_sq_speed.max(1.0);
        self.particle_count == self.target_count
            && (self.target_count == 0
                || (self.mean_sq_speed - self.expected_mean_sq_speed).abs() <= tolerance)
    }
}

/// Drives scenarios headless against the ballistic backend at a fixed
/// frame rate.
pub struct ScenarioRunner {
    config: SimConfig,
    seconds: f64,
    fps: f64,
}

impl ScenarioRunner {
    pub fn new(config: SimConfig, seconds: f64, fps: f64) -> Self {
        Self {
            config,
            seconds,
            fps,
        }
    }

    pub fn frame_count(&self) -> u64 {
        (self.seconds * self.fps).round().max(0.0) as u64
    }

    /// Run one scenario. Edits due at or before a frame's start time are
    /// applied before that frame advances the clock.
    pub fn run(&self, scenario: &ScenarioConfig) -> Result<ScenarioResult, ConfigError> {
        log::info!("Running scenario '{}': {}", scenario.name, scenario.description);

        let config = SimConfig {
            initial_mode: scenario.initial_mode,
            ..self.config.clone()
        };
        let mut sim = Simulation::new(config, BallisticWorld::new())?;

        let frame_dt = 1.0 / self.fps;
        let mut pending = scenario.edits.iter().peekable();

        for frame in 0..self.frame_count() {
            let now = frame as f64 * frame_dt;
            while let Some(timed) = pending.next_if(|e| e.at <= now) {
                // Rejections are logged and counted by the simulation.
                let _ = sim.apply(timed.edit);
            }
            sim.advance(frame_dt);
        }

        let skipped = pending.count();
        if skipped > 0 {
            log::warn!(
                "  {skipped} edits scheduled after {:.2}s were never applied",
                self.seconds
            );
        }

        let final_state = sim.state();
        let result = ScenarioResult {
            scenario_name: scenario.name.to_string(),
            final_mode: sim.mode(),
            final_state,
            particle_count: sim.particle_count(),
            target_count: sim.target_particle_count(),
            mean_sq_speed: sim.last_report().map_or(0.0, |r| r.mean_sq_speed),
            expected_mean_sq_speed: 2.0 * final_state.temperature,
            ticks: sim.tick_count(),
            applied_edits: sim.edits_applied(),
            rejected_edits: sim.edits_rejected(),
            seed: sim.seed(),
        };
        log::info!(
            "  {} ticks, {} particles, P = {:.4} atm",
            result.ticks,
            result.particle_count,
            final_state.pressure
        );
        Ok(result)
    }
}
