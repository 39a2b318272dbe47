//! End-to-end runs of the kinetic loop against the ballistic backend.

use gaslaw_core::{ConstraintMode, GasState, Quantity, SimConfig};
use gaslaw_sim::{BallisticWorld, Edit, PhysicsWorld, Rescale, Simulation};
use glam::DVec2;

const R: f64 = 0.082057;

fn simulation(mode: ConstraintMode) -> Simulation<BallisticWorld> {
    let config = SimConfig {
        seed: Some(1234),
        initial_mode: mode,
        ..SimConfig::default()
    };
    Simulation::new(config, BallisticWorld::new()).expect("default config is valid")
}

fn assert_close(actual: f64, expected: f64, rel: f64) {
    assert!(
        (actual - expected).abs() <= rel * expected.abs().max(1.0),
        "expected {expected}, got {actual}"
    );
}

fn assert_consistent(state: GasState) {
    assert!(
        state.is_consistent(R, 1e-9),
        "PV = {} but nRT = {}",
        state.pressure * state.volume,
        state.moles * R * state.temperature
    );
}

#[test]
fn heating_at_constant_volume_doubles_pressure() {
    let mut sim = simulation(ConstraintMode::ConstVolume);
    let stp = sim.state();
    assert_close(stp.volume, 22.414, 1e-4);

    let state = sim.set_temperature(546.3).expect("temperature is adjustable");
    assert_close(state.pressure, 2.0, 1e-3);
    assert_eq!(state.volume, stp.volume);
    assert_eq!(state.moles, stp.moles);
    assert_consistent(state);

    let report = sim.tick();
    assert!(matches!(report.rescale, Rescale::Scaled(_)));
    assert_close(report.mean_sq_speed, 2.0 * 546.3, 1e-9);
    // One physics step of elastic motion keeps the ensemble near 2T.
    let live = sim.mean_squared_speed().expect("population is non-empty");
    assert_close(live, 2.0 * 546.3, 0.25);
}

#[test]
fn expanding_at_constant_pressure_heats_the_gas() {
    let mut sim = simulation(ConstraintMode::ConstPressure);
    let state = sim.set_volume(44.828).expect("volume is adjustable");
    assert_eq!(state.pressure, 1.0);
    assert_close(state.temperature, 546.3, 1e-3);
    assert_consistent(state);
    assert_close(sim.container_half_size(), 5.0 * 44.828f64.sqrt(), 1e-12);
}

#[test]
fn doubling_moles_at_constant_temperature_doubles_pressure() {
    let mut sim = simulation(ConstraintMode::ConstTemperature);
    let stp = sim.state();
    let state = sim.set_moles(2.0).expect("moles are always adjustable");
    assert_close(state.pressure, 2.0, 1e-9);
    assert_eq!(state.volume, stp.volume);
    assert_eq!(state.temperature, stp.temperature);
    assert_eq!(sim.target_particle_count(), 40);

    sim.tick();
    assert_eq!(sim.particle_count(), 40);
}

#[test]
fn frozen_quantity_is_rejected_in_every_mode() {
    for mode in [
        ConstraintMode::ConstVolume,
        ConstraintMode::ConstTemperature,
        ConstraintMode::ConstPressure,
    ] {
        let mut sim = simulation(mode);
        let before = sim.state();
        assert!(sim.apply(Edit::Set(mode.frozen(), 3.0)).is_err());
        assert_eq!(sim.state(), before);
    }
}

#[test]
fn population_tracks_moles_after_one_tick() {
    let mut sim = simulation(ConstraintMode::ConstVolume);
    for n in [0.3, 4.0, 1.05, 0.0, 2.5] {
        sim.set_moles(n).expect("non-negative moles are valid");
        sim.tick();
        assert_eq!(sim.particle_count(), (n * 20.0).floor() as usize, "n = {n}");
    }
}

#[test]
fn escaped_particle_is_replaced_on_next_tick() {
    let mut sim = simulation(ConstraintMode::ConstVolume);
    sim.tick();
    let victim = sim.particles().next().expect("populated").handle;
    assert!(sim.world_mut().set_position(victim, DVec2::new(500.0, 0.0)));

    let report = sim.tick();
    assert_eq!(report.escaped, 1);
    assert_eq!(report.spawned, 1);
    assert_eq!(sim.particle_count(), 20);
    assert!(sim.particles().all(|p| p.handle != victim));
    assert_eq!(sim.world().position(victim), None);
}

#[test]
fn shrinking_container_culls_and_respawns_inside() {
    let mut sim = simulation(ConstraintMode::ConstTemperature);
    sim.advance(0.5);
    sim.set_volume(2.0).expect("volume is adjustable");
    assert_eq!(sim.world().static_count(), 1);

    let report = sim.tick();
    assert!(report.escaped > 0);
    assert_eq!(sim.particle_count(), 20);
    let half = sim.container_half_size();
    assert_close(half, 5.0 * 2f64.sqrt(), 1e-12);
}

#[test]
fn clock_drives_fixed_steps() {
    let mut sim = simulation(ConstraintMode::ConstVolume);
    assert_eq!(sim.advance(0.04), 2);
    assert_eq!(sim.tick_count(), 2);
    assert_eq!(sim.world().step_count(), 2);
    assert_eq!(sim.world().last_step(), Some((1.0 / 60.0, 3, 6)));

    // Remainder carries into the next frame.
    assert_eq!(sim.advance(0.015), 1);
    assert_eq!(sim.tick_count(), 3);
}

#[test]
fn long_run_stays_contained_and_thermalized() {
    let mut sim = simulation(ConstraintMode::ConstVolume);
    sim.set_moles(3.0).expect("valid edit");
    let half = sim.container_half_size();
    for _ in 0..300 {
        sim.advance(1.0 / 60.0);
        assert_eq!(sim.particle_count(), 60);
        let report = sim.last_report().copied();
        if let Some(report) = report {
            assert_close(report.mean_sq_speed, 2.0 * 273.15, 1e-9);
        }
    }
    assert!(sim.tick_count() >= 299);
    for p in sim.particles() {
        assert!(
            p.position.x.abs() <= half + 0.5 && p.position.y.abs() <= half + 0.5,
            "{:?} escaped a box of half-size {half}",
            p.position
        );
    }
}

#[test]
fn reset_restores_stp_and_container() {
    let mut sim = simulation(ConstraintMode::ConstTemperature);
    sim.set_volume(5.0).expect("valid edit");
    sim.apply(Edit::CycleMode).expect("mode change never fails");
    assert_eq!(sim.mode(), ConstraintMode::ConstPressure);

    let state = sim.apply(Edit::ResetToStp).expect("reset never fails");
    assert_eq!(state.pressure, 1.0);
    assert_eq!(state.temperature, 273.15);
    assert_eq!(sim.mode(), ConstraintMode::ConstPressure);
    assert_close(sim.container_half_size(), 5.0 * state.volume.sqrt(), 1e-12);
    assert_eq!(sim.state().get(Quantity::Moles), 1.0);
}

#[test]
fn cold_gas_keeps_bouncing_off_the_walls() {
    let mut sim = simulation(ConstraintMode::ConstVolume);
    sim.set_temperature(0.1).expect("temperature is adjustable");
    sim.tick();

    // Line every particle up just short of the right wall, heading into it
    // at the thermal speed of the coldest allowed temperature.
    let half = sim.container_half_size();
    let radius = sim.config().particle_radius;
    let speed = (2.0f64 * 0.1).sqrt();
    let start_x = half - radius - 0.05;
    let handles: Vec<_> = sim.particles().map(|p| p.handle).collect();
    let spacing = 1.6 * half / handles.len() as f64;
    for (i, &handle) in handles.iter().enumerate() {
        let y = -0.8 * half + i as f64 * spacing;
        sim.world_mut().set_position(handle, DVec2::new(start_x, y));
        sim.world_mut().set_velocity(handle, DVec2::new(speed, 0.0));
    }

    for _ in 0..60 {
        sim.tick();
    }

    assert_eq!(sim.particle_count(), handles.len());
    for p in sim.particles() {
        assert!(
            p.velocity.x < -0.5 * speed,
            "particle {:?} did not rebound: velocity {:?}",
            p.handle,
            p.velocity
        );
        assert!(
            p.position.x < start_x - 0.1,
            "particle {:?} stayed against the wall at {:?}",
            p.handle,
            p.position
        );
    }
}

#[test]
fn cold_gas_never_settles_on_a_wall() {
    let mut sim = simulation(ConstraintMode::ConstVolume);
    sim.set_temperature(0.1).expect("temperature is adjustable");
    for _ in 0..3600 {
        sim.tick();
    }

    let half = sim.container_half_size();
    let reach = half - sim.config().particle_radius - 1e-3;
    let stalled: Vec<_> = sim
        .particles()
        .filter(|p| {
            (p.position.x.abs() >= reach && p.velocity.x.abs() < 1e-9)
                || (p.position.y.abs() >= reach && p.velocity.y.abs() < 1e-9)
        })
        .collect();
    assert!(stalled.is_empty(), "particles resting on a wall: {stalled:?}");
    assert_close(sim.mean_squared_speed().expect("populated"), 0.2, 0.25);
}
