//! Per-tick population and temperature enforcement.
//!
//! A pass is three batch operations in fixed order:
//!   1. boundary: destroy particles outside the container
//!   2. repopulate: destroy surplus (oldest first) or spawn the deficit
//!   3. rescale: scale all velocities so mean |v|² = 2T
//!
//! T is imposed, not emergent. Collisions between ticks may drift the
//! ensemble's energy; the next pass pulls it back.

use gaslaw_core::population::{contains, spawn_extent};
use gaslaw_core::SimConfig;

use crate::particles::ParticleSet;
use crate::physics::{ParticleDef, PhysicsWorld};
use crate::rng::SpawnRng;

/// Speed of a particle carrying kinetic energy T per unit mass: sqrt(2T).
pub fn thermal_speed(temperature: f64) -> f64 {
    (2.0 * temperature).max(0.0).sqrt()
}

/// What a pass should converge the population to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickTarget {
    pub count: usize,
    pub half_size: f64,
    pub temperature: f64,
}

/// Outcome of one velocity rescale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rescale {
    /// No particles to rescale.
    Empty,
    /// Every particle was at rest; each got a fresh random direction.
    Randomized,
    /// Velocities were multiplied by this factor.
    Scaled(f64),
}

/// Counts and measurements from one thermostat pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermostatReport {
    /// Destroyed for being outside the container.
    pub escaped: usize,
    /// Destroyed as surplus over the target count.
    pub destroyed: usize,
    pub spawned: usize,
    pub rescale: Rescale,
    /// Mean |v|² after the pass; 0 for an empty population.
    pub mean_sq_speed: f64,
}

/// Body template and spawn geometry for new particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thermostat {
    pub particle_radius: f64,
    pub particle_density: f64,
    pub spawn_margin: f64,
}

impl Thermostat {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            particle_radius: config.particle_radius,
            particle_density: config.particle_density,
            spawn_margin: config.spawn_margin,
        }
    }

    /// Run all three operations in order.
    pub fn pass<W: PhysicsWorld>(
        &self,
        world: &mut W,
        particles: &mut ParticleSet,
        target: &TickTarget,
        rng: &mut SpawnRng,
    ) -> ThermostatReport {
        let escaped = self.enforce_boundary(world, particles, target.half_size);
        let (destroyed, spawned) = self.repopulate(world, particles, target, rng);
        let rescale = self.rescale(world, particles, target.temperature, rng);
        let mean_sq_speed = particles.mean_squared_speed(&*world).unwrap_or(0.0);

        let report = ThermostatReport {
            escaped,
            destroyed,
            spawned,
            rescale,
            mean_sq_speed,
        };
        log::trace!("thermostat pass: {report:?}");
        report
    }

    /// Destroy every particle outside ±half_size on either axis. Handles
    /// whose body has disappeared are dropped too. Returns the number
    /// destroyed for escaping.
    pub fn enforce_boundary<W: PhysicsWorld>(
        &self,
        world: &mut W,
        particles: &mut ParticleSet,
        half_size: f64,
    ) -> usize {
        let mut escaped = 0;
        particles.retain(|&handle| match world.position(handle) {
            Some(p) if contains(half_size, p) => true,
            Some(_) => {
                world.destroy_body(handle);
                escaped += 1;
                false
            }
            None => false,
        });
        if escaped > 0 {
            log::debug!("{escaped} particles escaped the container");
        }
        escaped
    }

    /// Bring the population to exactly `target.count`. Returns
    /// (destroyed, spawned).
    pub fn repopulate<W: PhysicsWorld>(
        &self,
        world: &mut W,
        particles: &mut ParticleSet,
        target: &TickTarget,
        rng: &mut SpawnRng,
    ) -> (usize, usize) {
        let mut destroyed = 0;
        while particles.len() > target.count {
            let Some(oldest) = particles.pop_oldest() else {
                break;
            };
            world.destroy_body(oldest);
            destroyed += 1;
        }

        let deficit = target.count.saturating_sub(particles.len());
        let extent = spawn_extent(target.half_size, self.spawn_margin);
        let speed = thermal_speed(target.temperature);
        for _ in 0..deficit {
            let def = ParticleDef {
                position: rng.position(extent),
                velocity: rng.direction() * speed,
                radius: self.particle_radius,
                density: self.particle_density,
                restitution: 1.0,
                friction: 0.0,
            };
            particles.push(world.create_particle(&def));
        }

        if destroyed > 0 || deficit > 0 {
            log::debug!(
                "repopulated to {}: destroyed {destroyed}, spawned {deficit}",
                target.count
            );
        }
        (destroyed, deficit)
    }

    /// Scale velocities so the mean squared speed equals 2T, keeping each
    /// direction.
    pub fn rescale<W: PhysicsWorld>(
        &self,
        world: &mut W,
        particles: &ParticleSet,
        temperature: f64,
        rng: &mut SpawnRng,
    ) -> Rescale {
        let Some(mean_sq) = particles.mean_squared_speed(&*world) else {
            return Rescale::Empty;
        };
        let target_sq = target_mean_sq_speed(temperature);

        if mean_sq <= 0.0 || !mean_sq.is_finite() {
            let speed = thermal_speed(temperature);
            for handle in particles.handles() {
                world.set_velocity(handle, rng.direction() * speed);
            }
            return Rescale::Randomized;
        }

        let scale = (target_sq / mean_sq).sqrt();
        for handle in particles.handles() {
            if let Some(v) = world.velocity(handle) {
                world.set_velocity(handle, v * scale);
            }
        }
        Rescale::Scaled(scale)
    }
}

/// Mean |v|² the thermostat enforces at `temperature`.
pub fn target_mean_sq_speed(temperature: f64) -> f64 {
    2.0 * temperature.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BallisticWorld, BodyHandle};
    use glam::DVec2;

    fn thermostat() -> Thermostat {
        Thermostat::from_config(&SimConfig::default())
    }

    fn spawn_at(
        world: &mut BallisticWorld,
        set: &mut ParticleSet,
        position: DVec2,
        velocity: DVec2,
    ) -> BodyHandle {
        let h = world.create_particle(&ParticleDef {
            position,
            velocity,
            radius: 0.1875,
            density: 1.0,
            restitution: 1.0,
            friction: 0.0,
        });
        set.push(h);
        h
    }

    fn target(count: usize, temperature: f64) -> TickTarget {
        TickTarget {
            count,
            half_size: 10.0,
            temperature,
        }
    }

    #[test]
    fn test_thermal_speed() {
        assert_eq!(thermal_speed(50.0), 10.0);
        assert_eq!(thermal_speed(0.0), 0.0);
        assert_eq!(thermal_speed(-4.0), 0.0);
    }

    #[test]
    fn test_boundary_destroys_outside_only() {
        let mut world = BallisticWorld::new();
        let mut set = ParticleSet::new();
        let inside = spawn_at(&mut world, &mut set, DVec2::new(9.0, -9.0), DVec2::X);
        let out_x = spawn_at(&mut world, &mut set, DVec2::new(10.5, 0.0), DVec2::X);
        let out_y = spawn_at(&mut world, &mut set, DVec2::new(0.0, -12.0), DVec2::X);
        let escaped = thermostat().enforce_boundary(&mut world, &mut set, 10.0);
        assert_eq!(escaped, 2);
        assert_eq!(set.handles().collect::<Vec<_>>(), vec![inside]);
        assert_eq!(world.position(out_x), None);
        assert_eq!(world.position(out_y), None);
    }

    #[test]
    fn test_repopulate_spawns_deficit_at_thermal_speed() {
        let mut world = BallisticWorld::new();
        let mut set = ParticleSet::new();
        let mut rng = SpawnRng::new(Some(5));
        let t = thermostat();
        let (destroyed, spawned) = t.repopulate(&mut world, &mut set, &target(25, 200.0), &mut rng);
        assert_eq!((destroyed, spawned), (0, 25));
        assert_eq!(set.len(), 25);
        let extent = 10.0 - t.spawn_margin;
        for view in set.views(&world) {
            assert!((view.velocity.length() - 20.0).abs() < 1e-9);
            assert!(view.position.x.abs() <= extent && view.position.y.abs() <= extent);
        }
    }

    #[test]
    fn test_repopulate_destroys_oldest_first() {
        let mut world = BallisticWorld::new();
        let mut set = ParticleSet::new();
        let mut rng = SpawnRng::new(Some(5));
        let first = spawn_at(&mut world, &mut set, DVec2::ZERO, DVec2::X);
        let second = spawn_at(&mut world, &mut set, DVec2::ONE, DVec2::X);
        let third = spawn_at(&mut world, &mut set, DVec2::NEG_ONE, DVec2::X);
        let (destroyed, spawned) =
            thermostat().repopulate(&mut world, &mut set, &target(1, 100.0), &mut rng);
        assert_eq!((destroyed, spawned), (2, 0));
        assert_eq!(set.handles().collect::<Vec<_>>(), vec![third]);
        assert_eq!(world.position(first), None);
        assert_eq!(world.position(second), None);
    }

    #[test]
    fn test_rescale_hits_target_for_any_distribution() {
        let mut world = BallisticWorld::new();
        let mut set = ParticleSet::new();
        let mut rng = SpawnRng::new(Some(11));
        for i in 0..40 {
            let speed = 0.5 + i as f64 * 3.7;
            spawn_at(
                &mut world,
                &mut set,
                DVec2::ZERO,
                DVec2::from_angle(i as f64) * speed,
            );
        }
        let before: Vec<DVec2> = set.views(&world).map(|v| v.velocity).collect();
        let rescale = thermostat().rescale(&mut world, &set, 546.3, &mut rng);
        assert!(matches!(rescale, Rescale::Scaled(_)));
        let mean = set.mean_squared_speed(&world).expect("non-empty");
        assert!((mean - 2.0 * 546.3).abs() < 1e-9 * mean, "mean {mean}");
        // Directions are preserved.
        for (view, old) in set.views(&world).zip(before) {
            assert!(view.velocity.normalize().dot(old.normalize()) > 1.0 - 1e-12);
        }
    }

    #[test]
    fn test_rescale_randomizes_resting_population() {
        let mut world = BallisticWorld::new();
        let mut set = ParticleSet::new();
        let mut rng = SpawnRng::new(Some(2));
        for _ in 0..5 {
            spawn_at(&mut world, &mut set, DVec2::ZERO, DVec2::ZERO);
        }
        let rescale = thermostat().rescale(&mut world, &set, 8.0, &mut rng);
        assert_eq!(rescale, Rescale::Randomized);
        let mean = set.mean_squared_speed(&world).expect("non-empty");
        assert!((mean - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_rescale_empty_is_noop() {
        let mut world = BallisticWorld::new();
        let set = ParticleSet::new();
        let mut rng = SpawnRng::new(Some(2));
        assert_eq!(
            thermostat().rescale(&mut world, &set, 300.0, &mut rng),
            Rescale::Empty
        );
    }

    #[test]
    fn test_pass_restores_target_after_escape() {
        let mut world = BallisticWorld::new();
        let mut set = ParticleSet::new();
        let mut rng = SpawnRng::new(Some(8));
        let t = thermostat();
        t.pass(&mut world, &mut set, &target(20, 273.15), &mut rng);
        let victim = set.handles().next().expect("populated");
        world.set_position(victim, DVec2::new(50.0, 0.0));

        let report = t.pass(&mut world, &mut set, &target(20, 273.15), &mut rng);
        assert_eq!(report.escaped, 1);
        assert_eq!(report.spawned, 1);
        assert_eq!(set.len(), 20);
        assert!(!set.handles().any(|h| h == victim));
        assert!((report.mean_sq_speed - target_mean_sq_speed(273.15)).abs() < 1e-9);
    }
}
