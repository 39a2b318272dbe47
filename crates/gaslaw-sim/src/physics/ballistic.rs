//! Minimal in-process physics backend.
//!
//! Discs fly freely, bounce off static boxes, and collide with each other
//! through impulse exchange along the contact normal. Contact detection is
//! brute force over all pairs, which is plenty for a few hundred particles.
//! There is no rotation, no friction and no sleeping.

use std::collections::BTreeMap;

use gaslaw_core::population::WallBox;
use glam::DVec2;

use super::{BodyHandle, ParticleDef, PhysicsWorld, WallMaterial, WorldSettings};

#[derive(Debug, Clone)]
struct Disc {
    position: DVec2,
    velocity: DVec2,
    radius: f64,
    inv_mass: f64,
    restitution: f64,
}

#[derive(Debug, Clone)]
struct StaticBody {
    boxes: [WallBox; 4],
    restitution: f64,
}

/// Contact between a disc and a static box: unit normal pointing out of
/// the box towards the disc, and penetration depth.
#[derive(Debug, Clone, Copy)]
struct BoxContact {
    normal: DVec2,
    depth: f64,
}

#[derive(Debug)]
pub struct BallisticWorld {
    settings: WorldSettings,
    discs: BTreeMap<BodyHandle, Disc>,
    statics: BTreeMap<BodyHandle, StaticBody>,
    next_handle: u32,
    step_count: u64,
    last_step: Option<(f64, u32, u32)>,
}

impl Default for BallisticWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl BallisticWorld {
    pub fn new() -> Self {
        Self {
            settings: WorldSettings {
                gravity: DVec2::ZERO,
                velocity_threshold: 0.0,
                allow_sleep: false,
            },
            discs: BTreeMap::new(),
            statics: BTreeMap::new(),
            next_handle: 0,
            step_count: 0,
            last_step: None,
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Number of completed `step` calls.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Arguments of the most recent `step` call: (dt, velocity, position iterations).
    pub fn last_step(&self) -> Option<(f64, u32, u32)> {
        self.last_step
    }

    /// Number of live particle bodies.
    pub fn particle_count(&self) -> usize {
        self.discs.len()
    }

    /// Number of live static bodies.
    pub fn static_count(&self) -> usize {
        self.statics.len()
    }

    /// Teleport a particle. Used by tools and tests; the simulation itself
    /// never moves bodies directly.
    pub fn set_position(&mut self, handle: BodyHandle, position: DVec2) -> bool {
        match self.discs.get_mut(&handle) {
            Some(disc) => {
                disc.position = position;
                true
            }
            None => false,
        }
    }

    /// Total kinetic energy of all particles.
    pub fn kinetic_energy(&self) -> f64 {
        self.discs
            .values()
            .map(|d| 0.5 * d.velocity.length_squared() / d.inv_mass)
            .sum()
    }

    fn issue_handle(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        handle
    }

    fn restitution_for(&self, closing_speed: f64, restitution: f64) -> f64 {
        if closing_speed < self.settings.velocity_threshold {
            0.0
        } else {
            restitution
        }
    }

    fn solve_velocities(&mut self, handles: &[BodyHandle]) {
        // Disc against disc
        for (i, a) in handles.iter().enumerate() {
            for b in &handles[i + 1..] {
                let (Some(da), Some(db)) = (self.discs.get(a), self.discs.get(b)) else {
                    continue;
                };
                let delta = db.position - da.position;
                let reach = da.radius + db.radius;
                let dist_sq = delta.length_squared();
                if dist_sq >= reach * reach || dist_sq == 0.0 {
                    continue;
                }
                let normal = delta / dist_sq.sqrt();
                let closing = (db.velocity - da.velocity).dot(normal);
                if closing >= 0.0 {
                    continue;
                }
                let e = self.restitution_for(-closing, da.restitution.max(db.restitution));
                let inv_sum = da.inv_mass + db.inv_mass;
                let impulse = -(1.0 + e) * closing / inv_sum;
                let (ia, ib) = (da.inv_mass, db.inv_mass);
                if let Some(da) = self.discs.get_mut(a) {
                    da.velocity -= normal * impulse * ia;
                }
                if let Some(db) = self.discs.get_mut(b) {
                    db.velocity += normal * impulse * ib;
                }
            }
        }

        // Disc against static boxes
        let statics: Vec<StaticBody> = self.statics.values().cloned().collect();
        let threshold = self.settings.velocity_threshold;
        for disc in self.discs.values_mut() {
            for body in &statics {
                for wall in &body.boxes {
                    if let Some(contact) = box_contact(wall, disc.position, disc.radius) {
                        bounce(disc, contact.normal, body.restitution, threshold);
                    }
                }
            }
        }
    }

    fn solve_positions(&mut self, handles: &[BodyHandle]) {
        for (i, a) in handles.iter().enumerate() {
            for b in &handles[i + 1..] {
                let (Some(da), Some(db)) = (self.discs.get(a), self.discs.get(b)) else {
                    continue;
                };
                let delta = db.position - da.position;
                let reach = da.radius + db.radius;
                let dist_sq = delta.length_squared();
                if dist_sq >= reach * reach || dist_sq == 0.0 {
                    continue;
                }
                let dist = dist_sq.sqrt();
                let normal = delta / dist;
                let inv_sum = da.inv_mass + db.inv_mass;
                let push = (reach - dist) / inv_sum;
                let (ia, ib) = (da.inv_mass, db.inv_mass);
                if let Some(da) = self.discs.get_mut(a) {
                    da.position -= normal * push * ia;
                }
                if let Some(db) = self.discs.get_mut(b) {
                    db.position += normal * push * ib;
                }
            }
        }

        // A disc that crossed a wall face during integration never produced a
        // velocity contact, so it is reflected here as well as pushed out.
        let statics: Vec<StaticBody> = self.statics.values().cloned().collect();
        let threshold = self.settings.velocity_threshold;
        for disc in self.discs.values_mut() {
            for body in &statics {
                for wall in &body.boxes {
                    if let Some(contact) = box_contact(wall, disc.position, disc.radius) {
                        disc.position += contact.normal * contact.depth;
                        bounce(disc, contact.normal, body.restitution, threshold);
                    }
                }
            }
        }
    }
}

impl PhysicsWorld for BallisticWorld {
    fn configure(&mut self, settings: &WorldSettings) {
        self.settings = *settings;
    }

    fn create_particle(&mut self, def: &ParticleDef) -> BodyHandle {
        let handle = self.issue_handle();
        let area = std::f64::consts::PI * def.radius * def.radius;
        let mass = area * def.density;
        self.discs.insert(
            handle,
            Disc {
                position: def.position,
                velocity: def.velocity,
                radius: def.radius,
                inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
                restitution: def.restitution,
            },
        );
        handle
    }

    fn create_walls(&mut self, walls: &[WallBox; 4], material: &WallMaterial) -> BodyHandle {
        let handle = self.issue_handle();
        self.statics.insert(
            handle,
            StaticBody {
                boxes: *walls,
                restitution: material.restitution,
            },
        );
        handle
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        self.discs.remove(&handle).is_some() || self.statics.remove(&handle).is_some()
    }

    fn position(&self, handle: BodyHandle) -> Option<DVec2> {
        self.discs.get(&handle).map(|d| d.position)
    }

    fn velocity(&self, handle: BodyHandle) -> Option<DVec2> {
        self.discs.get(&handle).map(|d| d.velocity)
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: DVec2) -> bool {
        match self.discs.get_mut(&handle) {
            Some(disc) => {
                disc.velocity = velocity;
                true
            }
            None => false,
        }
    }

    fn step(&mut self, dt: f64, velocity_iterations: u32, position_iterations: u32) {
        let handles: Vec<BodyHandle> = self.discs.keys().copied().collect();
        let gravity = self.settings.gravity;

        for disc in self.discs.values_mut() {
            disc.velocity += gravity * dt;
        }
        for _ in 0..velocity_iterations {
            self.solve_velocities(&handles);
        }
        for disc in self.discs.values_mut() {
            disc.position += disc.velocity * dt;
        }
        for _ in 0..position_iterations {
            self.solve_positions(&handles);
        }

        self.step_count += 1;
        self.last_step = Some((dt, velocity_iterations, position_iterations));
    }

    fn body_count(&self) -> usize {
        self.discs.len() + self.statics.len()
    }
}

/// Reflect the normal component of a disc moving into a static surface.
fn bounce(disc: &mut Disc, normal: DVec2, restitution: f64, threshold: f64) {
    let closing = disc.velocity.dot(normal);
    if closing >= 0.0 {
        return;
    }
    let e = if -closing < threshold {
        0.0
    } else {
        disc.restitution.max(restitution)
    };
    disc.velocity -= normal * (1.0 + e) * closing;
}

/// Overlap between a disc and an axis-aligned box, if any.
fn box_contact(wall: &WallBox, center: DVec2, radius: f64) -> Option<BoxContact> {
    let min = wall.center - wall.half_extents;
    let max = wall.center + wall.half_extents;
    let closest = center.clamp(min, max);
    let offset = center - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > 0.0 {
        if dist_sq >= radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(BoxContact {
            normal: offset / dist,
            depth: radius - dist,
        });
    }

    // Center is inside the box: leave through the nearest face.
    let faces = [
        (center.x - min.x, DVec2::NEG_X),
        (max.x - center.x, DVec2::X),
        (center.y - min.y, DVec2::NEG_Y),
        (max.y - center.y, DVec2::Y),
    ];
    let (gap, normal) = faces
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((0.0, DVec2::Y));
    Some(BoxContact {
        normal,
        depth: gap + radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaslaw_core::population::wall_boxes;

    fn disc(position: DVec2, velocity: DVec2) -> ParticleDef {
        ParticleDef {
            position,
            velocity,
            radius: 0.25,
            density: 1.0,
            restitution: 1.0,
            friction: 0.0,
        }
    }

    fn world_with_box(half: f64) -> BallisticWorld {
        let mut world = BallisticWorld::new();
        world.create_walls(&wall_boxes(half, 3.0), &WallMaterial::default());
        world
    }

    #[test]
    fn test_free_flight() {
        let mut world = BallisticWorld::new();
        let h = world.create_particle(&disc(DVec2::ZERO, DVec2::new(2.0, -1.0)));
        world.step(0.5, 3, 6);
        assert_eq!(world.position(h), Some(DVec2::new(1.0, -0.5)));
        assert_eq!(world.last_step(), Some((0.5, 3, 6)));
        assert_eq!(world.step_count(), 1);
    }

    #[test]
    fn test_wall_reflection_preserves_speed() {
        let mut world = world_with_box(5.0);
        // Touching the right wall and moving into it.
        let h = world.create_particle(&disc(DVec2::new(4.9, 0.0), DVec2::new(10.0, 3.0)));
        world.step(1.0 / 60.0, 3, 6);
        let v = world.velocity(h).expect("alive");
        assert!(v.x < 0.0, "expected reflection, got {v:?}");
        assert!((v.length() - DVec2::new(10.0, 3.0).length()).abs() < 1e-9);
    }

    #[test]
    fn test_particles_stay_inside_box() {
        let half = 5.0;
        let mut world = world_with_box(half);
        let h = world.create_particle(&disc(DVec2::ZERO, DVec2::new(40.0, 25.0)));
        for _ in 0..600 {
            world.step(1.0 / 60.0, 3, 6);
            let p = world.position(h).expect("alive");
            assert!(p.x.abs() <= half && p.y.abs() <= half, "escaped at {p:?}");
        }
    }

    #[test]
    fn test_head_on_collision_exchanges_velocity() {
        let mut world = BallisticWorld::new();
        let a = world.create_particle(&disc(DVec2::new(-0.2, 0.0), DVec2::new(5.0, 0.0)));
        let b = world.create_particle(&disc(DVec2::new(0.2, 0.0), DVec2::new(-5.0, 0.0)));
        world.step(1.0 / 60.0, 3, 6);
        let va = world.velocity(a).expect("alive");
        let vb = world.velocity(b).expect("alive");
        assert!((va.x + 5.0).abs() < 1e-9, "got {va:?}");
        assert!((vb.x - 5.0).abs() < 1e-9, "got {vb:?}");
    }

    #[test]
    fn test_elastic_collisions_conserve_energy() {
        let mut world = world_with_box(4.0);
        for i in 0..30 {
            let x = -3.0 + (i % 6) as f64;
            let y = -3.0 + (i / 6) as f64;
            let angle = i as f64 * 0.7;
            world.create_particle(&disc(DVec2::new(x, y), DVec2::from_angle(angle) * 20.0));
        }
        let e0 = world.kinetic_energy();
        for _ in 0..120 {
            world.step(1.0 / 60.0, 3, 6);
        }
        let e1 = world.kinetic_energy();
        assert!(((e1 - e0) / e0).abs() < 1e-9, "E0={e0} E1={e1}");
    }

    #[test]
    fn test_slow_contact_is_inelastic_below_threshold() {
        let mut world = world_with_box(5.0);
        world.configure(&WorldSettings {
            gravity: DVec2::ZERO,
            velocity_threshold: 1.0,
            allow_sleep: false,
        });
        let h = world.create_particle(&disc(DVec2::new(4.9, 0.0), DVec2::new(0.5, 0.0)));
        world.step(1.0 / 60.0, 3, 6);
        let v = world.velocity(h).expect("alive");
        assert!(v.x.abs() < 1e-12, "expected the normal component removed, got {v:?}");
    }

    #[test]
    fn test_destroy_body() {
        let mut world = world_with_box(5.0);
        let h = world.create_particle(&disc(DVec2::ZERO, DVec2::ZERO));
        assert_eq!(world.body_count(), 2);
        assert!(world.destroy_body(h));
        assert!(!world.destroy_body(h));
        assert_eq!(world.position(h), None);
        assert!(!world.set_velocity(h, DVec2::X));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_box_contact_center_inside() {
        let wall = WallBox {
            center: DVec2::new(6.5, 0.0),
            half_extents: DVec2::new(1.5, 8.0),
        };
        // Just past the inner face at x = 5.
        let contact = box_contact(&wall, DVec2::new(5.2, 0.0), 0.25).expect("overlap");
        assert_eq!(contact.normal, DVec2::NEG_X);
        assert!((contact.depth - 0.45).abs() < 1e-12);
    }
}
