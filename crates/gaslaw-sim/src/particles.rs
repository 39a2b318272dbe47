use std::collections::VecDeque;

use glam::DVec2;

use crate::physics::{BodyHandle, PhysicsWorld};

/// Ordered list of live particle bodies, oldest first.
///
/// The physics world owns the bodies; this only tracks which handles make
/// up the gas and in what order they were spawned.
#[derive(Debug, Clone, Default)]
pub struct ParticleSet {
    handles: VecDeque<BodyHandle>,
}

/// Read-only view of one particle, for drawing and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub handle: BodyHandle,
    pub position: DVec2,
    pub velocity: DVec2,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.handles.iter().copied()
    }

    pub fn push(&mut self, handle: BodyHandle) {
        self.handles.push_back(handle);
    }

    /// Remove and return the oldest handle.
    pub fn pop_oldest(&mut self) -> Option<BodyHandle> {
        self.handles.pop_front()
    }

    /// Keep only handles for which `keep` returns true, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&BodyHandle) -> bool) {
        self.handles.retain(keep);
    }

    /// Snapshot every particle that still exists in `world`.
    pub fn views<'a, W: PhysicsWorld>(
        &'a self,
        world: &'a W,
    ) -> impl Iterator<Item = ParticleView> + 'a {
        self.handles.iter().filter_map(move |&handle| {
            Some(ParticleView {
                handle,
                position: world.position(handle)?,
                velocity: world.velocity(handle)?,
            })
        })
    }

    /// Mean of |v|² over the population, or None when empty.
    pub fn mean_squared_speed<W: PhysicsWorld>(&self, world: &W) -> Option<f64> {
        let (sum, count) = self
            .handles
            .iter()
            .filter_map(|&h| world.velocity(h))
            .fold((0.0, 0usize), |(sum, n), v| (sum + v.length_squared(), n + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}
