//! Pure mappings from macroscopic state to the particle view: how many
//! particles to keep, how big the box is, and where its walls sit.

use glam::DVec2;

use crate::constants::CONTAINER_SCALE;

/// Target particle count for `moles` of gas: floor(n * mole_scale).
/// Zero, negative and non-finite products all mean "no particles".
pub fn target_particle_count(moles: f64, mole_scale: f64) -> usize {
    let raw = (moles * mole_scale).floor();
    if raw.is_finite() && raw > 0.0 {
        raw as usize
    } else {
        0
    }
}

/// Half the side length of the square container for volume `volume`.
pub fn container_half_size(volume: f64) -> f64 {
    CONTAINER_SCALE * volume.max(0.0).sqrt()
}

/// Half-width of the square new particles are spawned in.
pub fn spawn_extent(half_size: f64, margin: f64) -> f64 {
    (half_size - margin).max(0.0)
}

/// Whether `position` lies inside the container (inclusive of the faces).
pub fn contains(half_size: f64, position: DVec2) -> bool {
    position.x.abs() <= half_size && position.y.abs() <= half_size
}

/// One static wall rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallBox {
    pub center: DVec2,
    pub half_extents: DVec2,
}

impl WallBox {
    /// Whether `point` is inside this rectangle.
    pub fn contains(&self, point: DVec2) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y
    }
}

/// The four container walls: bottom, top, right, left.
///
/// Inner faces lie on ±half_size. Each wall runs a full thickness past the
/// corners so the box has no gaps.
pub fn wall_boxes(half_size: f64, thickness: f64) -> [WallBox; 4] {
    let t = thickness / 2.0;
    let long = half_size + thickness;
    [
        WallBox {
            center: DVec2::new(0.0, -half_size - t),
            half_extents: DVec2::new(long, t),
        },
        WallBox {
            center: DVec2::new(0.0, half_size + t),
            half_extents: DVec2::new(long, t),
        },
        WallBox {
            center: DVec2::new(half_size + t, 0.0),
            half_extents: DVec2::new(t, long),
        },
        WallBox {
            center: DVec2::new(-half_size - t, 0.0),
            half_extents: DVec2::new(t, long),
        },
    ]
}
