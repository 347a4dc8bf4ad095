//! Pose type and shared geometric helpers.

use std::f32::consts::PI;

/// Robot pose in the arena: position in centimeters, heading in radians.
///
/// Immutable value type; maneuvers derive new poses rather than mutating
/// one in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self { x, y, theta }
    }

    /// New pose translated by `dist` along direction `dir` (radians),
    /// heading unchanged.
    pub fn translated(&self, dir: f32, dist: f32) -> Self {
        Self {
            x: self.x + dir.cos() * dist,
            y: self.y + dir.sin() * dist,
            theta: self.theta,
        }
    }

    /// Straight-line distance to another pose, ignoring heading.
    pub fn distance_to(&self, other: &Pose) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Normalize angle to [-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle_positive(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a < 0.0 {
        a += 2.0 * PI;
    }
    a
}

/// Canonical integer key for a discretized pose cell.
///
/// This, not the continuous pose, is the identity used by the A* closed
/// set; without it the search would re-expand near-identical poses
/// forever. The quantization steps come from the calibration profile and
/// are never recomputed from live coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub ix: i32,
    pub iy: i32,
    pub itheta: i32,
}

/// Snap a continuous pose onto the search grid.
///
/// `coord_step` is the grid pitch in cm, `theta_step_deg` the angular
/// pitch in degrees. Heading is first normalized to [0, 2π) so that
/// equivalent headings quantize identically.
pub fn quantize(pose: &Pose, coord_step: f32, theta_step_deg: f32) -> CellKey {
    let theta_deg = normalize_angle_positive(pose.theta).to_degrees();
    let sectors = (360.0 / theta_step_deg).round() as i32;
    CellKey {
        ix: (pose.x / coord_step).round() as i32,
        iy: (pose.y / coord_step).round() as i32,
        itheta: ((theta_deg / theta_step_deg).round() as i32).rem_euclid(sectors),
    }
}
