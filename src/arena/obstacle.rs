//! Obstacle placement and derived approach geometry.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::config::Profile;
use crate::geometry::Pose;

/// Which way an obstacle's marked face points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    North,
    South,
    East,
    West,
}

impl Facing {
    /// Map the upstream detection system's facing code (1..=4).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Facing::North),
            2 => Some(Facing::South),
            3 => Some(Facing::East),
            4 => Some(Facing::West),
            _ => None,
        }
    }
}

/// A fixed obstacle the robot must stop in front of and scan.
///
/// Immutable once constructed; positions are in the planner's continuous
/// centimeter coordinates (already scaled from the request's grid units).
#[derive(Clone, Copy, Debug)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
}

impl Obstacle {
    pub fn new(id: u32, x: f32, y: f32, facing: Facing) -> Self {
        Self { id, x, y, facing }
    }

    /// Pose the robot must reach to scan this obstacle: offset from the
    /// obstacle center along its facing axis by half the obstacle width
    /// plus the minimum camera distance, heading pointed back at the
    /// marked face.
    pub fn approach_pose(&self, profile: &Profile) -> Pose {
        let offset = profile.obstacle_width / 2.0 + profile.camera_dist;
        match self.facing {
            Facing::North => Pose::new(self.x, self.y + offset, -FRAC_PI_2),
            Facing::South => Pose::new(self.x, self.y - offset, FRAC_PI_2),
            Facing::East => Pose::new(self.x + offset, self.y, PI),
            Facing::West => Pose::new(self.x - offset, self.y, 0.0),
        }
    }

    /// Signed residual between where a leg actually stopped and this
    /// obstacle's center, along the facing axis. The sign branch differs
    /// per facing so that a positive value always means the robot
    /// stopped short of the face in the physical sense; the four arms
    /// are intentionally not unified.
    pub fn facing_axis_residual(&self, stop: &Pose) -> f32 {
        match self.facing {
            Facing::North => stop.y - self.y,
            Facing::South => self.y - stop.y,
            Facing::East => stop.x - self.x,
            Facing::West => self.x - stop.x,
        }
    }
}
