//! The six admissible move primitives.
//!
//! The robot has no continuous steering: every edge in the search graph
//! is one of six fixed maneuvers whose displacements come straight from
//! the calibration profile. Applying a primitive is a pure function from
//! pose to pose.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::config::{Profile, TurnParams};
use crate::geometry::Pose;

/// Direction of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionDir {
    Forward,
    Backward,
}

impl MotionDir {
    /// Code used by the simulator trace: 1 forward, -1 backward.
    pub fn code(self) -> i8 {
        match self {
            MotionDir::Forward => 1,
            MotionDir::Backward => -1,
        }
    }
}

/// Steering mode of a maneuver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Steer {
    Left,
    Straight,
    Right,
}

impl Steer {
    /// Code used by the simulator trace: -1 left, 0 straight, 1 right.
    pub fn code(self) -> i8 {
        match self {
            Steer::Left => -1,
            Steer::Straight => 0,
            Steer::Right => 1,
        }
    }
}

/// One of the six fixed maneuvers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Forward,
    Backward,
    ForwardLeft,
    ForwardRight,
    BackwardLeft,
    BackwardRight,
}

impl Move {
    pub const ALL: [Move; 6] = [
        Move::Forward,
        Move::Backward,
        Move::ForwardLeft,
        Move::ForwardRight,
        Move::BackwardLeft,
        Move::BackwardRight,
    ];

    pub fn direction(self) -> MotionDir {
        match self {
            Move::Forward | Move::ForwardLeft | Move::ForwardRight => MotionDir::Forward,
            Move::Backward | Move::BackwardLeft | Move::BackwardRight => MotionDir::Backward,
        }
    }

    pub fn steer(self) -> Steer {
        match self {
            Move::Forward | Move::Backward => Steer::Straight,
            Move::ForwardLeft | Move::BackwardLeft => Steer::Left,
            Move::ForwardRight | Move::BackwardRight => Steer::Right,
        }
    }

    /// Turn geometry for this maneuver, `None` for straight moves.
    pub fn turn_params(self, profile: &Profile) -> Option<&TurnParams> {
        match self {
            Move::Forward | Move::Backward => None,
            Move::ForwardLeft => Some(&profile.fl),
            Move::ForwardRight => Some(&profile.fr),
            Move::BackwardLeft => Some(&profile.bl),
            Move::BackwardRight => Some(&profile.br),
        }
    }

    /// Physical distance covered by this maneuver: the straight step for
    /// straight moves, the swept arc length for 45° turns.
    pub fn distance(self, profile: &Profile) -> f32 {
        match self.turn_params(profile) {
            Some(turn) => turn.arc,
            None => profile.straight_step,
        }
    }

    /// Heading change produced by this maneuver.
    ///
    /// Reversing flips the sense of the steering: backing up with the
    /// wheels turned left rotates the robot clockwise.
    pub fn heading_delta(self) -> f32 {
        match self {
            Move::Forward | Move::Backward => 0.0,
            Move::ForwardLeft | Move::BackwardRight => FRAC_PI_4,
            Move::ForwardRight | Move::BackwardLeft => -FRAC_PI_4,
        }
    }

    /// Apply this maneuver to a pose. Pure function; no collision
    /// checking happens here.
    pub fn apply(self, pose: &Pose, profile: &Profile) -> Pose {
        match self.turn_params(profile) {
            None => {
                let step = match self.direction() {
                    MotionDir::Forward => profile.straight_step,
                    MotionDir::Backward => -profile.straight_step,
                };
                pose.translated(pose.theta, step)
            }
            Some(turn) => {
                // Chord displacement measured in the robot frame:
                // dx lateral (heading - 90°), dy tangential (along heading)
                let moved = pose
                    .translated(pose.theta - FRAC_PI_2, turn.dx)
                    .translated(pose.theta, turn.dy);
                Pose::new(moved.x, moved.y, pose.theta + self.heading_delta())
            }
        }
    }
}
