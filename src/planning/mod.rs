//! Motion planning: move primitives, pose-space A*, and visit-order
//! search.
//!
//! This module provides:
//! - The six fixed move primitives and their calibrated geometry
//! - An A* planner over the grid-snapped pose space
//! - Visit-order strategies that drive the planner leg by leg

mod astar;
mod moves;
mod sequencer;

pub use astar::{Leg, PathNode, Planner};
pub use moves::{MotionDir, Move, Steer};
pub use sequencer::{find_best_order, Plan, Strategy};
