//! Obstacle and arena model.
//!
//! This module provides:
//! - Obstacle placement, facing, and derived approach pose
//! - Two-phase exclusion-zone testing (broad bounding interval, then
//!   maneuver-specific ellipse)

mod map;
mod obstacle;

pub use map::Map;
pub use obstacle::{Facing, Obstacle};
