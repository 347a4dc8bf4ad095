//! MargaNav - Obstacle-visit motion planner for a wheeled scanning robot.
//!
//! Plans the motion of a car-like robot that must drive up to a set of
//! fixed obstacles, stop at a prescribed approach pose in front of each,
//! and capture a sensor snapshot before moving on. Planning happens in
//! three layers:
//!
//! - **Pose-space A\*** ([`planning::Planner`]): searches a discretized
//!   (x, y, theta) space using the robot's six fixed maneuvers, with
//!   ellipse-based swept-area collision checks per maneuver.
//! - **Visit-order search** ([`planning::find_best_order`]): finds the
//!   obstacle visiting order with minimum total path cost, using the
//!   planner as a leg-cost oracle.
//! - **Command synthesis** ([`commands`]): compresses each leg's node
//!   sequence into a minimal, magnitude-capped instruction stream for the
//!   downstream motion controller.

pub mod arena;
pub mod commands;
pub mod config;
pub mod error;
pub mod geometry;
pub mod planning;
pub mod request;

pub use arena::{Facing, Map, Obstacle};
pub use config::{MargaConfig, Profile};
pub use error::{MargaError, Result};
pub use geometry::Pose;
pub use planning::{Leg, Planner, Strategy};
pub use request::{Mode, PlanRequest, PlanResponse};
