//! Configuration and calibration profiles for MargaNav.
//!
//! All maneuver geometry (displacements, ellipse semi-axes, broad-phase
//! reach) is calibration data measured on the physical robot, fixed at
//! process start. The [`Profile`] struct is built once and passed by
//! reference into the map, planner, and synthesizer; nothing re-derives
//! these values at runtime.

use crate::error::{MargaError, Result};
use serde::Deserialize;
use std::f32::consts::PI;
use std::path::Path;

/// Calibration environment the robot was measured in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Indoor,
    Outdoor,
}

/// Geometry of one 45° maneuver.
///
/// `dx`/`dy` are the measured chord displacement in the robot frame
/// (lateral, tangential). `a`/`b` are the swept ellipse's semi-axes and
/// `outer` the maneuver's outer reach used for broad-phase filtering.
/// `arc` and the bound intervals are derived at profile construction.
#[derive(Clone, Copy, Debug)]
pub struct TurnParams {
    pub dx: f32,
    pub dy: f32,
    pub a: f32,
    pub b: f32,
    pub outer: f32,
    /// Physical arc length of the maneuver (quarter ellipse circumference)
    pub arc: f32,
    /// Broad-phase x interval around an obstacle: (left, right)
    pub x_bound: (f32, f32),
    /// Broad-phase y interval around an obstacle: (up, down)
    pub y_bound: (f32, f32),
}

/// Immutable calibration profile: robot dimensions, maneuver geometry,
/// search tolerances, and arena size.
#[derive(Clone, Debug)]
pub struct Profile {
    /// Straight-move step length (cm), both directions
    pub straight_step: f32,
    pub fl: TurnParams,
    pub fr: TurnParams,
    pub bl: TurnParams,
    pub br: TurnParams,

    /// Added edge cost whenever a maneuver changes direction or steering
    pub stop_penalty: f32,
    /// Goal heading tolerance (radians)
    pub max_theta_err: f32,
    /// Goal x tolerance: (left, right)
    pub x_tol: (f32, f32),
    /// Goal y tolerance: (up, down)
    pub y_tol: (f32, f32),

    /// Grid snap pitch for the A* closed set (cm)
    pub snap_coord: f32,
    /// Angular snap pitch for the A* closed set (degrees)
    pub snap_theta_deg: f32,

    /// Robot bounding box (cm)
    pub robot_width: f32,
    pub robot_height: f32,
    /// Half the difference between bounding and actual robot height
    pub robot_vert_offset: f32,

    /// Obstacle footprint side length (cm)
    pub obstacle_width: f32,
    /// Extra tolerance added to collision inflation (cm)
    pub edge_tol: f32,
    /// Widening applied to backward-maneuver ellipse axes
    pub backwards_mult: f32,

    pub arena_width: f32,
    pub arena_height: f32,

    /// Minimum camera-to-obstacle distance for a usable snapshot (cm)
    pub camera_dist: f32,
}

/// Ramanujan's approximation of an ellipse's circumference.
fn ellipse_circumference(a: f32, b: f32) -> f32 {
    PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt())
}

impl Profile {
    /// Indoor calibration (lab floor).
    pub fn indoor() -> Self {
        Self::build(
            // dx, dy, a, b, outer per maneuver
            (-5.0, 12.1, 17.1, 17.1, 41.0),
            (11.4, 26.9, 38.3, 38.3, 54.0),
            (-5.1, -12.4, 17.5, 17.5, 47.0),
            (10.3, -28.4, 38.7, 38.7, 69.0),
        )
    }

    /// Outdoor calibration (corridor).
    pub fn outdoor() -> Self {
        Self::build(
            (-5.4, 13.1, 18.5, 18.5, 40.8),
            (11.6, 28.2, 39.8, 39.8, 51.6),
            (-5.1, -14.3, 19.4, 19.4, 46.7),
            (10.9, -27.9, 38.8, 38.8, 63.0),
        )
    }

    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Indoor => Self::indoor(),
            Environment::Outdoor => Self::outdoor(),
        }
    }

    fn build(
        fl: (f32, f32, f32, f32, f32),
        fr: (f32, f32, f32, f32, f32),
        bl: (f32, f32, f32, f32, f32),
        br: (f32, f32, f32, f32, f32),
    ) -> Self {
        let robot_width = 25.0_f32;
        let robot_height = 28.0_f32;
        let robot_actual_height = 23.0_f32;
        let vert_offset = (robot_height - robot_actual_height) / 2.0;
        let obstacle_width = 10.0_f32;
        let ow = obstacle_width / 2.0;
        let backwards_mult = 1.5_f32;

        let turn = |p: (f32, f32, f32, f32, f32)| TurnParams {
            dx: p.0,
            dy: p.1,
            a: p.2,
            b: p.3,
            outer: p.4,
            arc: ellipse_circumference(p.2, p.3) / 4.0,
            x_bound: (0.0, 0.0),
            y_bound: (0.0, 0.0),
        };
        let mut fl = turn(fl);
        let mut fr = turn(fr);
        let mut bl = turn(bl);
        let mut br = turn(br);

        // Broad-phase reach intervals, measured bottom-left on the
        // physical robot. The asymmetry between the four maneuvers (and
        // the FL term inside the FR bound) reflects how the calibration
        // was taken, not a derivable symmetry.
        fl.x_bound = (
            ow + fl.a - robot_width / 2.0 + robot_height - vert_offset,
            ow + robot_width,
        );
        fl.y_bound = (ow + fl.outer + (fl.b - fl.a) + vert_offset, ow);

        fr.x_bound = (
            ow,
            ow + fr.a + robot_width / 2.0 + robot_height - vert_offset,
        );
        fr.y_bound = (ow + fr.outer + (fr.b - fl.a) + vert_offset, ow);

        bl.x_bound = (
            ow + (bl.a * backwards_mult) - robot_width / 2.0 + vert_offset,
            ow + bl.outer - ((bl.a * backwards_mult) - robot_width / 2.0),
        );
        bl.y_bound = (
            ow + robot_height,
            ow + (bl.b * backwards_mult) + robot_width / 2.0 - vert_offset,
        );

        br.x_bound = (
            ow + br.outer - (br.a * backwards_mult) - robot_width / 2.0,
            ow + (br.a * backwards_mult) + robot_width / 2.0 + vert_offset,
        );
        br.y_bound = (
            ow + robot_height,
            ow + (br.b * backwards_mult) + robot_width / 2.0 - vert_offset,
        );

        Self {
            straight_step: 5.0,
            fl,
            fr,
            bl,
            br,
            stop_penalty: 40.0,
            max_theta_err: PI / 12.0,
            x_tol: (5.0, 5.0),
            y_tol: (7.5, 10.0),
            snap_coord: 5.0,
            snap_theta_deg: 15.0,
            robot_width,
            robot_height,
            robot_vert_offset: vert_offset,
            obstacle_width,
            edge_tol: 0.1,
            backwards_mult,
            arena_width: 200.0,
            arena_height: 200.0,
            camera_dist: 20.0,
        }
    }
}

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct MargaConfig {
    /// Which calibration profile to use
    #[serde(default = "default_environment")]
    pub environment: Environment,

    #[serde(default)]
    pub start: StartConfig,

    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Fixed start pose of the robot
#[derive(Clone, Debug, Deserialize)]
pub struct StartConfig {
    #[serde(default = "default_start_x")]
    pub x: f32,
    #[serde(default = "default_start_y")]
    pub y: f32,
    /// Heading in degrees
    #[serde(default = "default_start_theta_deg")]
    pub theta_deg: f32,
}

/// Search tuning
#[derive(Clone, Debug, Deserialize)]
pub struct PlannerConfig {
    /// Maximum A* expansions per leg before giving up
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,

    /// Overall planning deadline in milliseconds (0 = unlimited)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_environment() -> Environment {
    Environment::Indoor
}
fn default_start_x() -> f32 {
    0.0
}
fn default_start_y() -> f32 {
    10.0
}
fn default_start_theta_deg() -> f32 {
    90.0
}
fn default_max_expansions() -> usize {
    200_000
}
fn default_timeout_ms() -> u64 {
    0
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            x: default_start_x(),
            y: default_start_y(),
            theta_deg: default_start_theta_deg(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: default_max_expansions(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for MargaConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            start: StartConfig::default(),
            planner: PlannerConfig::default(),
        }
    }
}

impl MargaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MargaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: MargaConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build the calibration profile selected by this configuration.
    pub fn profile(&self) -> Profile {
        Profile::for_environment(self.environment)
    }

    /// The configured start pose (heading converted to radians).
    pub fn start_pose(&self) -> crate::geometry::Pose {
        crate::geometry::Pose::new(self.start.x, self.start.y, self.start.theta_deg.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_length_matches_quarter_circle() {
        // For a == b the ellipse is a circle and the quarter arc is πr/2
        let p = Profile::indoor();
        let expected = PI * p.fl.a / 2.0;
        assert!((p.fl.arc - expected).abs() < 0.05);
    }

    #[test]
    fn test_backward_bounds_wider_than_forward() {
        let p = Profile::indoor();
        // Reversing carries more positional uncertainty, so the backward
        // broad-phase reach must not be tighter than the forward one
        assert!(p.bl.y_bound.1 > p.fl.y_bound.1);
        assert!(p.br.y_bound.1 > p.fr.y_bound.1);
    }

    #[test]
    fn test_profiles_differ() {
        let indoor = Profile::indoor();
        let outdoor = Profile::outdoor();
        assert!(indoor.fl.a != outdoor.fl.a);
        assert_eq!(indoor.straight_step, outdoor.straight_step);
    }

    #[test]
    fn test_config_parses_toml() {
        let toml_str = r#"
            environment = "outdoor"

            [start]
            x = 10.0

            [planner]
            timeout_ms = 2000
        "#;
        let config: MargaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.environment, Environment::Outdoor);
        assert_eq!(config.start.x, 10.0);
        // Unspecified fields fall back to defaults
        assert_eq!(config.start.y, 10.0);
        assert_eq!(config.planner.timeout_ms, 2000);
        assert_eq!(config.planner.max_expansions, 200_000);
    }
}
