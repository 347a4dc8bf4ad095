//! Planning request model and output projection.
//!
//! This is the boundary with the excluded HTTP layer: a validated JSON
//! request in, either a simulator pose trace or a live command stream
//! out. Validation happens before any search begins so malformed input
//! is never reported as a planning failure.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::arena::{Facing, Map, Obstacle};
use crate::commands;
use crate::config::MargaConfig;
use crate::error::{MargaError, Result};
use crate::planning::{find_best_order, Leg, Strategy};

/// Grid-to-centimeter scale for simulator requests.
const SIM_GRID_SCALE: f32 = 5.0;
/// Live requests use a 10cm grid, double the planner's native 5cm snap.
const LIVE_GRID_SCALE: f32 = SIM_GRID_SCALE * 2.0;

/// Request mode: selects only the output projection, never the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Simulator,
    Live,
}

/// One obstacle as reported by the upstream detection system: grid
/// position plus a facing code (1 N, 2 S, 3 E, 4 W).
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ObstacleInput {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub d: u8,
}

/// A full planning request.
#[derive(Clone, Debug, Deserialize)]
pub struct PlanRequest {
    pub obstacles: Vec<ObstacleInput>,
    pub mode: Mode,
    #[serde(default)]
    pub algorithm: Strategy,
}

/// Simulator projection: raw pose trace with parallel motion-direction
/// and steering code lists. Scan pauses appear as a sentinel pose pair.
#[derive(Clone, Debug, Serialize)]
pub struct SimulatorOutput {
    pub positions: Vec<PositionOutput>,
    pub vert: Vec<i8>,
    pub steer: Vec<i8>,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PositionOutput {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

/// Live projection: the controller command stream.
#[derive(Clone, Debug, Serialize)]
pub struct LiveOutput {
    pub commands: Vec<LiveCommand>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LiveCommand {
    pub cat: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum PlanResponse {
    Simulator(SimulatorOutput),
    Live(LiveOutput),
}

/// Validate, plan, and project one request.
pub fn run(request: &PlanRequest, config: &MargaConfig) -> Result<PlanResponse> {
    let profile = config.profile();
    let obstacles = validate_obstacles(request, &profile)?;

    let deadline = match config.planner.timeout_ms {
        0 => None,
        ms => Some(Instant::now() + Duration::from_millis(ms)),
    };

    let map = Map::new(&profile, obstacles);
    let plan = find_best_order(
        &map,
        &profile,
        config.start_pose(),
        request.algorithm,
        config.planner.max_expansions,
        deadline,
    )
    .map_err(|e| match e {
        MargaError::Timeout(_) => MargaError::Timeout(config.planner.timeout_ms),
        other => other,
    })?;

    Ok(match request.mode {
        Mode::Simulator => PlanResponse::Simulator(project_simulator(&plan.legs)),
        Mode::Live => PlanResponse::Live(project_live(&map, &plan.order, &plan.legs)),
    })
}

/// Check facing codes and arena bounds, and scale grid positions into
/// the planner's continuous coordinates. Rejects everything before the
/// planner is ever invoked.
fn validate_obstacles(
    request: &PlanRequest,
    profile: &crate::config::Profile,
) -> Result<Vec<Obstacle>> {
    if request.obstacles.is_empty() {
        return Err(MargaError::Input("obstacle list is empty".into()));
    }

    let scale = match request.mode {
        Mode::Simulator => SIM_GRID_SCALE,
        Mode::Live => LIVE_GRID_SCALE,
    };

    let mut obstacles = Vec::with_capacity(request.obstacles.len());
    for input in &request.obstacles {
        let facing = Facing::from_code(input.d).ok_or_else(|| {
            MargaError::Input(format!(
                "obstacle {}: unrecognized facing code {}",
                input.id, input.d
            ))
        })?;

        let x = input.x as f32 * scale;
        let y = input.y as f32 * scale;
        if x < 0.0 || x > profile.arena_width || y < 0.0 || y > profile.arena_height {
            return Err(MargaError::Input(format!(
                "obstacle {}: position ({}, {}) outside the arena",
                input.id, x, y
            )));
        }

        if obstacles.iter().any(|ob: &Obstacle| ob.id == input.id) {
            return Err(MargaError::Input(format!(
                "duplicate obstacle id {}",
                input.id
            )));
        }
        obstacles.push(Obstacle::new(input.id, x, y, facing));
    }
    Ok(obstacles)
}

/// Sentinel pose pair appended after each leg so the visualization
/// layer knows the robot is holding still to scan.
fn push_scan_sentinels(out: &mut SimulatorOutput) {
    for theta in [-2.0, -1.0] {
        out.positions.push(PositionOutput {
            x: -1.0,
            y: -1.0,
            theta,
        });
        out.vert.push(-2);
        out.steer.push(-2);
    }
}

fn project_simulator(legs: &[Leg]) -> SimulatorOutput {
    let mut out = SimulatorOutput {
        positions: Vec::new(),
        vert: Vec::new(),
        steer: Vec::new(),
    };
    for leg in legs {
        for node in &leg.nodes {
            out.positions.push(PositionOutput {
                x: node.pose.x,
                y: node.pose.y,
                theta: node.pose.theta,
            });
            out.vert.push(node.mv.map(|m| m.direction().code()).unwrap_or(0));
            out.steer.push(node.mv.map(|m| m.steer().code()).unwrap_or(0));
        }
        push_scan_sentinels(&mut out);
    }
    out
}

fn project_live(map: &Map<'_>, order: &[u32], legs: &[Leg]) -> LiveOutput {
    let obstacles = order
        .iter()
        .filter_map(|&id| map.obstacle(id));
    let commands = commands::plan_tokens(legs, obstacles)
        .into_iter()
        .map(|token| LiveCommand {
            cat: "control".to_string(),
            value: token.to_string(),
        })
        .collect();
    LiveOutput { commands }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(obstacles: Vec<ObstacleInput>, mode: Mode) -> PlanRequest {
        PlanRequest {
            obstacles,
            mode,
            algorithm: Strategy::Exhaustive,
        }
    }

    #[test]
    fn test_request_parses_json() {
        let json = r#"{
            "obstacles": [{"id": 1, "x": 5, "y": 5, "d": 2}],
            "mode": "live",
            "algorithm": "nearest"
        }"#;
        let req: PlanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.mode, Mode::Live);
        assert_eq!(req.algorithm, Strategy::Nearest);
        assert_eq!(req.obstacles[0].d, 2);
    }

    #[test]
    fn test_algorithm_defaults_to_exhaustive() {
        let json = r#"{"obstacles": [{"id": 1, "x": 5, "y": 5, "d": 2}], "mode": "simulator"}"#;
        let req: PlanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.algorithm, Strategy::Exhaustive);
    }

    #[test]
    fn test_malformed_facing_rejected() {
        let config = MargaConfig::default();
        let req = request(
            vec![ObstacleInput {
                id: 1,
                x: 5,
                y: 5,
                d: 9,
            }],
            Mode::Simulator,
        );
        match run(&req, &config) {
            Err(MargaError::Input(msg)) => assert!(msg.contains("facing")),
            other => panic!("expected Input error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_out_of_arena_rejected() {
        let config = MargaConfig::default();
        let req = request(
            vec![ObstacleInput {
                id: 1,
                x: 50,
                y: 5,
                d: 1,
            }],
            Mode::Live, // 50 * 10 = 500cm, outside the 200cm arena
        );
        assert!(matches!(run(&req, &config), Err(MargaError::Input(_))));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let config = MargaConfig::default();
        let req = request(
            vec![
                ObstacleInput {
                    id: 1,
                    x: 5,
                    y: 5,
                    d: 1,
                },
                ObstacleInput {
                    id: 1,
                    x: 10,
                    y: 10,
                    d: 2,
                },
            ],
            Mode::Simulator,
        );
        assert!(matches!(run(&req, &config), Err(MargaError::Input(_))));
    }

    #[test]
    fn test_live_scale_doubles_simulator_scale() {
        assert_eq!(LIVE_GRID_SCALE, 2.0 * SIM_GRID_SCALE);
    }
}
