//! End-to-end planning scenarios through the request layer.

use marga_nav::config::MargaConfig;
use marga_nav::error::MargaError;
use marga_nav::request::{run, Mode, ObstacleInput, PlanRequest, PlanResponse};
use marga_nav::Strategy;

fn obstacle(id: u32, x: i32, y: i32, d: u8) -> ObstacleInput {
    ObstacleInput { id, x, y, d }
}

fn live_request(obstacles: Vec<ObstacleInput>) -> PlanRequest {
    PlanRequest {
        obstacles,
        mode: Mode::Live,
        algorithm: Strategy::Exhaustive,
    }
}

#[test]
fn single_obstacle_live_command_stream() {
    // One obstacle at grid (5, 5) facing south; robot starts at
    // (0, 10, 90°). The plan is one leg ending in front of the
    // obstacle's south face, then EC + SNAP1, then the terminal token.
    let config = MargaConfig::default();
    let request = live_request(vec![obstacle(1, 5, 5, 2)]);

    let response = run(&request, &config).expect("plan should succeed");
    let output = match response {
        PlanResponse::Live(output) => output,
        PlanResponse::Simulator(_) => panic!("expected live output"),
    };

    let values: Vec<&str> = output.commands.iter().map(|c| c.value.as_str()).collect();
    assert!(values.len() >= 4, "expected moves + EC + SNAP + FIN: {:?}", values);

    // Every command is tagged as a control command
    assert!(output.commands.iter().all(|c| c.cat == "control"));

    // Tail: error correction, scan marker, terminal token
    let n = values.len();
    assert_eq!(values[n - 1], "FINXX");
    assert_eq!(values[n - 2], "SNAP1");
    assert!(values[n - 3].starts_with("EC"), "missing EC token: {:?}", values);

    // Everything before that is a move token with a bounded magnitude
    for value in &values[..n - 3] {
        let mnemonic = &value[..2];
        assert!(
            matches!(mnemonic, "FW" | "BW" | "FL" | "FR" | "BL" | "BR"),
            "unexpected token {}",
            value
        );
        if mnemonic == "FW" || mnemonic == "BW" {
            let magnitude: u32 = value[2..].parse().expect("numeric magnitude");
            assert!(magnitude < 100, "magnitude {} reaches the cap", magnitude);
        } else {
            assert_eq!(&value[2..], "045");
        }
    }
}

#[test]
fn two_obstacles_prefer_shorter_ordering() {
    // Obstacle 1 sits between the start and obstacle 2, so visiting
    // 1 before 2 is strictly shorter than doubling back.
    let config = MargaConfig::default();
    let request = live_request(vec![obstacle(1, 5, 5, 2), obstacle(2, 15, 5, 2)]);

    let response = run(&request, &config).expect("plan should succeed");
    let output = match response {
        PlanResponse::Live(output) => output,
        PlanResponse::Simulator(_) => panic!("expected live output"),
    };

    let snaps: Vec<&str> = output
        .commands
        .iter()
        .map(|c| c.value.as_str())
        .filter(|v| v.starts_with("SNAP"))
        .collect();
    assert_eq!(snaps, vec!["SNAP1", "SNAP2"]);
    assert_eq!(output.commands.last().unwrap().value, "FINXX");
}

#[test]
fn simulator_trace_has_scan_sentinels() {
    let config = MargaConfig::default();
    let request = PlanRequest {
        obstacles: vec![obstacle(1, 20, 20, 2)],
        mode: Mode::Simulator,
        algorithm: Strategy::Exhaustive,
    };

    let response = run(&request, &config).expect("plan should succeed");
    let output = match response {
        PlanResponse::Simulator(output) => output,
        PlanResponse::Live(_) => panic!("expected simulator output"),
    };

    assert_eq!(output.positions.len(), output.vert.len());
    assert_eq!(output.positions.len(), output.steer.len());
    assert!(output.positions.len() > 2);

    // The trace starts at the configured start pose
    assert_eq!(output.positions[0].x, 0.0);
    assert_eq!(output.positions[0].y, 10.0);

    // One leg: the trace ends with the scanning sentinel pair
    let n = output.positions.len();
    assert_eq!(output.positions[n - 2].theta, -2.0);
    assert_eq!(output.positions[n - 1].theta, -1.0);
    for i in [n - 2, n - 1] {
        assert_eq!(output.positions[i].x, -1.0);
        assert_eq!(output.positions[i].y, -1.0);
        assert_eq!(output.vert[i], -2);
        assert_eq!(output.steer[i], -2);
    }

    // Interior codes stay within the maneuver alphabet
    for i in 0..n - 2 {
        assert!(matches!(output.vert[i], -1 | 0 | 1));
        assert!(matches!(output.steer[i], -1 | 0 | 1));
    }
}

#[test]
fn malformed_facing_fails_before_planning() {
    let config = MargaConfig::default();
    let request = live_request(vec![obstacle(1, 5, 5, 9)]);

    match run(&request, &config) {
        Err(MargaError::Input(msg)) => {
            assert!(msg.contains("facing"), "unexpected message: {}", msg)
        }
        Err(other) => panic!("expected input validation failure, got {}", other),
        Ok(_) => panic!("facing code 9 must be rejected"),
    }
}

#[test]
fn nearest_strategy_still_visits_everything() {
    let config = MargaConfig::default();
    let request = PlanRequest {
        obstacles: vec![obstacle(1, 5, 5, 2), obstacle(2, 15, 5, 2)],
        mode: Mode::Live,
        algorithm: Strategy::Nearest,
    };

    let response = run(&request, &config).expect("plan should succeed");
    let output = match response {
        PlanResponse::Live(output) => output,
        PlanResponse::Simulator(_) => panic!("expected live output"),
    };

    let mut snaps: Vec<String> = output
        .commands
        .iter()
        .map(|c| c.value.clone())
        .filter(|v| v.starts_with("SNAP"))
        .collect();
    snaps.sort();
    assert_eq!(snaps, vec!["SNAP1", "SNAP2"]);
}
