//! Command synthesis for the downstream motion controller.
//!
//! Converts a planned leg's node sequence into the controller's
//! fixed-format token stream: run-length merged straight moves with a
//! magnitude cap, fixed 45° turn tokens, an error-correction token and a
//! scan marker per leg, and a single terminal token.

use std::fmt;

use crate::arena::Obstacle;
use crate::planning::{Leg, MotionDir, Steer};

/// Merged straight-move magnitudes at or above this split in two. The
/// 3-digit field could hold up to 999, but the controller is only
/// reliable below this; keep the value, do not infer a different cap.
pub const MAX_STRAIGHT_CMD: u32 = 100;

/// Side of a fixed 45° arc. Straight motion never forms a turn token,
/// so the side is a two-state type rather than a full steering mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnSide {
    Left,
    Right,
}

/// One fixed-format controller instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Straight move with a distance magnitude in cm
    Straight { dir: MotionDir, dist: u32 },
    /// Fixed 45° arc; magnitude is calibrated, not parameterized
    Turn { dir: MotionDir, side: TurnSide },
    /// Signed residual distance along the obstacle's facing axis
    ErrorCorrection(i32),
    /// Scan marker carrying the obstacle id just reached
    Snap(u32),
    /// End-of-plan marker
    Finish,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Token::Straight { dir, dist } => {
                let mnemonic = match dir {
                    MotionDir::Forward => "FW",
                    MotionDir::Backward => "BW",
                };
                write!(f, "{}{:03}", mnemonic, dist)
            }
            Token::Turn { dir, side } => {
                let mnemonic = match (dir, side) {
                    (MotionDir::Forward, TurnSide::Left) => "FL",
                    (MotionDir::Forward, TurnSide::Right) => "FR",
                    (MotionDir::Backward, TurnSide::Left) => "BL",
                    (MotionDir::Backward, TurnSide::Right) => "BR",
                };
                write!(f, "{}045", mnemonic)
            }
            Token::ErrorCorrection(residual) => write!(f, "EC{:03}", residual),
            Token::Snap(id) => write!(f, "SNAP{}", id),
            Token::Finish => write!(f, "FINXX"),
        }
    }
}

/// Tokens for one leg: merged moves, then the error-correction residual
/// toward the obstacle's exact coordinate, then the scan marker.
pub fn leg_tokens(leg: &Leg, ob: &Obstacle) -> Vec<Token> {
    let mut tokens = merge_straights(raw_tokens(leg));

    let residual = ob.facing_axis_residual(&leg.terminal_pose());
    tokens.push(Token::ErrorCorrection(residual.trunc() as i32));
    tokens.push(Token::Snap(ob.id));
    tokens
}

/// One token per interior node, unmerged. Zero-distance nodes (the
/// leg's seed pose) are dropped.
fn raw_tokens(leg: &Leg) -> Vec<Token> {
    leg.nodes
        .iter()
        .filter_map(|node| {
            let mv = node.mv?;
            if node.dist == 0.0 {
                return None;
            }
            Some(match mv.steer() {
                Steer::Straight => Token::Straight {
                    dir: mv.direction(),
                    dist: node.dist.round() as u32,
                },
                Steer::Left => Token::Turn {
                    dir: mv.direction(),
                    side: TurnSide::Left,
                },
                Steer::Right => Token::Turn {
                    dir: mv.direction(),
                    side: TurnSide::Right,
                },
            })
        })
        .collect()
}

/// Run-length merge consecutive straight moves sharing a direction. A
/// run breaks on a direction change or any turn token.
fn merge_straights(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut run: Option<(MotionDir, u32)> = None;

    for token in tokens {
        match token {
            Token::Straight { dir, dist } => match run {
                Some((run_dir, sum)) if run_dir == dir => run = Some((run_dir, sum + dist)),
                Some((run_dir, sum)) => {
                    flush_run(run_dir, sum, &mut out);
                    run = Some((dir, dist));
                }
                None => run = Some((dir, dist)),
            },
            other => {
                if let Some((run_dir, sum)) = run.take() {
                    flush_run(run_dir, sum, &mut out);
                }
                out.push(other);
            }
        }
    }
    if let Some((run_dir, sum)) = run {
        flush_run(run_dir, sum, &mut out);
    }
    out
}

/// Emit a merged run, splitting any magnitude that reaches the cap into
/// near-equal halves so no single command leaves the controller's
/// reliable envelope. Total distance is preserved exactly.
fn flush_run(dir: MotionDir, sum: u32, out: &mut Vec<Token>) {
    if sum == 0 {
        return;
    }
    if sum >= MAX_STRAIGHT_CMD {
        let half = sum / 2;
        flush_run(dir, half, out);
        flush_run(dir, sum - half, out);
    } else {
        out.push(Token::Straight { dir, dist: sum });
    }
}

/// Full live-mode command stream for a plan: every leg's tokens followed
/// by the terminal marker.
pub fn plan_tokens<'a>(
    legs: &[Leg],
    obstacles: impl Iterator<Item = &'a Obstacle>,
) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (leg, ob) in legs.iter().zip(obstacles) {
        tokens.extend(leg_tokens(leg, ob));
    }
    tokens.push(Token::Finish);
    tokens
}
