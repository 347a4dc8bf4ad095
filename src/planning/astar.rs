//! Pose-space A* planner.
//!
//! Searches the continuous pose space discretized by grid-snap keys: the
//! open/closed sets are keyed on quantized cells while successor poses
//! stay exact, so discretization error never accumulates along a path.
//! Nodes live in an index-addressed arena with parent links, making path
//! reconstruction a pointer-free walk.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Instant;

use crate::arena::Map;
use crate::config::Profile;
use crate::error::{MargaError, Result};
use crate::geometry::{normalize_angle, quantize, Pose};

use super::moves::Move;

/// One step of a planned leg: the exact pose reached, the maneuver that
/// produced it (`None` for the leg's seed pose), and the physical
/// distance of that maneuver.
#[derive(Clone, Copy, Debug)]
pub struct PathNode {
    pub pose: Pose,
    pub mv: Option<Move>,
    pub dist: f32,
}

/// A planned leg from one pose to an obstacle's approach pose.
/// Immutable once returned by the planner.
#[derive(Clone, Debug)]
pub struct Leg {
    pub nodes: Vec<PathNode>,
    pub cost: f32,
}

impl Leg {
    /// Exact pose the robot ends this leg at.
    pub fn terminal_pose(&self) -> Pose {
        self.nodes.last().map(|n| n.pose).unwrap_or(Pose::new(0.0, 0.0, 0.0))
    }
}

/// Search-arena node. Parents always precede children in the arena, so
/// reconstruction terminates.
struct Node {
    pose: Pose,
    mv: Option<Move>,
    g: f32,
    parent: Option<usize>,
}

/// Open-set entry; ordered by f ascending, then insertion sequence so
/// ties resolve deterministically regardless of heap internals.
struct OpenEntry {
    f: f32,
    seq: u64,
    idx: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lower f = higher priority);
        // earlier insertion wins among equal f
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* planner over the discretized pose space.
pub struct Planner<'a> {
    map: &'a Map<'a>,
    profile: &'a Profile,
    max_expansions: usize,
}

impl<'a> Planner<'a> {
    pub fn new(map: &'a Map<'a>, profile: &'a Profile, max_expansions: usize) -> Self {
        Self {
            map,
            profile,
            max_expansions,
        }
    }

    /// Plan a single leg from `start` to the goal-relative tolerance box
    /// around `goal`.
    ///
    /// Fails with [`MargaError::NoPath`] when the open set exhausts,
    /// [`MargaError::BudgetExhausted`] when the expansion budget runs
    /// out first, and [`MargaError::Timeout`] when `deadline` passes
    /// mid-search.
    pub fn plan(&self, start: Pose, goal: Pose, deadline: Option<Instant>) -> Result<Leg> {
        let p = self.profile;

        let mut arena: Vec<Node> = vec![Node {
            pose: start,
            mv: None,
            g: 0.0,
            parent: None,
        }];
        let mut open = BinaryHeap::new();
        let mut closed: HashSet<_> = HashSet::new();
        let mut seq: u64 = 0;

        open.push(OpenEntry {
            f: start.distance_to(&goal),
            seq,
            idx: 0,
        });

        let mut expansions = 0usize;

        while let Some(entry) = open.pop() {
            let idx = entry.idx;
            let (pose, g, mv) = {
                let node = &arena[idx];
                (node.pose, node.g, node.mv)
            };

            if self.at_goal(&pose, &goal) {
                return Ok(self.reconstruct(&arena, idx, g));
            }

            let cell = quantize(&pose, p.snap_coord, p.snap_theta_deg);
            if !closed.insert(cell) {
                continue;
            }

            expansions += 1;
            if expansions > self.max_expansions {
                tracing::warn!(expansions, "planner exceeded expansion budget");
                return Err(MargaError::BudgetExhausted(expansions));
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(MargaError::Timeout(0));
                }
            }

            for next_mv in Move::ALL {
                let next_pose = next_mv.apply(&pose, p);
                if self.map.is_blocked(&next_pose, next_mv) {
                    continue;
                }
                if closed.contains(&quantize(&next_pose, p.snap_coord, p.snap_theta_deg)) {
                    continue;
                }

                // Changing direction or steering means the robot has to
                // stop and re-accelerate
                let stop_penalty = match mv {
                    Some(prev)
                        if prev.direction() != next_mv.direction()
                            || prev.steer() != next_mv.steer() =>
                    {
                        p.stop_penalty
                    }
                    _ => 0.0,
                };
                let next_g = g + next_mv.distance(p) + stop_penalty;

                arena.push(Node {
                    pose: next_pose,
                    mv: Some(next_mv),
                    g: next_g,
                    parent: Some(idx),
                });
                seq += 1;
                open.push(OpenEntry {
                    f: next_g + next_pose.distance_to(&goal),
                    seq,
                    idx: arena.len() - 1,
                });
            }
        }

        tracing::debug!(
            ?goal,
            expansions,
            "open set exhausted without reaching goal"
        );
        Err(MargaError::NoPath(format!(
            "no feasible path to ({:.0}, {:.0})",
            goal.x, goal.y
        )))
    }

    /// Goal test: inside the per-side tolerance box and within the
    /// heading tolerance. The discretized space cannot land exactly on a
    /// continuous target, so exact equality would never terminate.
    fn at_goal(&self, pose: &Pose, goal: &Pose) -> bool {
        let p = self.profile;
        let dx = pose.x - goal.x;
        let dy = pose.y - goal.y;
        dx >= -p.x_tol.0
            && dx <= p.x_tol.1
            && dy <= p.y_tol.0
            && dy >= -p.y_tol.1
            && normalize_angle(pose.theta - goal.theta).abs() <= p.max_theta_err
    }

    fn reconstruct(&self, arena: &[Node], goal_idx: usize, cost: f32) -> Leg {
        let mut nodes = Vec::new();
        let mut current = Some(goal_idx);
        while let Some(idx) = current {
            let node = &arena[idx];
            nodes.push(PathNode {
                pose: node.pose,
                mv: node.mv,
                dist: node.mv.map(|m| m.distance(self.profile)).unwrap_or(0.0),
            });
            current = node.parent;
        }
        nodes.reverse();
        Leg { nodes, cost }
    }
}
