//! Visit-order search over the obstacle set.
//!
//! Decides the order in which obstacles are scanned, driving the A*
//! planner once per candidate leg. Strategies form a closed set so
//! alternatives can trade optimality for runtime without touching the
//! planner or command synthesizer.

use std::time::Instant;

use serde::Deserialize;

use crate::arena::Map;
use crate::config::Profile;
use crate::error::{MargaError, Result};
use crate::geometry::Pose;

use super::astar::{Leg, Planner};

/// Visit-order search strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Enumerate every permutation and keep the cheapest feasible one.
    /// Optimal; factorial in the obstacle count.
    #[default]
    Exhaustive,
    /// Greedily visit the nearest remaining approach pose. Fast, not
    /// optimal.
    Nearest,
}

/// A complete plan: the chosen visit order and one leg per obstacle, in
/// visiting order.
#[derive(Clone, Debug)]
pub struct Plan {
    /// Obstacle ids in visiting order (a permutation of the input ids)
    pub order: Vec<u32>,
    pub legs: Vec<Leg>,
    /// Sum of the legs' costs
    pub total_cost: f32,
}

/// Find the best obstacle visiting order from `start`, per `strategy`.
///
/// Per-permutation infeasibility is recovered locally (that order is
/// discarded); if no order yields a complete plan the whole search
/// fails with [`MargaError::NoPath`]. A timeout aborts everything.
pub fn find_best_order(
    map: &Map<'_>,
    profile: &Profile,
    start: Pose,
    strategy: Strategy,
    max_expansions: usize,
    deadline: Option<Instant>,
) -> Result<Plan> {
    if map.obstacles().is_empty() {
        return Err(MargaError::Input("no obstacles to visit".into()));
    }

    let planner = Planner::new(map, profile, max_expansions);
    let plan = match strategy {
        Strategy::Exhaustive => exhaustive(map, profile, &planner, start, deadline)?,
        Strategy::Nearest => nearest(map, profile, &planner, start, deadline)?,
    };

    tracing::info!(
        order = ?plan.order,
        cost = plan.total_cost,
        "visit order selected"
    );
    Ok(plan)
}

/// Plan the legs for one fixed visiting order. `None` means some leg
/// has no feasible path or ran out of expansion budget; timeouts
/// propagate as errors.
fn plan_order(
    map: &Map<'_>,
    profile: &Profile,
    planner: &Planner<'_>,
    start: Pose,
    order: &[u32],
    deadline: Option<Instant>,
) -> Result<Option<Plan>> {
    let mut legs = Vec::with_capacity(order.len());
    let mut pose = start;
    let mut total_cost = 0.0;

    for &id in order {
        // Ids were validated against the map before planning began
        let ob = map
            .obstacle(id)
            .ok_or_else(|| MargaError::Input(format!("unknown obstacle id {}", id)))?;
        let goal = ob.approach_pose(profile);
        match planner.plan(pose, goal, deadline) {
            Ok(leg) => {
                pose = leg.terminal_pose();
                total_cost += leg.cost;
                legs.push(leg);
            }
            Err(MargaError::NoPath(_) | MargaError::BudgetExhausted(_)) => {
                tracing::debug!(?order, obstacle = id, "leg infeasible, discarding order");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Some(Plan {
        order: order.to_vec(),
        legs,
        total_cost,
    }))
}

fn exhaustive(
    map: &Map<'_>,
    profile: &Profile,
    planner: &Planner<'_>,
    start: Pose,
    deadline: Option<Instant>,
) -> Result<Plan> {
    let mut ids: Vec<u32> = map.obstacles().iter().map(|ob| ob.id).collect();
    ids.sort_unstable();

    let mut best: Option<Plan> = None;
    let mut order = ids;
    loop {
        if let Some(plan) = plan_order(map, profile, planner, start, &order, deadline)? {
            // Strict inequality keeps the lexicographically earliest
            // order among equal-cost plans
            if best
                .as_ref()
                .map(|b| plan.total_cost < b.total_cost)
                .unwrap_or(true)
            {
                best = Some(plan);
            }
        }
        if !next_permutation(&mut order) {
            break;
        }
    }

    best.ok_or_else(|| MargaError::NoPath("no visiting order yields a complete plan".into()))
}

fn nearest(
    map: &Map<'_>,
    profile: &Profile,
    planner: &Planner<'_>,
    start: Pose,
    deadline: Option<Instant>,
) -> Result<Plan> {
    let mut remaining: Vec<u32> = map.obstacles().iter().map(|ob| ob.id).collect();
    remaining.sort_unstable();

    let mut order = Vec::with_capacity(remaining.len());
    let mut legs = Vec::with_capacity(remaining.len());
    let mut pose = start;
    let mut total_cost = 0.0;

    while !remaining.is_empty() {
        // Closest approach pose first; on infeasibility fall through to
        // the next closest
        let mut candidates: Vec<(u32, Pose)> = map
            .obstacles()
            .iter()
            .filter(|ob| remaining.contains(&ob.id))
            .map(|ob| (ob.id, ob.approach_pose(profile)))
            .collect();
        candidates.sort_by(|a, b| {
            let da = pose.distance_to(&a.1);
            let db = pose.distance_to(&b.1);
            da.partial_cmp(&db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut planned = None;
        for &(id, goal) in &candidates {
            match planner.plan(pose, goal, deadline) {
                Ok(leg) => {
                    planned = Some((id, leg));
                    break;
                }
                Err(MargaError::NoPath(_) | MargaError::BudgetExhausted(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        let (id, leg) = planned.ok_or_else(|| {
            MargaError::NoPath(format!("no reachable obstacle among {:?}", remaining))
        })?;
        pose = leg.terminal_pose();
        total_cost += leg.cost;
        order.push(id);
        legs.push(leg);
        remaining.retain(|&r| r != id);
    }

    Ok(Plan {
        order,
        legs,
        total_cost,
    })
}

/// Advance `items` to its next lexicographic permutation in place.
/// Returns false once the sequence is the last permutation.
fn next_permutation(items: &mut [u32]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let Some(i) = (0..items.len() - 1).rev().find(|&i| items[i] < items[i + 1]) else {
        return false;
    };
    let j = (i + 1..items.len())
        .rev()
        .find(|&j| items[j] > items[i])
        .expect("successor exists by choice of pivot");
    items.swap(i, j);
    items[i + 1..].reverse();
    true
}
