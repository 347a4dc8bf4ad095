//! Bounded arena with exclusion-zone testing.

use crate::config::Profile;
use crate::geometry::Pose;
use crate::planning::Move;

use super::Obstacle;

/// The arena and its fixed obstacle set. Read-only during search; owns
/// the exclusion-zone test the planner consults for every candidate
/// pose.
pub struct Map<'a> {
    profile: &'a Profile,
    obstacles: Vec<Obstacle>,
}

impl<'a> Map<'a> {
    pub fn new(profile: &'a Profile, obstacles: Vec<Obstacle>) -> Self {
        Self { profile, obstacles }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacle(&self, id: u32) -> Option<&Obstacle> {
        self.obstacles.iter().find(|ob| ob.id == id)
    }

    /// Whether a pose reached via `mv` violates the arena boundary or
    /// any obstacle's exclusion zone.
    ///
    /// Two-phase: a cheap per-maneuver bounding-interval filter keeps the
    /// ellipse test to nearby obstacles only. Returns on the first
    /// violation found.
    pub fn is_blocked(&self, pose: &Pose, mv: Move) -> bool {
        if pose.x < 0.0
            || pose.x > self.profile.arena_width
            || pose.y < 0.0
            || pose.y > self.profile.arena_height
        {
            return true;
        }

        for ob in &self.obstacles {
            if !self.near(pose, mv, ob) {
                continue;
            }
            if self.footprint_hits(pose, mv, ob) {
                tracing::trace!(
                    obstacle = ob.id,
                    x = pose.x,
                    y = pose.y,
                    "pose rejected by exclusion zone"
                );
                return true;
            }
        }
        false
    }

    /// Broad phase: is the obstacle inside this maneuver's reach
    /// interval around the candidate pose?
    fn near(&self, pose: &Pose, mv: Move, ob: &Obstacle) -> bool {
        let p = self.profile;
        let ((left, right), (up, down)) = match mv.turn_params(p) {
            Some(turn) => (turn.x_bound, turn.y_bound),
            // Straight moves sweep only the robot's own box; a fixed
            // interval one robot footprint out is enough
            None => {
                let ow = p.obstacle_width / 2.0;
                (
                    (ow + p.robot_width, ow + p.robot_width),
                    (ow + p.robot_height, ow + p.robot_height),
                )
            }
        };
        ob.x >= pose.x - left && ob.x <= pose.x + right && ob.y >= pose.y - down && ob.y <= pose.y + up
    }

    /// Narrow phase: does the maneuver's swept ellipse contain the
    /// obstacle's inflated footprint?
    ///
    /// The calibrated turn semi-axes already cover the robot's body
    /// during the sweep, so they grow only by the obstacle half-width
    /// and the edge tolerance. Straight moves sweep the robot box
    /// itself, so their ellipse is the robot half-extents plus the same
    /// inflation.
    fn footprint_hits(&self, pose: &Pose, mv: Move, ob: &Obstacle) -> bool {
        let p = self.profile;
        let inflate = p.obstacle_width / 2.0 + p.edge_tol;

        let (semi_x, semi_y) = match mv.turn_params(p) {
            Some(turn) => (turn.a + inflate, turn.b + inflate),
            None => (
                p.robot_width / 2.0 + inflate,
                p.robot_height / 2.0 + inflate,
            ),
        };

        let dx = (ob.x - pose.x) / semi_x;
        let dy = (ob.y - pose.y) / semi_y;
        dx * dx + dy * dy <= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Facing;
    use std::f32::consts::FRAC_PI_2;

    fn profile() -> Profile {
        Profile::indoor()
    }

    #[test]
    fn test_out_of_bounds_blocked() {
        let p = profile();
        let map = Map::new(&p, vec![]);
        assert!(map.is_blocked(&Pose::new(-1.0, 50.0, 0.0), Move::Forward));
        assert!(map.is_blocked(&Pose::new(50.0, 201.0, 0.0), Move::Forward));
        assert!(!map.is_blocked(&Pose::new(50.0, 50.0, 0.0), Move::Forward));
    }

    #[test]
    fn test_pose_on_obstacle_blocked() {
        let p = profile();
        let map = Map::new(&p, vec![Obstacle::new(1, 100.0, 100.0, Facing::North)]);
        assert!(map.is_blocked(&Pose::new(100.0, 95.0, FRAC_PI_2), Move::Forward));
    }

    #[test]
    fn test_far_pose_not_blocked() {
        let p = profile();
        let map = Map::new(&p, vec![Obstacle::new(1, 150.0, 150.0, Facing::North)]);
        assert!(!map.is_blocked(&Pose::new(20.0, 20.0, 0.0), Move::Forward));
        assert!(!map.is_blocked(&Pose::new(20.0, 20.0, 0.0), Move::ForwardRight));
    }

    #[test]
    fn test_turn_zone_wider_than_straight() {
        let p = profile();
        let map = Map::new(&p, vec![Obstacle::new(1, 100.0, 100.0, Facing::North)]);
        // 30cm to the side: outside the straight-move footprint but
        // inside the forward-right sweep ellipse (a = 38.3)
        let pose = Pose::new(70.0, 100.0, FRAC_PI_2);
        assert!(!map.is_blocked(&pose, Move::Forward));
        assert!(map.is_blocked(&pose, Move::ForwardRight));
    }

    #[test]
    fn test_approach_pose_is_reachable() {
        // The derived approach pose must never be inside its own
        // obstacle's exclusion zone for a straight final move
        let p = profile();
        let ob = Obstacle::new(1, 100.0, 100.0, Facing::South);
        let goal = ob.approach_pose(&p);
        let map = Map::new(&p, vec![ob]);
        assert!(!map.is_blocked(&goal, Move::Forward));
        assert!(!map.is_blocked(&goal, Move::Backward));
    }
}
