//! Pure steering helpers used by the agent movement update.

use glam::Vec3;
use horde_defence_core::{flatten, ARRIVAL_EPSILON_SQUARED};

/// Offset from `position` to `objective`, flattened for ground-locked agents.
pub(crate) fn goal_offset(position: Vec3, objective: Vec3, ground_locked: bool) -> Vec3 {
    let offset = objective - position;
    if ground_locked {
        flatten(offset)
    } else {
        offset
    }
}

/// Unit direction along `offset`, or `None` when the goal is already reached.
pub(crate) fn desired_direction(offset: Vec3) -> Option<Vec3> {
    if offset.length_squared() < ARRIVAL_EPSILON_SQUARED {
        return None;
    }
    Some(offset.normalize())
}

/// Picks the ground-plane perpendicular of `away` that still progresses toward the goal.
///
/// `away` points from the obstacle to the agent. Ties keep the counter-clockwise turn.
pub(crate) fn avoidance_direction(away: Vec3, desired: Vec3) -> Vec3 {
    let away = flatten(away);
    let basis = if away.length_squared() < ARRIVAL_EPSILON_SQUARED {
        -flatten(desired)
    } else {
        away
    };
    let left = Vec3::new(-basis.z, 0.0, basis.x).normalize_or_zero();
    let right = -left;
    if right.dot(desired) > left.dot(desired) {
        right
    } else {
        left
    }
}

/// Blends the goal direction with the avoidance bias using a linearly decaying weight.
pub(crate) fn blend(desired: Vec3, avoidance: Vec3, weight: f32, strength: f32) -> Vec3 {
    let weight = weight.clamp(0.0, 1.0);
    let mixed = desired * (1.0 - weight) + avoidance * (weight * strength);
    let normalised = mixed.normalize_or_zero();
    if normalised == Vec3::ZERO {
        desired
    } else {
        normalised
    }
}

/// Yaw around the vertical axis for a facing direction, zero facing +Z.
pub(crate) fn yaw_of(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattened_offset_drops_height() {
        let offset = goal_offset(Vec3::new(0.0, 4.0, 0.0), Vec3::new(3.0, 0.0, 4.0), true);
        assert_eq!(offset, Vec3::new(3.0, 0.0, 4.0));
        let free = goal_offset(Vec3::new(0.0, 4.0, 0.0), Vec3::new(3.0, 0.0, 4.0), false);
        assert_eq!(free, Vec3::new(3.0, -4.0, 4.0));
    }

    #[test]
    fn negligible_offset_has_no_direction() {
        assert_eq!(desired_direction(Vec3::new(1.0e-4, 0.0, 0.0)), None);
        assert_eq!(
            desired_direction(Vec3::new(0.0, 0.0, 9.0)),
            Some(Vec3::new(0.0, 0.0, 1.0))
        );
    }

    #[test]
    fn avoidance_turns_toward_goal_side() {
        // Obstacle lies on the agent's -X side.
        let away = Vec3::new(1.0, 0.0, 0.0);
        let desired = Vec3::new(0.6, 0.0, 0.8);
        let chosen = avoidance_direction(away, desired);
        assert!(chosen.dot(away).abs() < 1.0e-6);
        assert!(chosen.dot(desired) > 0.0);
        assert_eq!(chosen, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn head_on_obstacle_still_yields_perpendicular() {
        let desired = Vec3::new(0.0, 0.0, 1.0);
        let chosen = avoidance_direction(-desired, desired);
        assert!((chosen.length() - 1.0).abs() < 1.0e-6);
        assert!(chosen.dot(desired).abs() < 1.0e-6);

        let chosen = avoidance_direction(Vec3::ZERO, desired);
        assert!(chosen.dot(desired).abs() < 1.0e-6);
    }

    #[test]
    fn blend_weight_shifts_from_avoidance_to_goal() {
        let desired = Vec3::new(0.0, 0.0, 1.0);
        let avoid = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(blend(desired, avoid, 1.0, 2.0), avoid);
        assert_eq!(blend(desired, avoid, 0.0, 2.0), desired);
        let halfway = blend(desired, avoid, 0.5, 2.0);
        assert!(halfway.x > halfway.z);
    }

    #[test]
    fn opposing_blend_falls_back_to_goal() {
        let desired = Vec3::new(0.0, 0.0, 1.0);
        let avoid = Vec3::new(0.0, 0.0, -1.0);
        assert_eq!(blend(desired, avoid, 0.5, 1.0), desired);
    }

    #[test]
    fn yaw_faces_positive_z_at_zero() {
        assert_eq!(yaw_of(Vec3::new(0.0, 0.0, 1.0)), 0.0);
        assert!((yaw_of(Vec3::new(1.0, 0.0, 0.0)) - std::f32::consts::FRAC_PI_2).abs() < 1.0e-6);
    }
}
