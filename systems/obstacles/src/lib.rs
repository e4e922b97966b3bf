#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Registry of static circular obstacles and the free-position search built on it.
//!
//! Obstacles are circles resting on the ground plane, so every distance in this
//! crate is measured with the vertical component dropped.

use std::f32::consts::TAU;

use glam::Vec3;
use horde_defence_core::{ground_distance, Obstacle, ObstacleKind};
use rand::Rng;

/// Clearance added to every free-position sample on top of the obstacle radius.
pub const PLACEMENT_MARGIN: f32 = 3.0;

/// Fraction of the outer search radius used by the unchecked fallback placement.
pub const FALLBACK_DISTANCE_RATIO: f32 = 0.8;

const SCATTER_ATTEMPTS_PER_OBSTACLE: u32 = 16;

/// Insertion-ordered registry of static obstacles.
#[derive(Clone, Debug, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an obstacle to the registry.
    pub fn register(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Registered obstacles in insertion order.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Number of registered obstacles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Reports whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Reports whether a circle of `test_radius` at `point` overlaps any obstacle.
    #[must_use]
    pub fn collides(&self, point: Vec3, test_radius: f32) -> bool {
        self.first_conflict(point, test_radius).is_some()
    }

    /// First obstacle in insertion order that overlaps the circle at `point`.
    ///
    /// Overlap is strict: `distance < obstacle.radius + clearance`.
    #[must_use]
    pub fn first_conflict(&self, point: Vec3, clearance: f32) -> Option<&Obstacle> {
        self.obstacles.iter().find(|obstacle| {
            ground_distance(point, obstacle.position()) < obstacle.radius() + clearance
        })
    }

    /// Samples the ring `[min_distance, max_distance]` around `center` for a clear spot.
    ///
    /// Never fails: once `max_attempts` samples collided, a point at
    /// [`FALLBACK_DISTANCE_RATIO`] of `max_distance` is returned without checking it.
    pub fn find_free_position<R>(
        &self,
        rng: &mut R,
        center: Vec3,
        min_distance: f32,
        max_distance: f32,
        max_attempts: u32,
    ) -> Vec3
    where
        R: Rng + ?Sized,
    {
        let (inner, outer) = normalise_band(min_distance, max_distance);

        for _ in 0..max_attempts {
            let angle = rng.gen_range(0.0..TAU);
            let distance = if outer > inner {
                rng.gen_range(inner..=outer)
            } else {
                inner
            };
            let candidate = ring_point(center, angle, distance);
            if !self.collides(candidate, PLACEMENT_MARGIN) {
                return candidate;
            }
        }

        let angle = rng.gen_range(0.0..TAU);
        let fallback = ring_point(center, angle, outer * FALLBACK_DISTANCE_RATIO);
        log::warn!(
            "free-position search exhausted {max_attempts} attempts; placing unchecked at {fallback}"
        );
        fallback
    }

    /// Populates a ring around `plan.center` with non-overlapping obstacles.
    ///
    /// Obstacles that cannot be placed within a bounded number of samples are
    /// skipped. Returns how many obstacles were registered.
    pub fn scatter<R>(&mut self, rng: &mut R, plan: &ScatterPlan) -> usize
    where
        R: Rng + ?Sized,
    {
        let (min_radius, max_radius) = normalise_band(plan.min_radius, plan.max_radius);
        if max_radius <= 0.0 {
            return 0;
        }
        let min_radius = if min_radius > 0.0 { min_radius } else { max_radius };

        let mut placed = 0;
        for _ in 0..plan.count {
            let radius = if max_radius > min_radius {
                rng.gen_range(min_radius..=max_radius)
            } else {
                min_radius
            };
            let (inner, outer) =
                normalise_band(plan.clear_radius + radius, plan.outer_radius - radius);

            for _ in 0..SCATTER_ATTEMPTS_PER_OBSTACLE {
                let angle = rng.gen_range(0.0..TAU);
                let distance = if outer > inner {
                    rng.gen_range(inner..=outer)
                } else {
                    inner
                };
                let position = ring_point(plan.center, angle, distance);
                if self.collides(position, radius) {
                    continue;
                }
                if let Ok(obstacle) = Obstacle::new(position, radius, plan.kind) {
                    self.register(obstacle);
                    placed += 1;
                }
                break;
            }
        }

        log::debug!(
            "scattered {placed}/{} {:?} obstacles around {}",
            plan.count,
            plan.kind,
            plan.center
        );
        placed
    }
}

/// Parameters describing an obstacle scattering pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterPlan {
    /// Centre of the ring, usually the objective.
    pub center: Vec3,
    /// Radius around the centre that stays free of obstacles.
    pub clear_radius: f32,
    /// Outer edge of the ring.
    pub outer_radius: f32,
    /// Smallest obstacle radius to draw.
    pub min_radius: f32,
    /// Largest obstacle radius to draw.
    pub max_radius: f32,
    /// Number of obstacles requested.
    pub count: usize,
    /// Tag applied to every placed obstacle.
    pub kind: ObstacleKind,
}

fn normalise_band(min: f32, max: f32) -> (f32, f32) {
    let min = if min.is_finite() { min.max(0.0) } else { 0.0 };
    let max = if max.is_finite() { max.max(min) } else { min };
    (min, max)
}

fn ring_point(center: Vec3, angle: f32, distance: f32) -> Vec3 {
    center + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
}
