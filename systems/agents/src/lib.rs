#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hostile agents: ground steering, obstacle avoidance, and zone-based damage.
//!
//! An [`Agent`] only mutates its own state. It never removes itself from the
//! world and never notifies anyone directly; the owner inspects
//! [`Agent::is_terminal`] and drains [`Agent::take_death`] during its sweep.

use glam::Vec3;
use horde_defence_core::{
    AgentId, AgentKind, AgentSnapshot, HitVolume, KindTuning, Locomotion, Zone, ZoneTable,
};
use horde_defence_system_obstacles::ObstacleField;

mod steering;

/// Distance ahead of the agent probed for obstacles.
pub const LOOK_AHEAD_DISTANCE: f32 = 5.0;

/// Extra clearance kept between the agent body and an obstacle edge.
pub const AVOIDANCE_CLEARANCE: f32 = 2.0;

/// Seconds an avoidance bias stays active after a trigger.
pub const AVOIDANCE_DURATION: f32 = 1.0;

/// Scale applied to the avoidance direction when blending.
pub const AVOIDANCE_STRENGTH: f32 = 2.0;

const HEAD_RADIUS_RATIO: f32 = 0.45;

/// Lifecycle of an agent. Every state except [`Lifecycle::Active`] is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Moving and able to take damage.
    Active,
    /// Health dropped to zero.
    Dead,
    /// Contact with the objective was made.
    ReachedObjective,
    /// Detached without dying.
    Disposed,
}

impl Lifecycle {
    /// Reports whether the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Death notification produced exactly once when an agent is killed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Death {
    /// Score awarded after applying the zone multiplier.
    pub reward: u32,
    /// Zone struck by the killing blow.
    pub zone: Zone,
}

/// A single hostile unit.
#[derive(Clone, Debug)]
pub struct Agent {
    kind: AgentKind,
    locomotion: Locomotion,
    max_speed: f32,
    reward_base: u32,
    hit_radius: f32,
    attack_radius: f32,
    scale: f32,
    ground_locked: bool,
    position: Vec3,
    health: f32,
    lifecycle: Lifecycle,
    avoidance_direction: Option<Vec3>,
    avoidance_timer: f32,
    yaw: f32,
    pending_death: Option<Death>,
}

impl Agent {
    /// Creates an active agent of `kind` at `position` using the kind's tuning.
    #[must_use]
    pub fn new(kind: AgentKind, tuning: &KindTuning, attack_radius: f32, position: Vec3) -> Self {
        Self {
            kind,
            locomotion: tuning.locomotion,
            max_speed: tuning.speed,
            reward_base: tuning.reward,
            hit_radius: tuning.hit_radius,
            attack_radius,
            scale: tuning.scale,
            ground_locked: tuning.ground_locked,
            position,
            health: tuning.health,
            lifecycle: Lifecycle::Active,
            avoidance_direction: None,
            avoidance_timer: 0.0,
            yaw: 0.0,
            pending_death: None,
        }
    }

    /// Kind of the agent.
    #[must_use]
    pub const fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Movement behaviour of the agent.
    #[must_use]
    pub const fn locomotion(&self) -> Locomotion {
        self.locomotion
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Radius of the body volume.
    #[must_use]
    pub const fn hit_radius(&self) -> f32 {
        self.hit_radius
    }

    /// Distance from the objective at which a walker stops on its own.
    #[must_use]
    pub const fn attack_radius(&self) -> f32 {
        self.attack_radius
    }

    /// Ground speed in units per second.
    #[must_use]
    pub const fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Base reward before zone multipliers.
    #[must_use]
    pub const fn reward_base(&self) -> u32 {
        self.reward_base
    }

    /// Facing around the vertical axis in radians, zero facing +Z.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Reports whether the agent reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.lifecycle.is_terminal()
    }

    /// Remaining seconds of active avoidance bias.
    #[must_use]
    pub const fn avoidance_timer(&self) -> f32 {
        self.avoidance_timer
    }

    /// Direction of the active avoidance bias, if any.
    #[must_use]
    pub const fn avoidance_direction(&self) -> Option<Vec3> {
        self.avoidance_direction
    }

    /// Advances the agent by `dt` seconds toward `objective`.
    ///
    /// Steering agents consult `obstacles` for avoidance when a field is
    /// provided. Walkers ignore obstacles and mark themselves as having reached
    /// the objective once within their attack radius. Terminal agents do not move.
    pub fn update(&mut self, dt: f32, objective: Vec3, obstacles: Option<&ObstacleField>) {
        if self.is_terminal() {
            return;
        }

        match self.locomotion {
            Locomotion::Steering => self.steer(dt, objective, obstacles),
            Locomotion::Walker => self.walk(dt, objective),
        }
    }

    fn steer(&mut self, dt: f32, objective: Vec3, obstacles: Option<&ObstacleField>) {
        let offset = steering::goal_offset(self.position, objective, self.ground_locked);
        let Some(desired) = steering::desired_direction(offset) else {
            self.decay_avoidance(dt);
            return;
        };

        if let Some(field) = obstacles {
            self.detect_conflict(field, desired);
        }

        let direction = match self.avoidance_direction {
            Some(avoidance) if self.avoidance_timer > 0.0 => steering::blend(
                desired,
                avoidance,
                self.avoidance_timer,
                AVOIDANCE_STRENGTH,
            ),
            _ => desired,
        };
        self.decay_avoidance(dt);
        self.advance(direction, dt);
    }

    fn detect_conflict(&mut self, field: &ObstacleField, desired: Vec3) {
        let look_ahead = self.position + desired * LOOK_AHEAD_DISTANCE;
        let clearance = self.hit_radius + AVOIDANCE_CLEARANCE;
        let Some(obstacle) = field.first_conflict(look_ahead, clearance) else {
            return;
        };

        let away = self.position - obstacle.position();
        let direction = steering::avoidance_direction(away, desired);
        log::trace!(
            "{} avoiding {:?} obstacle at {} by steering {direction}",
            self.kind.tag(),
            obstacle.kind(),
            obstacle.position()
        );
        self.avoidance_direction = Some(direction);
        self.avoidance_timer = AVOIDANCE_DURATION;
    }

    fn decay_avoidance(&mut self, dt: f32) {
        self.avoidance_timer = (self.avoidance_timer - dt).max(0.0);
        if self.avoidance_timer <= 0.0 {
            self.avoidance_direction = None;
        }
    }

    fn walk(&mut self, dt: f32, objective: Vec3) {
        let offset = steering::goal_offset(self.position, objective, self.ground_locked);
        if offset.length() <= self.attack_radius {
            self.lifecycle = Lifecycle::ReachedObjective;
            return;
        }
        if let Some(direction) = steering::desired_direction(offset) {
            self.advance(direction, dt);
        }
    }

    fn advance(&mut self, direction: Vec3, dt: f32) {
        self.position += direction * self.max_speed * dt;
        self.yaw = steering::yaw_of(direction);
    }

    /// Applies `amount` damage to `zone`, returning whether this call killed the agent.
    ///
    /// Damage to a terminal agent is ignored. The zone's multipliers are read from
    /// `zones` at the moment of impact; zones without an entry use neutral ones.
    pub fn take_damage(&mut self, amount: f32, zone: Zone, zones: &ZoneTable) -> bool {
        if self.is_terminal() || !amount.is_finite() || amount <= 0.0 {
            return false;
        }

        let tuning = zones.resolve(zone);
        self.health -= amount * tuning.damage_multiplier;
        if self.health > 0.0 {
            return false;
        }

        let reward = scaled_reward(self.reward_base, tuning.score_multiplier);
        self.lifecycle = Lifecycle::Dead;
        self.pending_death = Some(Death { reward, zone });
        true
    }

    /// Drains the death notification; yields `Some` at most once per agent.
    pub fn take_death(&mut self) -> Option<Death> {
        self.pending_death.take()
    }

    /// Detaches the agent independently of its health.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn dispose(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.lifecycle = Lifecycle::Disposed;
        self.avoidance_direction = None;
        self.avoidance_timer = 0.0;
        true
    }

    /// Marks the agent as having reached the objective.
    pub fn mark_reached_objective(&mut self) {
        if !self.is_terminal() {
            self.lifecycle = Lifecycle::ReachedObjective;
        }
    }

    /// Zone-tagged spheres a damage source can hit test against.
    #[must_use]
    pub fn hit_volumes(&self) -> [HitVolume; 2] {
        let head_radius = self.hit_radius * HEAD_RADIUS_RATIO;
        [
            HitVolume {
                zone: Zone::Core,
                center: self.position + Vec3::Y * self.hit_radius,
                radius: self.hit_radius,
            },
            HitVolume {
                zone: Zone::Head,
                center: self.position + Vec3::Y * (self.hit_radius * 2.0 + head_radius * 0.5),
                radius: head_radius,
            },
        ]
    }

    /// Zone containing `point`, preferring the head where volumes overlap.
    #[must_use]
    pub fn zone_at(&self, point: Vec3) -> Option<Zone> {
        let [core, head] = self.hit_volumes();
        if head.contains(point) {
            Some(Zone::Head)
        } else if core.contains(point) {
            Some(Zone::Core)
        } else {
            None
        }
    }

    /// Captures a presentation snapshot under the provided handle.
    #[must_use]
    pub fn snapshot(&self, id: AgentId) -> AgentSnapshot {
        AgentSnapshot {
            id,
            kind: self.kind,
            position: self.position,
            yaw: self.yaw,
            health: self.health,
            scale: self.scale,
            avoiding: self.avoidance_timer > 0.0,
        }
    }
}

fn scaled_reward(base: u32, multiplier: f32) -> u32 {
    let scaled = (f64::from(base) * f64::from(multiplier)).floor();
    if !scaled.is_finite() || scaled <= 0.0 {
        0
    } else if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}
