#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Horde Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The world advances the simulation
//! once per external frame and reports everything that happened through
//! [`Event`] values. Adapters and systems never receive callbacks; they read
//! the emitted events and query immutable snapshots such as [`AgentView`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod config;

pub use config::{
    ConfigError, KindTable, KindTuning, SimulationConfig, WaveTuning, ZoneTable, ZoneTuning,
};

/// Squared distances below this threshold are treated as "already there".
pub const ARRIVAL_EPSILON_SQUARED: f32 = 1.0e-6;

/// Events emitted by the world while advancing the simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a new wave began.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Number of agents queued for the wave.
        to_spawn: u32,
    },
    /// Confirms that an agent entered the field.
    AgentSpawned {
        /// Handle allocated to the agent.
        agent: AgentId,
        /// Kind of agent that was created.
        kind: AgentKind,
        /// Ground-plane position the agent spawned at.
        position: Vec3,
    },
    /// Reports that an agent died from accumulated damage.
    AgentKilled {
        /// Handle of the agent that died.
        agent: AgentId,
        /// Kind of agent that died.
        kind: AgentKind,
        /// Score awarded for the kill.
        reward: u32,
        /// Zone struck by the killing blow.
        zone: Zone,
        /// Wave that was active when the kill was observed.
        wave: u32,
        /// Agents still alive after the removal.
        alive: u32,
    },
    /// Reports that an agent reached the defended objective.
    BaseHit {
        /// Handle of the agent that struck the objective.
        agent: AgentId,
        /// Position of the agent at the moment of contact.
        position: Vec3,
    },
    /// Signals that an agent was detached from the simulation.
    AgentRemoved {
        /// Handle of the agent that was removed.
        agent: AgentId,
        /// Terminal state that caused the removal.
        cause: RemovalCause,
    },
}

/// Terminal states that detach an agent from the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Health dropped to zero.
    Killed,
    /// The agent made contact with the objective.
    ReachedObjective,
    /// The agent was disposed independently of its health.
    Disposed,
}

/// Handle that identifies an agent slot and the generation living in it.
///
/// Handles of removed agents never resolve again, even when the slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId {
    index: u32,
    generation: u32,
}

impl AgentId {
    /// Creates a new handle from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index of the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Kinds of hostile agents, listed in weighted-selection order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Baseline infantry.
    Grunt,
    /// Quick and fragile runner.
    Fast,
    /// Slow, durable walker.
    Heavy,
}

impl AgentKind {
    /// Every kind in the fixed order used by weighted selection.
    pub const ALL: [AgentKind; 3] = [Self::Grunt, Self::Fast, Self::Heavy];

    /// Lower-case tag naming the kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Grunt => "grunt",
            Self::Fast => "fast",
            Self::Heavy => "heavy",
        }
    }
}

/// Named hit regions on an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Main body volume.
    Core,
    /// Head volume stacked above the body.
    Head,
}

impl Zone {
    /// Parses a zone tag, returning `None` for tags outside the configured set.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "core" => Some(Self::Core),
            "head" => Some(Self::Head),
            _ => None,
        }
    }

    /// Parses a zone tag and treats anything unknown as [`Zone::Core`].
    #[must_use]
    pub fn from_tag_or_core(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or(Self::Core)
    }

    /// Lower-case tag naming the zone.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Head => "head",
        }
    }
}

/// Movement behaviour assigned to an agent kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locomotion {
    /// Ground steering with time-decayed obstacle avoidance.
    #[default]
    Steering,
    /// Straight-line walker that stops itself once within attack range.
    Walker,
}

/// Classification tag attached to a static obstacle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Boulder or rock outcrop.
    #[default]
    Rock,
    /// Tree trunk.
    Tree,
    /// Man-made structure such as a wall segment or crate stack.
    Structure,
}

/// Reasons an obstacle description may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ObstacleError {
    /// Obstacle radii must be strictly positive and finite.
    #[error("obstacle radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    /// Obstacle positions must be finite.
    #[error("obstacle position must be finite")]
    InvalidPosition,
}

/// Static circular obstacle resting on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    position: Vec3,
    radius: f32,
    kind: ObstacleKind,
}

impl Obstacle {
    /// Creates an obstacle, rejecting non-positive radii.
    pub fn new(position: Vec3, radius: f32, kind: ObstacleKind) -> Result<Self, ObstacleError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ObstacleError::InvalidRadius(radius));
        }
        if !position.is_finite() {
            return Err(ObstacleError::InvalidPosition);
        }
        Ok(Self {
            position,
            radius,
            kind,
        })
    }

    /// Centre of the obstacle footprint.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Radius of the obstacle footprint.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Classification tag of the obstacle.
    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        self.kind
    }
}

/// Zone-tagged sphere used by damage sources for hit testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitVolume {
    /// Zone the volume belongs to.
    pub zone: Zone,
    /// World-space centre of the sphere.
    pub center: Vec3,
    /// Sphere radius.
    pub radius: f32,
}

impl HitVolume {
    /// Reports whether the provided point lies inside the sphere.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }
}

/// Immutable representation of a single agent's state used for presentation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Handle of the agent.
    pub id: AgentId,
    /// Kind of the agent.
    pub kind: AgentKind,
    /// Current position.
    pub position: Vec3,
    /// Facing around the vertical axis in radians, zero facing +Z.
    pub yaw: f32,
    /// Remaining health.
    pub health: f32,
    /// Visual scale configured for the kind.
    pub scale: f32,
    /// Whether an avoidance bias is currently blended into steering.
    pub avoiding: bool,
}

/// Read-only snapshot describing all live agents in spawn order.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a view from snapshots that are already in spawn order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<AgentSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Looks up the snapshot for the provided handle.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Drops the vertical component of a vector.
#[must_use]
pub fn flatten(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, 0.0, vector.z)
}

/// Distance between two points measured on the ground plane.
#[must_use]
pub fn ground_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(a - b).length()
}
