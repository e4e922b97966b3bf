//! Read-only tuning surface supplied to the world at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AgentKind, Locomotion, Zone};

/// Reasons a configuration may be rejected by [`SimulationConfig::validate`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A numeric field held NaN or infinity.
    #[error("{field} must be finite")]
    NotFinite {
        /// Dotted path of the offending field.
        field: String,
    },
    /// A numeric field held a negative value.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Dotted path of the offending field.
        field: String,
        /// Value that was supplied.
        value: f32,
    },
    /// A numeric field that must be strictly positive held zero or less.
    #[error("{field} must be positive, got {value}")]
    NotPositive {
        /// Dotted path of the offending field.
        field: String,
        /// Value that was supplied.
        value: f32,
    },
}

/// Aggregated configuration consumed by the world and its agents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Per-kind agent statistics.
    pub kinds: KindTable,
    /// Wave pacing and placement parameters.
    pub waves: WaveTuning,
    /// Per-zone damage and score multipliers.
    pub zones: ZoneTable,
}

impl SimulationConfig {
    /// Checks every tunable for values the simulation cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in AgentKind::ALL {
            self.kinds.get(kind).validate(kind.tag())?;
        }
        self.waves.validate()?;
        for zone in [Zone::Core, Zone::Head] {
            if let Some(tuning) = self.zones.entry(zone) {
                let prefix = format!("zones.{}", zone.tag());
                non_negative(&prefix, "damage_multiplier", tuning.damage_multiplier)?;
                non_negative(&prefix, "score_multiplier", tuning.score_multiplier)?;
            }
        }
        Ok(())
    }
}

/// Statistics for every agent kind.
///
/// Each kind deserializes on top of its own stock tuning, so a file that only
/// sets `kinds.heavy.health` keeps the heavy defaults for everything else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "KindTablePatch", into = "KindTablePatch")]
pub struct KindTable {
    /// Baseline infantry.
    pub grunt: KindTuning,
    /// Quick runner.
    pub fast: KindTuning,
    /// Durable walker.
    pub heavy: KindTuning,
}

impl KindTable {
    /// Tuning for the provided kind.
    #[must_use]
    pub fn get(&self, kind: AgentKind) -> &KindTuning {
        match kind {
            AgentKind::Grunt => &self.grunt,
            AgentKind::Fast => &self.fast,
            AgentKind::Heavy => &self.heavy,
        }
    }

    /// Mutable tuning for the provided kind.
    pub fn get_mut(&mut self, kind: AgentKind) -> &mut KindTuning {
        match kind {
            AgentKind::Grunt => &mut self.grunt,
            AgentKind::Fast => &mut self.fast,
            AgentKind::Heavy => &mut self.heavy,
        }
    }
}

impl Default for KindTable {
    fn default() -> Self {
        Self {
            grunt: KindTuning {
                health: 100.0,
                speed: 3.0,
                reward: 10,
                hit_radius: 1.0,
                scale: 1.0,
                spawn_weight: 6.0,
                locomotion: Locomotion::Steering,
                ground_locked: true,
            },
            fast: KindTuning {
                health: 60.0,
                speed: 5.5,
                reward: 15,
                hit_radius: 0.8,
                scale: 0.8,
                spawn_weight: 3.0,
                locomotion: Locomotion::Steering,
                ground_locked: true,
            },
            heavy: KindTuning {
                health: 300.0,
                speed: 1.6,
                reward: 40,
                hit_radius: 1.6,
                scale: 1.6,
                spawn_weight: 1.0,
                locomotion: Locomotion::Walker,
                ground_locked: true,
            },
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct KindTablePatch {
    grunt: KindPatch,
    fast: KindPatch,
    heavy: KindPatch,
}

impl From<KindTablePatch> for KindTable {
    fn from(patch: KindTablePatch) -> Self {
        let stock = Self::default();
        Self {
            grunt: patch.grunt.apply(stock.grunt),
            fast: patch.fast.apply(stock.fast),
            heavy: patch.heavy.apply(stock.heavy),
        }
    }
}

impl From<KindTable> for KindTablePatch {
    fn from(table: KindTable) -> Self {
        Self {
            grunt: table.grunt.into(),
            fast: table.fast.into(),
            heavy: table.heavy.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct KindPatch {
    health: Option<f32>,
    speed: Option<f32>,
    reward: Option<u32>,
    hit_radius: Option<f32>,
    scale: Option<f32>,
    spawn_weight: Option<f32>,
    locomotion: Option<Locomotion>,
    ground_locked: Option<bool>,
}

impl KindPatch {
    fn apply(self, base: KindTuning) -> KindTuning {
        KindTuning {
            health: self.health.unwrap_or(base.health),
            speed: self.speed.unwrap_or(base.speed),
            reward: self.reward.unwrap_or(base.reward),
            hit_radius: self.hit_radius.unwrap_or(base.hit_radius),
            scale: self.scale.unwrap_or(base.scale),
            spawn_weight: self.spawn_weight.unwrap_or(base.spawn_weight),
            locomotion: self.locomotion.unwrap_or(base.locomotion),
            ground_locked: self.ground_locked.unwrap_or(base.ground_locked),
        }
    }
}

impl From<KindTuning> for KindPatch {
    fn from(tuning: KindTuning) -> Self {
        Self {
            health: Some(tuning.health),
            speed: Some(tuning.speed),
            reward: Some(tuning.reward),
            hit_radius: Some(tuning.hit_radius),
            scale: Some(tuning.scale),
            spawn_weight: Some(tuning.spawn_weight),
            locomotion: Some(tuning.locomotion),
            ground_locked: Some(tuning.ground_locked),
        }
    }
}

/// Statistics for a single agent kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindTuning {
    /// Starting health; must be positive.
    pub health: f32,
    /// Maximum ground speed in units per second.
    pub speed: f32,
    /// Base score awarded on death before the zone multiplier.
    pub reward: u32,
    /// Radius of the body volume used for contact and avoidance clearance.
    pub hit_radius: f32,
    /// Visual scale handed to presentation.
    pub scale: f32,
    /// Relative likelihood of the kind being selected at spawn time.
    pub spawn_weight: f32,
    /// Movement behaviour.
    pub locomotion: Locomotion,
    /// Whether vertical motion is suppressed.
    pub ground_locked: bool,
}

impl KindTuning {
    fn validate(&self, tag: &str) -> Result<(), ConfigError> {
        let prefix = format!("kinds.{tag}");
        positive(&prefix, "health", self.health)?;
        non_negative(&prefix, "speed", self.speed)?;
        non_negative(&prefix, "hit_radius", self.hit_radius)?;
        non_negative(&prefix, "scale", self.scale)?;
        non_negative(&prefix, "spawn_weight", self.spawn_weight)
    }
}

impl Default for KindTuning {
    fn default() -> Self {
        KindTable::default().grunt
    }
}

/// Global wave pacing and placement parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Agents queued for the first wave before rounding.
    pub first_wave_count: f32,
    /// Multiplicative growth applied per subsequent wave.
    pub wave_growth: f32,
    /// Seconds between consecutive spawns within a wave.
    pub spawn_interval: f32,
    /// Seconds of quiet required after a wave is cleared.
    pub wave_pause: f32,
    /// Nominal distance from the objective at which agents appear.
    pub spawn_radius: f32,
    /// Distance from the objective at which agents strike it.
    pub attack_radius: f32,
    /// Samples drawn by free-position search before falling back.
    pub placement_attempts: u32,
}

impl WaveTuning {
    /// Number of agents queued for the provided one-based wave.
    #[must_use]
    pub fn queue_size(&self, wave: u32) -> u32 {
        let raw = if wave <= 1 {
            self.first_wave_count
        } else {
            let exponent = i32::try_from(wave - 1).unwrap_or(i32::MAX);
            self.first_wave_count * self.wave_growth.powi(exponent)
        };
        if !raw.is_finite() || raw <= 0.0 {
            return if raw == f32::INFINITY { u32::MAX } else { 0 };
        }
        let rounded = raw.round();
        if rounded >= u32::MAX as f32 {
            u32::MAX
        } else {
            rounded as u32
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let prefix = "waves";
        non_negative(prefix, "first_wave_count", self.first_wave_count)?;
        non_negative(prefix, "wave_growth", self.wave_growth)?;
        non_negative(prefix, "spawn_interval", self.spawn_interval)?;
        non_negative(prefix, "wave_pause", self.wave_pause)?;
        non_negative(prefix, "spawn_radius", self.spawn_radius)?;
        non_negative(prefix, "attack_radius", self.attack_radius)
    }
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            first_wave_count: 5.0,
            wave_growth: 1.25,
            spawn_interval: 1.2,
            wave_pause: 4.0,
            spawn_radius: 40.0,
            attack_radius: 3.0,
            placement_attempts: 30,
        }
    }
}

/// Damage and score multipliers keyed by zone.
///
/// A zone without an entry resolves to [`ZoneTuning::NEUTRAL`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneTable {
    /// Multipliers applied to body hits.
    pub core: Option<ZoneTuning>,
    /// Multipliers applied to head hits.
    pub head: Option<ZoneTuning>,
}

impl ZoneTable {
    /// Configured entry for the zone, if any.
    #[must_use]
    pub fn entry(&self, zone: Zone) -> Option<&ZoneTuning> {
        match zone {
            Zone::Core => self.core.as_ref(),
            Zone::Head => self.head.as_ref(),
        }
    }

    /// Multipliers for the zone, defaulting to neutral ones.
    #[must_use]
    pub fn resolve(&self, zone: Zone) -> ZoneTuning {
        self.entry(zone).copied().unwrap_or(ZoneTuning::NEUTRAL)
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self {
            core: Some(ZoneTuning::NEUTRAL),
            head: Some(ZoneTuning {
                damage_multiplier: 2.0,
                score_multiplier: 1.5,
            }),
        }
    }
}

/// Multipliers applied when a zone is struck.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneTuning {
    /// Factor applied to incoming damage.
    pub damage_multiplier: f32,
    /// Factor applied to the reward when the hit kills.
    pub score_multiplier: f32,
}

impl ZoneTuning {
    /// Multipliers that leave damage and reward untouched.
    pub const NEUTRAL: Self = Self {
        damage_multiplier: 1.0,
        score_multiplier: 1.0,
    };
}

impl Default for ZoneTuning {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn finite(prefix: &str, name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite {
            field: format!("{prefix}.{name}"),
        })
    }
}

fn non_negative(prefix: &str, name: &str, value: f32) -> Result<(), ConfigError> {
    finite(prefix, name, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative {
            field: format!("{prefix}.{name}"),
            value,
        });
    }
    Ok(())
}

fn positive(prefix: &str, name: &str, value: f32) -> Result<(), ConfigError> {
    finite(prefix, name, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive {
            field: format!("{prefix}.{name}"),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn queue_size_grows_geometrically() {
        let waves = WaveTuning {
            first_wave_count: 5.0,
            wave_growth: 1.25,
            ..WaveTuning::default()
        };
        assert_eq!(waves.queue_size(1), 5);
        assert_eq!(waves.queue_size(2), 6);
        assert_eq!(waves.queue_size(3), 8);
        assert_eq!(waves.queue_size(4), 10);
    }

    #[test]
    fn first_wave_count_is_rounded() {
        let waves = WaveTuning {
            first_wave_count: 4.6,
            ..WaveTuning::default()
        };
        assert_eq!(waves.queue_size(1), 5);
    }

    #[test]
    fn rejects_non_positive_health() {
        let mut config = SimulationConfig::default();
        config.kinds.get_mut(AgentKind::Fast).health = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "kinds.fast.health".to_owned(),
                value: 0.0,
            })
        );
    }

    #[test]
    fn rejects_negative_weights_and_nan() {
        let mut config = SimulationConfig::default();
        config.kinds.heavy.spawn_weight = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { .. })
        ));

        let mut config = SimulationConfig::default();
        config.waves.spawn_interval = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { .. })
        ));
    }

    #[test]
    fn missing_zone_resolves_to_neutral() {
        let table = ZoneTable {
            core: None,
            head: None,
        };
        assert_eq!(table.resolve(Zone::Head), ZoneTuning::NEUTRAL);
        assert_eq!(
            ZoneTable::default().resolve(Zone::Head).damage_multiplier,
            2.0
        );
    }

    #[test]
    fn configuration_round_trips_through_bincode() {
        let mut config = SimulationConfig::default();
        config.waves.wave_growth = 1.5;
        config.zones.core = None;
        let bytes = bincode::serialize(&config).expect("serialize");
        let restored: SimulationConfig = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, config);
    }
}
