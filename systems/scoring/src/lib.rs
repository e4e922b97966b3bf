#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Score tracking system that folds world events into a running tally.

use std::fmt;

use horde_defence_core::{AgentKind, Event, Zone};

/// Pure scoring system that consumes world events.
#[derive(Clone, Debug, Default)]
pub struct Scoreboard {
    report: ScoreReport,
    alive: u32,
}

impl Scoreboard {
    /// Creates an empty scoreboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the provided events into the tally.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveStarted { wave, .. } => {
                    self.report.highest_wave = self.report.highest_wave.max(*wave);
                }
                Event::AgentSpawned { .. } => {
                    self.alive = self.alive.saturating_add(1);
                    self.report.peak_alive = self.report.peak_alive.max(self.alive);
                }
                Event::AgentKilled {
                    kind, reward, zone, ..
                } => self.record_kill(*kind, *reward, *zone),
                Event::BaseHit { .. } => {
                    self.report.base_hits = self.report.base_hits.saturating_add(1);
                }
                Event::AgentRemoved { .. } => {
                    self.alive = self.alive.saturating_sub(1);
                }
            }
        }
    }

    fn record_kill(&mut self, kind: AgentKind, reward: u32, zone: Zone) {
        let report = &mut self.report;
        report.score = report.score.saturating_add(u64::from(reward));
        report.kills = report.kills.saturating_add(1);
        let by_zone = match zone {
            Zone::Core => &mut report.core_kills,
            Zone::Head => &mut report.head_kills,
        };
        *by_zone = by_zone.saturating_add(1);
        let by_kind = &mut report.kills_by_kind[kind_slot(kind)];
        *by_kind = by_kind.saturating_add(1);
    }

    /// Agents spawned and not yet removed, as observed through events.
    #[must_use]
    pub const fn alive(&self) -> u32 {
        self.alive
    }

    /// Current tally.
    #[must_use]
    pub const fn report(&self) -> &ScoreReport {
        &self.report
    }
}

fn kind_slot(kind: AgentKind) -> usize {
    match kind {
        AgentKind::Grunt => 0,
        AgentKind::Fast => 1,
        AgentKind::Heavy => 2,
    }
}

/// Summary of a session's outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreReport {
    /// Sum of kill rewards.
    pub score: u64,
    /// Total kills.
    pub kills: u32,
    /// Kills landed on the body.
    pub core_kills: u32,
    /// Kills landed on the head.
    pub head_kills: u32,
    /// Kills per kind, indexed in [`AgentKind::ALL`] order.
    pub kills_by_kind: [u32; 3],
    /// Agents that reached the objective.
    pub base_hits: u32,
    /// Highest wave that started.
    pub highest_wave: u32,
    /// Largest number of simultaneously live agents.
    pub peak_alive: u32,
}

impl ScoreReport {
    /// Kills recorded for the provided kind.
    #[must_use]
    pub fn kills_of(&self, kind: AgentKind) -> u32 {
        self.kills_by_kind[kind_slot(kind)]
    }

    /// Share of kills that were head shots, or zero without kills.
    #[must_use]
    pub fn head_ratio(&self) -> f32 {
        if self.kills == 0 {
            return 0.0;
        }
        self.head_kills as f32 / self.kills as f32
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "score: {}", self.score)?;
        writeln!(f, "highest wave: {}", self.highest_wave)?;
        writeln!(
            f,
            "kills: {} ({} head, {} core)",
            self.kills, self.head_kills, self.core_kills
        )?;
        for kind in AgentKind::ALL {
            writeln!(f, "  {}: {}", kind.tag(), self.kills_of(kind))?;
        }
        writeln!(f, "base hits: {}", self.base_hits)?;
        write!(f, "peak alive: {}", self.peak_alive)
    }
}
