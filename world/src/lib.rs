#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative wave and agent state for Horde Defence.
//!
//! [`WaveScheduler`] owns every live agent. Each external frame calls
//! [`WaveScheduler::update`], which first advances spawn and wave pacing and
//! then sweeps the live agents in reverse spawn order, removing terminal ones,
//! detecting objective contact and moving the rest. Everything observable is
//! reported through [`Event`] values appended to the caller's buffer.

use std::f32::consts::TAU;

use glam::Vec3;
use horde_defence_core::{
    ground_distance, AgentId, AgentKind, Event, RemovalCause, SimulationConfig, Zone,
};
use horde_defence_system_agents::{Agent, Lifecycle};
use horde_defence_system_obstacles::ObstacleField;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

mod arena;
mod selection;

use arena::AgentArena;
pub use selection::{
    effective_weights, select_kind, FAST_SURGE_MULTIPLIER, FAST_SURGE_WAVE,
    HEAVY_SURGE_MULTIPLIER, HEAVY_SURGE_WAVE,
};

/// Distance subtracted from the spawn radius for the inner edge of the search band.
pub const SPAWN_BAND_INNER: f32 = 10.0;
/// Distance added to the spawn radius for the outer edge of the search band.
pub const SPAWN_BAND_OUTER: f32 = 20.0;
/// Radial jitter applied to spawns when no obstacle field is attached.
pub const SPAWN_JITTER: f32 = 5.0;
/// Fraction of an agent's hit radius added to the attack radius for contact.
pub const CONTACT_HIT_RADIUS_RATIO: f32 = 0.5;

/// Owns the live agents and drives the wave state machine.
#[derive(Debug)]
pub struct WaveScheduler<R = ChaCha8Rng> {
    config: SimulationConfig,
    obstacles: Option<ObstacleField>,
    rng: R,
    agents: AgentArena,
    current_wave: u32,
    spawn_queue_remaining: u32,
    spawn_timer: f32,
    wave_pause_timer: f32,
    alive_count: u32,
    objective_center: Vec3,
}

impl WaveScheduler<ChaCha8Rng> {
    /// Creates an idle scheduler backed by a seeded ChaCha generator.
    #[must_use]
    pub fn seeded(config: SimulationConfig, obstacles: Option<ObstacleField>, seed: u64) -> Self {
        Self::new(config, obstacles, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> WaveScheduler<R> {
    /// Creates an idle scheduler; call [`WaveScheduler::begin`] to start wave 1.
    #[must_use]
    pub fn new(config: SimulationConfig, obstacles: Option<ObstacleField>, rng: R) -> Self {
        Self {
            config,
            obstacles,
            rng,
            agents: AgentArena::default(),
            current_wave: 0,
            spawn_queue_remaining: 0,
            spawn_timer: 0.0,
            wave_pause_timer: 0.0,
            alive_count: 0,
            objective_center: Vec3::ZERO,
        }
    }

    /// Starts the first wave. Has no effect once waves are running.
    pub fn begin(&mut self, out: &mut Vec<Event>) {
        if self.current_wave == 0 {
            self.start_wave(out);
        }
    }

    /// Advances the simulation by `dt` seconds against the objective at `objective`.
    ///
    /// Negative or non-finite `dt` is clamped to zero. A zero `dt` moves nothing
    /// but still releases a spawn whose timer already ran out.
    pub fn update(&mut self, dt: f32, objective: Vec3, out: &mut Vec<Event>) {
        let dt = sanitise_dt(dt);
        self.objective_center = objective;

        if self.current_wave > 0 {
            if self.spawn_queue_remaining > 0 {
                self.advance_spawning(dt, out);
            } else {
                self.advance_wave_pause(dt, out);
            }
        }

        self.sweep(dt, out);
    }

    fn advance_spawning(&mut self, dt: f32, out: &mut Vec<Event>) {
        self.spawn_timer -= dt;
        if self.spawn_timer > 0.0 {
            return;
        }

        let kind = select_kind(&self.config.kinds, self.current_wave, &mut self.rng);
        let position = self.spawn_position();
        let _ = self.spawn_at(kind, position, out);
        self.spawn_queue_remaining -= 1;
        self.spawn_timer = self.config.waves.spawn_interval;
    }

    fn advance_wave_pause(&mut self, dt: f32, out: &mut Vec<Event>) {
        if self.alive_count > 0 {
            return;
        }
        self.wave_pause_timer += dt;
        if self.wave_pause_timer >= self.config.waves.wave_pause {
            self.start_wave(out);
        }
    }

    fn start_wave(&mut self, out: &mut Vec<Event>) {
        self.current_wave = self.current_wave.saturating_add(1);
        let to_spawn = self.config.waves.queue_size(self.current_wave);
        self.spawn_queue_remaining = to_spawn;
        self.spawn_timer = 0.0;
        self.wave_pause_timer = 0.0;
        log::debug!("wave {} started with {to_spawn} agents queued", self.current_wave);
        out.push(Event::WaveStarted {
            wave: self.current_wave,
            to_spawn,
        });
    }

    fn spawn_position(&mut self) -> Vec3 {
        let center = self.objective_center;
        let waves = &self.config.waves;
        match &self.obstacles {
            Some(field) => field.find_free_position(
                &mut self.rng,
                center,
                waves.spawn_radius - SPAWN_BAND_INNER,
                waves.spawn_radius + SPAWN_BAND_OUTER,
                waves.placement_attempts,
            ),
            None => {
                let angle = self.rng.gen_range(0.0..TAU);
                let jitter = self.rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER);
                let distance = (waves.spawn_radius + jitter).max(0.0);
                center + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
            }
        }
    }

    /// Inserts an agent of `kind` at `position` outside of wave pacing.
    ///
    /// The agent counts toward [`WaveScheduler::alive_count`] like any spawned one.
    pub fn spawn_at(&mut self, kind: AgentKind, position: Vec3, out: &mut Vec<Event>) -> AgentId {
        let agent = Agent::new(
            kind,
            self.config.kinds.get(kind),
            self.config.waves.attack_radius,
            position,
        );
        let id = self.agents.insert(agent);
        self.alive_count = self.alive_count.saturating_add(1);
        log::debug!("spawned {} {id:?} at {position}", kind.tag());
        out.push(Event::AgentSpawned {
            agent: id,
            kind,
            position,
        });
        id
    }

    fn sweep(&mut self, dt: f32, out: &mut Vec<Event>) {
        let objective = self.objective_center;
        let attack_radius = self.config.waves.attack_radius;

        for position in (0..self.agents.order().len()).rev() {
            let id = self.agents.order()[position];
            let Some(agent) = self.agents.get_mut(id) else {
                continue;
            };

            if !agent.is_terminal() {
                let contact = attack_radius + agent.hit_radius() * CONTACT_HIT_RADIUS_RATIO;
                if ground_distance(agent.position(), objective) <= contact {
                    agent.mark_reached_objective();
                } else {
                    agent.update(dt, objective, self.obstacles.as_ref());
                }
            }

            if agent.is_terminal() {
                self.remove(id, out);
            }
        }

        self.agents.compact();
    }

    fn remove(&mut self, id: AgentId, out: &mut Vec<Event>) {
        let Some(mut agent) = self.agents.remove(id) else {
            return;
        };
        self.alive_count = self.alive_count.saturating_sub(1);

        let cause = match agent.lifecycle() {
            Lifecycle::Dead => {
                if let Some(death) = agent.take_death() {
                    log::debug!(
                        "{} {id:?} killed by {} hit for {}",
                        agent.kind().tag(),
                        death.zone.tag(),
                        death.reward
                    );
                    out.push(Event::AgentKilled {
                        agent: id,
                        kind: agent.kind(),
                        reward: death.reward,
                        zone: death.zone,
                        wave: self.current_wave,
                        alive: self.alive_count,
                    });
                }
                RemovalCause::Killed
            }
            Lifecycle::ReachedObjective => {
                log::debug!("{} {id:?} reached the objective", agent.kind().tag());
                out.push(Event::BaseHit {
                    agent: id,
                    position: agent.position(),
                });
                RemovalCause::ReachedObjective
            }
            Lifecycle::Disposed | Lifecycle::Active => RemovalCause::Disposed,
        };
        out.push(Event::AgentRemoved { agent: id, cause });
    }

    /// Routes damage from an external source to the agent behind `id`.
    ///
    /// Returns whether this hit killed the agent. Stale handles and terminal
    /// agents are ignored. Removal and the kill event follow in the next update.
    pub fn apply_damage(&mut self, id: AgentId, amount: f32, zone: Zone) -> bool {
        let zones = &self.config.zones;
        self.agents
            .get_mut(id)
            .is_some_and(|agent| agent.take_damage(amount, zone, zones))
    }

    /// Disposes the agent behind `id`; it is detached during the next update.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn dispose(&mut self, id: AgentId) -> bool {
        self.agents.get_mut(id).is_some_and(Agent::dispose)
    }

    /// Disposes every live agent and resets spawn pacing without changing the wave.
    pub fn clear_all(&mut self, out: &mut Vec<Event>) {
        for position in (0..self.agents.order().len()).rev() {
            let id = self.agents.order()[position];
            if let Some(mut agent) = self.agents.remove(id) {
                let _ = agent.dispose();
                out.push(Event::AgentRemoved {
                    agent: id,
                    cause: RemovalCause::Disposed,
                });
            }
        }
        self.agents.compact();
        self.alive_count = 0;
        self.spawn_queue_remaining = 0;
        self.spawn_timer = 0.0;
    }

    /// Agent behind `id`, if it is still live.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Current one-based wave number, or zero before [`WaveScheduler::begin`].
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Agents still waiting to spawn in the current wave.
    #[must_use]
    pub const fn spawn_queue_remaining(&self) -> u32 {
        self.spawn_queue_remaining
    }

    /// Seconds until the next spawn is released.
    #[must_use]
    pub const fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// Seconds of quiet accumulated since the wave was cleared.
    #[must_use]
    pub const fn wave_pause_timer(&self) -> f32 {
        self.wave_pause_timer
    }

    /// Number of agents in the live collection.
    #[must_use]
    pub const fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Objective position observed on the most recent update.
    #[must_use]
    pub const fn objective_center(&self) -> Vec3 {
        self.objective_center
    }

    /// Configuration supplied at construction.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Obstacle field consulted for spawning and steering, if any.
    #[must_use]
    pub const fn obstacles(&self) -> Option<&ObstacleField> {
        self.obstacles.as_ref()
    }
}

fn sanitise_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt >= 0.0 {
        return dt;
    }
    log::warn!("clamping invalid tick delta {dt} to zero");
    0.0
}

/// Query functions that provide read-only access to the scheduler state.
pub mod query {
    use horde_defence_core::{AgentSnapshot, AgentView};

    use super::WaveScheduler;

    /// Captures presentation snapshots of every live agent in spawn order.
    #[must_use]
    pub fn agent_view<R>(scheduler: &WaveScheduler<R>) -> AgentView {
        let snapshots: Vec<AgentSnapshot> = scheduler
            .agents
            .iter()
            .map(|(id, agent)| agent.snapshot(id))
            .collect();
        AgentView::from_snapshots(snapshots)
    }

    /// Number of live agents that have not reached a terminal state.
    #[must_use]
    pub fn active_agents<R>(scheduler: &WaveScheduler<R>) -> usize {
        scheduler
            .agents
            .iter()
            .filter(|(_, agent)| !agent.is_terminal())
            .count()
    }

    /// Reports whether the current wave has finished spawning and has been cleared.
    #[must_use]
    pub fn wave_cleared<R>(scheduler: &WaveScheduler<R>) -> bool {
        scheduler.current_wave > 0
            && scheduler.spawn_queue_remaining == 0
            && scheduler.alive_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dt_is_clamped() {
        assert_eq!(sanitise_dt(-1.0), 0.0);
        assert_eq!(sanitise_dt(f32::NAN), 0.0);
        assert_eq!(sanitise_dt(0.25), 0.25);
    }

    #[test]
    fn begin_only_starts_the_first_wave() {
        let mut scheduler = WaveScheduler::seeded(SimulationConfig::default(), None, 1);
        let mut events = Vec::new();

        scheduler.begin(&mut events);
        scheduler.begin(&mut events);

        assert_eq!(scheduler.current_wave(), 1);
        assert_eq!(
            events,
            vec![Event::WaveStarted {
                wave: 1,
                to_spawn: 5
            }]
        );
    }
}
