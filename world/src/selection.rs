//! Weighted agent kind selection.

use horde_defence_core::{AgentKind, KindTable};
use rand::Rng;

/// Wave from which fast agents become more common.
pub const FAST_SURGE_WAVE: u32 = 3;
/// Multiplier applied to the fast weight from [`FAST_SURGE_WAVE`] on.
pub const FAST_SURGE_MULTIPLIER: f32 = 1.5;
/// Wave from which heavy agents become more common.
pub const HEAVY_SURGE_WAVE: u32 = 5;
/// Multiplier applied to the heavy weight from [`HEAVY_SURGE_WAVE`] on.
pub const HEAVY_SURGE_MULTIPLIER: f32 = 2.0;

/// Spawn weights for every kind at `wave`, in selection order.
///
/// Negative or non-finite configured weights count as zero.
#[must_use]
pub fn effective_weights(kinds: &KindTable, wave: u32) -> [(AgentKind, f32); 3] {
    AgentKind::ALL.map(|kind| {
        let base = kinds.get(kind).spawn_weight;
        let base = if base.is_finite() { base.max(0.0) } else { 0.0 };
        let weight = match kind {
            AgentKind::Fast if wave >= FAST_SURGE_WAVE => base * FAST_SURGE_MULTIPLIER,
            AgentKind::Heavy if wave >= HEAVY_SURGE_WAVE => base * HEAVY_SURGE_MULTIPLIER,
            _ => base,
        };
        (kind, weight)
    })
}

/// Draws a kind proportionally to its effective weight at `wave`.
///
/// Falls back to [`AgentKind::Grunt`] when every weight is zero.
pub fn select_kind<R>(kinds: &KindTable, wave: u32, rng: &mut R) -> AgentKind
where
    R: Rng + ?Sized,
{
    let weights = effective_weights(kinds, wave);
    let total: f32 = weights.iter().map(|(_, weight)| weight).sum();
    if !total.is_finite() || total <= 0.0 {
        return AgentKind::Grunt;
    }

    let mut remaining = rng.gen_range(0.0..total);
    let mut last_candidate = AgentKind::Grunt;
    for (kind, weight) in weights {
        if weight <= 0.0 {
            continue;
        }
        last_candidate = kind;
        remaining -= weight;
        if remaining <= 0.0 {
            return kind;
        }
    }
    // Rounding left a sliver above zero.
    last_candidate
}
