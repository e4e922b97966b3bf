//! Generation-tagged storage for live agents.

use horde_defence_core::AgentId;
use horde_defence_system_agents::Agent;

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    agent: Option<Agent>,
}

/// Slot arena that keeps handles stable while agents are removed mid-sweep.
///
/// `order` lists handles in spawn order. Removal frees the slot immediately but
/// leaves the handle in `order` until [`AgentArena::compact`] runs, so indices
/// into `order` stay valid for the remainder of a sweep.
#[derive(Clone, Debug, Default)]
pub(crate) struct AgentArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<AgentId>,
}

impl AgentArena {
    pub(crate) fn insert(&mut self, agent: Agent) -> AgentId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.agent = Some(agent);
                AgentId::new(index, slot.generation)
            }
            None => {
                let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot {
                    generation: 0,
                    agent: Some(agent),
                });
                AgentId::new(index, 0)
            }
        };
        self.order.push(id);
        id
    }

    pub(crate) fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.agent.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.agent.as_mut())
    }

    pub(crate) fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())?;
        let agent = slot.agent.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        Some(agent)
    }

    /// Handles in spawn order, possibly including ones removed since the last compaction.
    pub(crate) fn order(&self) -> &[AgentId] {
        &self.order
    }

    /// Drops handles of removed agents from the spawn order.
    pub(crate) fn compact(&mut self) {
        let slots = &self.slots;
        self.order.retain(|id| {
            slots
                .get(id.index() as usize)
                .is_some_and(|slot| slot.generation == id.generation() && slot.agent.is_some())
        });
    }

    /// Live agents in spawn order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.order
            .iter()
            .filter_map(|id| self.get(*id).map(|agent| (*id, agent)))
    }
}
