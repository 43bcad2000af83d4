//! Per-arena event accumulation.
//!
//! Each `EnvSet` slot owns one `EventTracker`, registered against its arena
//! at construction. The tracker is handed to the arena as its `EventSink`
//! whenever the arena advances, turns incoming events into per-agent flags,
//! and is cleared at the start of every step.

use crate::arena::{AgentId, AgentInfo, Arena, EventSink, GameEvent};
use crate::gamestate::PlayerEvents;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EventKind {
    Goal,
    Assist,
    Shot,
    ShotPass,
    Save,
    Bump,
    Bumped,
    Demo,
    Demoed,
}

pub struct EventTracker {
    arena_index: usize,
    agents: Vec<AgentInfo>,
    flags: Vec<PlayerEvents>,
}

impl EventTracker {
    /// Bind a tracker to the arena at `arena_index`.
    pub fn register(arena_index: usize, arena: &dyn Arena) -> Self {
        let agents = arena.agents();
        let flags = vec![PlayerEvents::default(); agents.len()];
        Self {
            arena_index,
            agents,
            flags,
        }
    }

    pub fn arena_index(&self) -> usize {
        self.arena_index
    }

    /// Flags accumulated since the last `clear`, in arena agent order.
    pub fn flags(&self) -> &[PlayerEvents] {
        &self.flags
    }

    pub fn clear(&mut self) {
        self.flags.fill(PlayerEvents::default());
    }

    fn mark(&mut self, agent: Option<AgentId>, kind: EventKind) {
        let Some(agent) = agent else { return };
        let Some(slot) = self.agents.iter().position(|a| a.id == agent) else {
            tracing::trace!(arena = self.arena_index, %agent, "event for unknown agent");
            return;
        };
        let flags = &mut self.flags[slot];
        let flag = match kind {
            EventKind::Goal => &mut flags.goal,
            EventKind::Assist => &mut flags.assist,
            EventKind::Shot => &mut flags.shot,
            EventKind::ShotPass => &mut flags.shot_pass,
            EventKind::Save => &mut flags.save,
            EventKind::Bump => &mut flags.bump,
            EventKind::Bumped => &mut flags.bumped,
            EventKind::Demo => &mut flags.demo,
            EventKind::Demoed => &mut flags.demoed,
        };
        *flag = true;
    }

    fn team_of(&self, agent: AgentId) -> Option<crate::arena::Team> {
        self.agents.iter().find(|a| a.id == agent).map(|a| a.team)
    }
}

impl EventSink for EventTracker {
    fn on_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Goal { scorer, passer } => {
                self.mark(Some(scorer), EventKind::Goal);
                self.mark(passer, EventKind::Assist);
            }
            GameEvent::Shot { shooter, passer } => {
                self.mark(Some(shooter), EventKind::Shot);
                self.mark(passer, EventKind::ShotPass);
            }
            GameEvent::Save { saver } => self.mark(Some(saver), EventKind::Save),
            GameEvent::Bump {
                bumper,
                victim,
                is_demo,
            } => {
                // Teammate contact is not a bump
                if self.team_of(bumper) == self.team_of(victim) {
                    return;
                }
                self.mark(Some(bumper), EventKind::Bump);
                self.mark(Some(victim), EventKind::Bumped);
                if is_demo {
                    self.mark(Some(bumper), EventKind::Demo);
                    self.mark(Some(victim), EventKind::Demoed);
                }
            }
        }
    }
}
