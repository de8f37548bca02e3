//! Playback scheduler
//!
//! Holds several independent playback sessions and ticks the playing ones
//! each frame. Every session owns its own kill set; nothing is shared
//! between them except the clock.

use crate::clock::{Clock, SystemClock};
use crate::player::{FrameOutcome, Player};
use reel_core::Project;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    pub struct SessionId;
}

/// Sessions that reached the end during one scheduler tick
pub type Completed = SmallVec<[SessionId; 4]>;

/// The scheduler that ticks all playing sessions
pub struct PlaybackScheduler<C: Clock + Clone = SystemClock> {
    sessions: SlotMap<SessionId, Player<C>>,
    clock: C,
}

impl PlaybackScheduler<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for PlaybackScheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> PlaybackScheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            sessions: SlotMap::with_key(),
            clock,
        }
    }

    /// Open a session for `project` on the scheduler's clock
    pub fn open(&mut self, project: Project) -> SessionId {
        let player = Player::with_clock(project, self.clock.clone());
        self.sessions.insert(player)
    }

    pub fn get(&self, id: SessionId) -> Option<&Player<C>> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Player<C>> {
        self.sessions.get_mut(id)
    }

    pub fn close(&mut self, id: SessionId) -> Option<Player<C>> {
        self.sessions.remove(id)
    }

    /// Advance every playing session by one frame
    pub fn tick(&mut self) -> Completed {
        self.sessions
            .iter_mut()
            .filter_map(|(id, player)| {
                (player.tick() == Some(FrameOutcome::Completed)).then_some(id)
            })
            .collect()
    }

    /// Check if any session is still playing
    pub fn has_active_sessions(&self) -> bool {
        self.sessions
            .iter()
            .any(|(_, player)| player.is_playing() && !player.is_paused())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SessionId, &Player<C>)> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
