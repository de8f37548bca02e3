//! Playback control over a project's timeline
//!
//! [`Player`] owns the global cursor and the session's kill set. Commands
//! (`play`, `pause`, `resume`, `stop`, `seek_to`) change state
//! synchronously; frames are applied through [`FrameTicket`]s so that a
//! frame scheduled before a pause, stop, or seek is ignored when it finally
//! arrives.
//!
//! ```text
//!   Idle ──play──▶ Playing ──pause──▶ Paused
//!    ▲               │  ▲──resume───────┘
//!    │             finish
//!    │               ▼
//!    └───stop─── Completed ──play──▶ Playing
//! ```
//!
//! `stop` is accepted from every state.

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::evaluate::{evaluate, KillSet};
use crate::schedule::{Phase, Schedule};
use crate::snapshot::{RenderState, Snapshot};
use reel_core::{CharacterId, Project, StateMachine};
use serde::Serialize;

/// Playback state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    Completed,
}

/// Commands that move playback between states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    Play,
    Pause,
    Resume,
    Finish,
    Stop,
}

/// Permission to apply one frame, valid until playback is interrupted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

/// What happened when a frame was offered to the player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The ticket was issued before an interruption; nothing changed
    Stale,
    /// The cursor advanced; schedule the next frame with this ticket
    Advanced(FrameTicket),
    /// The cursor reached the end of the timeline
    Completed,
}

fn playback_machine() -> StateMachine<PlaybackState, PlaybackEvent> {
    use PlaybackEvent::*;
    use PlaybackState::*;

    StateMachine::builder(Idle)
        .on_any(&[Idle, Paused, Completed], Play, Playing)
        .on(Playing, Pause, Paused)
        .on(Paused, Resume, Playing)
        .on(Playing, Finish, Completed)
        .on_any(&[Idle, Playing, Paused, Completed], Stop, Idle)
        .build()
}

/// Drives one project's timeline
pub struct Player<C: Clock = SystemClock> {
    project: Project,
    clock: C,
    machine: StateMachine<PlaybackState, PlaybackEvent>,
    kills: KillSet,
    /// Published cursor, global seconds
    cursor: f32,
    /// Clock reading that corresponds to cursor 0 while playing
    anchor: f32,
    /// Cursor to continue from on the next play/resume
    resume_offset: f32,
    generation: u64,
    snapshot: Snapshot,
}

impl Player<SystemClock> {
    /// Create a player on the wall clock
    pub fn new(project: Project) -> Self {
        Self::with_clock(project, SystemClock::new())
    }
}

impl<C: Clock> Player<C> {
    pub fn with_clock(project: Project, clock: C) -> Self {
        let mut player = Self {
            project,
            clock,
            machine: playback_machine(),
            kills: KillSet::new(),
            cursor: 0.0,
            anchor: 0.0,
            resume_offset: 0.0,
            generation: 0,
            snapshot: Snapshot::default(),
        };
        player.publish();
        player
    }

    /// Register a callback fired each time playback naturally reaches the end
    pub fn on_complete<F: FnMut() + Send + 'static>(&mut self, callback: F) {
        self.machine.on_enter(PlaybackState::Completed, callback);
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Replace the project and re-evaluate at the current cursor
    ///
    /// Kills belong to the old roster and are dropped.
    pub fn set_project(&mut self, project: Project) {
        self.project = project;
        self.kills.clear();
        self.cursor = self.cursor.min(self.total_duration());
        self.resume_offset = self.resume_offset.min(self.total_duration());
        self.publish();
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.current_state()
    }

    /// True while a session is running, paused or not
    pub fn is_playing(&self) -> bool {
        matches!(self.state(), PlaybackState::Playing | PlaybackState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state() == PlaybackState::Paused
    }

    pub fn current_time(&self) -> f32 {
        self.cursor
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::from_project(&self.project)
    }

    pub fn total_duration(&self) -> f32 {
        self.schedule().total_duration()
    }

    pub fn phase(&self) -> Phase {
        self.schedule().phase(self.cursor)
    }

    pub fn is_in_pause_phase(&self) -> bool {
        self.phase().is_pause()
    }

    /// The most recently published snapshot
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn state_of(&self, id: &CharacterId) -> Option<&RenderState> {
        self.snapshot.get(id)
    }

    pub fn kills(&self) -> &KillSet {
        &self.kills
    }

    /// Start a fresh session from the last stop, pause, or seek position
    ///
    /// Kills are forgotten and re-registered from the starting cursor.
    pub fn play(&mut self) {
        if self.state() == PlaybackState::Playing {
            return;
        }

        let offset = self.resume_offset;
        self.kills.clear();
        self.machine.send(PlaybackEvent::Play);
        self.cursor = offset;
        self.publish();
        self.start_frames(offset);
    }

    /// Freeze at the published cursor
    pub fn pause(&mut self) {
        if self.state() != PlaybackState::Playing {
            return;
        }

        self.resume_offset = self.cursor;
        self.machine.send(PlaybackEvent::Pause);
        self.cancel_frames();
    }

    /// Continue from where `pause` froze the cursor
    pub fn resume(&mut self) {
        if self.state() != PlaybackState::Paused {
            return;
        }

        self.machine.send(PlaybackEvent::Resume);
        self.start_frames(self.resume_offset);
    }

    /// Return to time 0 with no kills and publish that instant
    pub fn stop(&mut self) {
        self.machine.send(PlaybackEvent::Stop);
        self.cancel_frames();
        self.cursor = 0.0;
        self.resume_offset = 0.0;
        self.kills.clear();
        self.publish();
    }

    /// Jump to `t` (clamped to the timeline) and publish immediately
    ///
    /// Seeking backward clears the kill set so kills replay from the new
    /// position.
    pub fn seek_to(&mut self, t: f32) {
        let target = t.max(0.0).min(self.total_duration());

        if target < self.cursor {
            self.kills.clear();
        }

        self.cursor = target;
        self.resume_offset = target;
        self.publish();

        if self.state() == PlaybackState::Playing {
            self.start_frames(target);
        }
    }

    /// Ticket for the next frame, if playing
    pub fn request_frame(&self) -> Option<FrameTicket> {
        (self.state() == PlaybackState::Playing).then_some(FrameTicket {
            generation: self.generation,
        })
    }

    /// Apply a frame at the clock's current reading
    pub fn on_frame(&mut self, ticket: FrameTicket) -> FrameOutcome {
        if ticket.generation != self.generation || self.state() != PlaybackState::Playing {
            tracing::trace!(
                ticket = ticket.generation,
                current = self.generation,
                "stale frame ignored"
            );
            return FrameOutcome::Stale;
        }

        let total = self.total_duration();
        let elapsed = self.clock.now() - self.anchor;
        self.cursor = elapsed.min(total).max(self.cursor);
        self.publish();

        if elapsed < total {
            return FrameOutcome::Advanced(ticket);
        }

        self.resume_offset = 0.0;
        self.cancel_frames();
        tracing::info!(duration = total, "playback completed");
        self.machine.send(PlaybackEvent::Finish);
        FrameOutcome::Completed
    }

    /// Request and apply one frame; `None` when not playing
    pub fn tick(&mut self) -> Option<FrameOutcome> {
        let ticket = self.request_frame()?;
        Some(self.on_frame(ticket))
    }

    fn start_frames(&mut self, offset: f32) {
        self.anchor = self.clock.now() - offset;
        self.generation = self.generation.wrapping_add(1);
    }

    fn cancel_frames(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn publish(&mut self) {
        self.snapshot = evaluate(&self.project, self.cursor, &mut self.kills);
    }
}

impl<C: Clock> std::fmt::Debug for Player<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("project", &self.project.name)
            .field("state", &self.state())
            .field("cursor", &self.cursor)
            .field("generation", &self.generation)
            .field("kills", &self.kills.len())
            .finish()
    }
}

/// Upper bound on frames reserved up front by [`render_offline`]
const MAX_PREALLOCATED_FRAMES: usize = 4096;

/// Play a project start to finish on a virtual clock, one snapshot per frame
pub fn render_offline(project: Project, fps: u32) -> Vec<Snapshot> {
    let clock = ManualClock::new();
    let mut player = Player::with_clock(project, clock.clone());
    let step = 1.0 / fps.max(1) as f32;
    let expected = frame_count(player.total_duration(), step);

    let mut frames = Vec::with_capacity(expected.min(MAX_PREALLOCATED_FRAMES));
    player.play();

    while let Some(outcome) = player.tick() {
        frames.push(player.snapshot().clone());
        if outcome == FrameOutcome::Completed || frames.len() > expected {
            break;
        }
        clock.set(frames.len() as f32 * step);
    }

    frames
}

/// Frames needed to cover `duration` at `step`, including both endpoints
fn frame_count(duration: f32, step: f32) -> usize {
    (duration / step).ceil() as usize + 1
}
