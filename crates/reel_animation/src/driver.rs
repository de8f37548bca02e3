//! Fixed-interval frame driver
//!
//! Runs a player's frame loop on a tokio interval. The loop keeps the ticket
//! of the frame it scheduled; when playback is paused, stopped, or seeked
//! that ticket goes stale and the tick is dropped, then the loop picks up a
//! fresh ticket once the player is playing again.

use crate::clock::Clock;
use crate::player::{FrameOutcome, FrameTicket, Player};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A player shared between the frame loop and command callers
pub type SharedPlayer<C> = Arc<Mutex<Player<C>>>;

/// Why a frame loop ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverExit {
    Completed,
    Cancelled,
}

/// Handle to a running frame loop
#[derive(Debug)]
pub struct FrameDriver {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<DriverExit>,
}

impl FrameDriver {
    /// Spawn a frame loop ticking every `period` until the player completes
    pub fn spawn<C>(player: SharedPlayer<C>, period: Duration) -> Self
    where
        C: Clock + Send + 'static,
    {
        let (cancel, mut cancelled) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticket: Option<FrameTicket> = None;

            loop {
                tokio::select! {
                    biased;
                    changed = cancelled.changed() => {
                        if changed.is_err() || *cancelled.borrow() {
                            tracing::debug!("frame driver cancelled");
                            return DriverExit::Cancelled;
                        }
                    }
                    _ = ticker.tick() => {
                        if *cancelled.borrow() {
                            return DriverExit::Cancelled;
                        }

                        let mut player = lock(&player);
                        if let Some(current) = ticket.take().or_else(|| player.request_frame()) {
                            match player.on_frame(current) {
                                FrameOutcome::Advanced(next) => ticket = Some(next),
                                FrameOutcome::Stale => {}
                                FrameOutcome::Completed => return DriverExit::Completed,
                            }
                        }
                    }
                }
            }
        });

        Self { cancel, handle }
    }

    /// Stop the loop; a tick already waiting on the player lock is discarded
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to end
    pub async fn join(self) -> DriverExit {
        let FrameDriver {
            cancel: _cancel,
            handle,
        } = self;
        match handle.await {
            Ok(exit) => exit,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => DriverExit::Cancelled,
        }
    }
}

/// Lock a shared player, recovering from a poisoned lock
pub fn lock<C: Clock>(player: &SharedPlayer<C>) -> MutexGuard<'_, Player<C>> {
    player
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
