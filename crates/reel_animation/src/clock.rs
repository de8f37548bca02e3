//! Time sources for playback
//!
//! Playback only ever asks a clock for "seconds since some fixed origin".
//! Which origin does not matter: the player anchors its cursor against the
//! reading taken when playback starts or resumes.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A monotonic source of seconds
pub trait Clock {
    fn now(&self) -> f32;
}

/// Wall clock backed by `std::time::Instant`
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}

/// Clock backed by `tokio::time::Instant`, so paused test runtimes control it
#[derive(Clone, Copy, Debug)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}

/// Virtual clock advanced by hand
///
/// Clones share the same reading, so a test can keep a handle while the
/// player owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f32) {
        self.bits.store(seconds.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, seconds: f32) {
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f32::from_bits(bits) + seconds).to_bits())
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }
}
