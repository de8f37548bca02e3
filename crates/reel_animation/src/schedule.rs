//! Global schedule derived from project configuration
//!
//! The global timeline is `start_pause + animation + end_pause`. Paths are
//! authored on their own zero-based clock; the killer's clock additionally
//! starts `killer_delay` seconds into the animation. Nothing here is cached:
//! a [`Schedule`] is rebuilt from the project whenever it is needed.

use reel_core::Project;
use serde::Serialize;

/// Where the global cursor sits relative to the pause padding
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    StartPause,
    Active,
    EndPause,
}

impl Phase {
    pub fn is_pause(self) -> bool {
        !matches!(self, Phase::Active)
    }
}

/// Timing derived from a project, in seconds
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Schedule {
    pub start_pause: f32,
    /// Length of the action phase, long enough for every path to finish
    pub animation_duration: f32,
    pub end_pause: f32,
    pub killer_delay: f32,
}

impl Schedule {
    pub fn from_project(project: &Project) -> Self {
        let timeline = &project.timeline;
        let killer = project.killer().map(|k| &k.id);

        let longest_path = project
            .paths
            .values()
            .filter(|path| !path.is_empty())
            .map(|path| {
                if Some(&path.owner) == killer {
                    path.end_time() + timeline.killer_delay
                } else {
                    path.end_time()
                }
            })
            .fold(f32::NEG_INFINITY, f32::max);

        Self {
            start_pause: timeline.start_pause,
            animation_duration: timeline.action_duration.max(longest_path),
            end_pause: timeline.end_pause,
            killer_delay: timeline.killer_delay,
        }
    }

    pub fn total_duration(&self) -> f32 {
        self.start_pause + self.animation_duration + self.end_pause
    }

    pub fn phase(&self, t: f32) -> Phase {
        if t < self.start_pause {
            Phase::StartPause
        } else if t >= self.start_pause + self.animation_duration {
            Phase::EndPause
        } else {
            Phase::Active
        }
    }

    /// Clock fed to survivor paths
    pub fn animation_time(&self, t: f32) -> f32 {
        (t - self.start_pause).max(0.0)
    }

    /// Clock fed to the killer's path
    pub fn killer_time(&self, t: f32) -> f32 {
        (self.animation_time(t) - self.killer_delay).max(0.0)
    }

    /// Whether the killer has started acting at global time `t`
    pub fn killer_active(&self, t: f32) -> bool {
        self.phase(t) != Phase::StartPause && self.animation_time(t) >= self.killer_delay
    }
}
