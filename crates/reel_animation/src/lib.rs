//! Reel Timeline Engine
//!
//! Turns a storyboard project and a clock into per-character render state.
//!
//! # Features
//!
//! - **Schedule**: start/end pause padding and the killer's delayed start
//! - **Evaluation**: position, opacity, effect, and alive/dead status per frame
//! - **Kill Resolution**: kills persist forward until stop or a backward seek
//! - **Playback**: play/pause/resume/stop/seek with cancellable frame tickets
//! - **Drivers**: multi-session scheduler and a tokio fixed-interval loop

pub mod clock;
pub mod driver;
pub mod evaluate;
pub mod player;
pub mod schedule;
pub mod scheduler;
pub mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use driver::{DriverExit, FrameDriver, SharedPlayer};
pub use evaluate::{evaluate, KillSet, SHAKE_WINDOW};
pub use player::{render_offline, FrameOutcome, FrameTicket, PlaybackState, Player};
pub use schedule::{Phase, Schedule};
pub use scheduler::{PlaybackScheduler, SessionId};
pub use snapshot::{RenderState, Snapshot};
