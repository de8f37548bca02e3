//! Reel Core
//!
//! Data model for storyboard chase animations:
//!
//! - **Characters**: one killer and a capped set of survivors
//! - **Paths**: time-ordered waypoints with dwell windows and eased transit
//! - **Effects**: role-checked narrative effects (hiding, kill, death, escape)
//! - **Authoring**: waypoint edits that keep path times ordered
//! - **State Machines**: typed transition tables used by playback
//!
//! # Example
//!
//! ```rust
//! use reel_core::{CharacterPath, Waypoint};
//!
//! let path = CharacterPath::new("s1").with_points(vec![
//!     Waypoint::new(0.0, 0.0, 0.0),
//!     Waypoint::new(100.0, 0.0, 10.0),
//! ]);
//!
//! let sample = path.sample_at(5.0);
//! assert!(sample.x > 0.0 && sample.x < 100.0);
//! ```

pub mod authoring;
pub mod character;
pub mod easing;
pub mod effect;
pub mod error;
pub mod fsm;
pub mod path;
pub mod project;

pub use character::{Character, CharacterId, Role};
pub use easing::Easing;
pub use effect::{Effect, EffectKind, KillerEffect, SurvivorEffect};
pub use error::{AuthoringError, ProjectError};
pub use fsm::{StateMachine, Transition};
pub use path::{CharacterPath, PathSample, Waypoint};
pub use project::{Project, TimelineConfig};
