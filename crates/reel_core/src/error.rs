//! Error types for authoring and project edits

use crate::character::{CharacterId, Role};
use crate::effect::EffectKind;
use thiserror::Error;

/// Errors raised by waypoint authoring helpers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthoringError {
    /// Waypoint index past the end of the path
    #[error("waypoint index {index} out of range for path of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    /// The start waypoint anchors the path and cannot be removed
    #[error("the start waypoint cannot be removed")]
    RemoveStart,

    /// Speed must be strictly positive to derive times from distance
    #[error("path speed must be positive, got {0}")]
    InvalidSpeed(f32),
}

/// Errors raised by project roster edits and validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectError {
    /// A project has at most one killer
    #[error("project already has a killer")]
    KillerExists,

    /// Survivor cap reached
    #[error("survivor limit of {0} reached")]
    SurvivorLimit(usize),

    /// Character id not in the roster
    #[error("unknown character: {0}")]
    UnknownCharacter(CharacterId),

    /// Effect placed on a path whose owner may not use it
    #[error("{effect:?} at waypoint {index} is not allowed for {role:?} {owner}")]
    EffectNotAllowed {
        owner: CharacterId,
        role: Role,
        index: usize,
        effect: EffectKind,
    },

    /// Kill waypoint aimed at something other than a survivor of this project
    #[error("kill at waypoint {index} targets {target}, which is not a survivor")]
    InvalidKillTarget { index: usize, target: CharacterId },

    /// Waypoint times must not decrease along a path
    #[error("waypoint {index} of {owner} arrives before its predecessor")]
    TimeOrder { owner: CharacterId, index: usize },
}

/// Result type for project operations
pub type Result<T> = std::result::Result<T, ProjectError>;
