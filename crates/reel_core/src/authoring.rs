//! Waypoint editing helpers
//!
//! Structural edits keep waypoint times non-decreasing by re-deriving them
//! from cumulative straight-line distance at the path's speed. The first
//! waypoint is always pinned to `time = 0`. Every helper returns a new
//! waypoint list and leaves its input untouched.

use crate::effect::Effect;
use crate::error::AuthoringError;
use crate::path::{CharacterPath, Waypoint};

/// Re-derive every waypoint time from distance travelled at `speed`
pub fn retime(points: &[Waypoint], speed: f32) -> Result<Vec<Waypoint>, AuthoringError> {
    if speed.is_nan() || speed <= 0.0 {
        return Err(AuthoringError::InvalidSpeed(speed));
    }

    let mut elapsed = 0.0;
    let retimed = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            if i > 0 {
                elapsed += points[i - 1].distance_to(point) / speed;
            }
            Waypoint {
                time: elapsed,
                ..point.clone()
            }
        })
        .collect();

    Ok(retimed)
}

/// Remove the waypoint at `index` and retime what follows
pub fn remove_waypoint(path: &CharacterPath, index: usize) -> Result<Vec<Waypoint>, AuthoringError> {
    check_index(path, index)?;
    if index == 0 {
        return Err(AuthoringError::RemoveStart);
    }

    let mut points = path.points.clone();
    points.remove(index);

    tracing::debug!(owner = %path.owner, index, "removed waypoint, retiming path");
    retime(&points, path.speed)
}

/// Insert `waypoint` before `index` (or append when `index == len`) and retime
pub fn insert_waypoint(
    path: &CharacterPath,
    index: usize,
    waypoint: Waypoint,
) -> Result<Vec<Waypoint>, AuthoringError> {
    if index > path.points.len() {
        return Err(AuthoringError::IndexOutOfRange {
            index,
            len: path.points.len(),
        });
    }

    let mut points = path.points.clone();
    points.insert(index, waypoint);

    tracing::debug!(owner = %path.owner, index, "inserted waypoint, retiming path");
    retime(&points, path.speed)
}

/// Change the path speed, keeping coordinates and re-deriving times
pub fn change_speed(path: &CharacterPath, speed: f32) -> Result<CharacterPath, AuthoringError> {
    let points = retime(&path.points, speed)?;

    tracing::debug!(owner = %path.owner, speed, "retimed path for new speed");
    Ok(CharacterPath {
        points,
        speed,
        ..path.clone()
    })
}

/// Set the effect at `index`; opacity falls back to the effect's default
pub fn set_effect(
    path: &CharacterPath,
    index: usize,
    effect: Option<Effect>,
    opacity: Option<f32>,
) -> Result<Vec<Waypoint>, AuthoringError> {
    check_index(path, index)?;

    let mut points = path.points.clone();
    let point = &mut points[index];
    point.effect = effect;
    let fallback = point.effect_kind().default_opacity();
    point.opacity = Some(opacity.unwrap_or(fallback));

    Ok(points)
}

/// Drop every waypoint, keeping owner, speed, and easing
pub fn clear(path: &CharacterPath) -> CharacterPath {
    tracing::debug!(owner = %path.owner, removed = path.points.len(), "cleared path");
    CharacterPath {
        points: Vec::new(),
        ..path.clone()
    }
}

fn check_index(path: &CharacterPath, index: usize) -> Result<(), AuthoringError> {
    if index >= path.points.len() {
        return Err(AuthoringError::IndexOutOfRange {
            index,
            len: path.points.len(),
        });
    }
    Ok(())
}
