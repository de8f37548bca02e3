//! Waypoint paths and time-based position lookup
//!
//! A path is a time-ordered polyline. Each waypoint opens a dwell window
//! `[time, time + dwell)` during which the character stands still, followed
//! by a transit window up to the next waypoint's `time` during which the
//! character moves along an eased curve.
//!
//! Sampling is a pure function of `(path, t)`; playback never recomputes
//! times from `speed`.

use crate::character::CharacterId;
use crate::easing::Easing;
use crate::effect::{Effect, EffectKind};
use serde::{Deserialize, Serialize};

/// Default authoring speed in pixels per second
pub const DEFAULT_SPEED: f32 = 100.0;

/// An authored control point on a character's path
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f32,
    pub y: f32,
    /// Arrival time in seconds, relative to the owner's path start
    pub time: f32,
    /// Seconds spent standing at this waypoint before moving on
    #[serde(default)]
    pub dwell: f32,
    #[serde(default)]
    pub effect: Option<Effect>,
    /// Opacity override (0.0 to 1.0)
    #[serde(default)]
    pub opacity: Option<f32>,
}

impl Waypoint {
    pub fn new(x: f32, y: f32, time: f32) -> Self {
        Self {
            x,
            y,
            time,
            dwell: 0.0,
            effect: None,
            opacity: None,
        }
    }

    /// Builder: set dwell duration
    pub fn with_dwell(mut self, dwell: f32) -> Self {
        self.dwell = dwell;
        self
    }

    /// Builder: set effect
    pub fn with_effect(mut self, effect: impl Into<Effect>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    /// Builder: override opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn effect_kind(&self) -> EffectKind {
        self.effect.as_ref().map(Effect::kind).unwrap_or_default()
    }

    /// Opacity override, or the effect's default
    pub fn resolved_opacity(&self) -> f32 {
        self.opacity
            .unwrap_or_else(|| self.effect_kind().default_opacity())
    }

    pub fn kill_target(&self) -> Option<&CharacterId> {
        self.effect.as_ref().and_then(Effect::kill_target)
    }

    pub fn is_kill(&self) -> bool {
        self.effect_kind() == EffectKind::Kill
    }

    /// Time at which the character leaves this waypoint
    pub fn departs_at(&self) -> f32 {
        self.time + self.dwell
    }

    /// Straight-line distance to another waypoint
    pub fn distance_to(&self, other: &Waypoint) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// The movement path of one character
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterPath {
    pub owner: CharacterId,
    #[serde(default)]
    pub points: Vec<Waypoint>,
    /// Authoring speed in pixels per second, used only when retiming
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub easing: Easing,
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

impl CharacterPath {
    pub fn new(owner: impl Into<CharacterId>) -> Self {
        Self {
            owner: owner.into(),
            points: Vec::new(),
            speed: DEFAULT_SPEED,
            easing: Easing::default(),
        }
    }

    /// Builder: set waypoints
    pub fn with_points(mut self, points: Vec<Waypoint>) -> Self {
        self.points = points;
        self
    }

    /// Builder: set authoring speed
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder: set transit easing
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.points.last()
    }

    /// Time at which the last waypoint's dwell ends (0.0 for an empty path)
    pub fn end_time(&self) -> f32 {
        self.last().map(Waypoint::departs_at).unwrap_or(0.0)
    }

    /// Coordinates of the first waypoint, or the origin
    pub fn start_position(&self) -> (f32, f32) {
        self.first().map(|p| (p.x, p.y)).unwrap_or((0.0, 0.0))
    }

    /// Look up where the character is at path-local time `t`
    pub fn sample_at(&self, t: f32) -> PathSample<'_> {
        let points = &self.points;

        let Some(last) = points.last() else {
            return PathSample::origin();
        };

        if points.len() == 1 {
            return PathSample::resting(0, last);
        }

        for (i, pair) in points.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            let departs = current.departs_at();

            if t >= current.time && t < departs {
                return PathSample::resting(i, current);
            }

            if t >= departs && t < next.time {
                let span = next.time - departs;
                let progress = if span > 0.0 { (t - departs) / span } else { 0.0 };
                let eased = self.easing.apply(progress);

                return PathSample {
                    x: current.x + (next.x - current.x) * eased,
                    y: current.y + (next.y - current.y) * eased,
                    at_waypoint: None,
                    arrived_at_kill: false,
                    kill_target: next.kill_target(),
                };
            }
        }

        // At or past the final waypoint: hold there
        PathSample::resting(points.len() - 1, last)
    }
}

/// Result of a path lookup at one instant
#[derive(Clone, Debug, PartialEq)]
pub struct PathSample<'a> {
    pub x: f32,
    pub y: f32,
    /// Index of the waypoint the character is standing at, if not in transit
    pub at_waypoint: Option<usize>,
    /// Standing at a kill waypoint
    pub arrived_at_kill: bool,
    /// Target of the kill waypoint being stood at or travelled toward
    pub kill_target: Option<&'a CharacterId>,
}

impl<'a> PathSample<'a> {
    fn origin() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            at_waypoint: None,
            arrived_at_kill: false,
            kill_target: None,
        }
    }

    fn resting(index: usize, point: &'a Waypoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
            at_waypoint: Some(index),
            arrived_at_kill: point.is_kill(),
            kill_target: point.kill_target(),
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn in_transit(&self) -> bool {
        self.at_waypoint.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{KillerEffect, SurvivorEffect};

    fn straight_line() -> CharacterPath {
        CharacterPath::new("s1").with_points(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(100.0, 0.0, 10.0),
        ])
    }

    #[test]
    fn test_empty_path_samples_origin() {
        let path = CharacterPath::new("s1");
        let sample = path.sample_at(3.0);
        assert_eq!(sample.position(), (0.0, 0.0));
        assert_eq!(sample.at_waypoint, None);
        assert!(!sample.arrived_at_kill);
        assert_eq!(path.end_time(), 0.0);
    }

    #[test]
    fn test_single_waypoint_holds_forever() {
        let path = CharacterPath::new("k").with_points(vec![
            Waypoint::new(12.0, 34.0, 0.0).with_effect(Effect::kill("s1")),
        ]);

        for t in [0.0, 1.0, 1000.0] {
            let sample = path.sample_at(t);
            assert_eq!(sample.position(), (12.0, 34.0));
            assert_eq!(sample.at_waypoint, Some(0));
            assert!(sample.arrived_at_kill);
            assert_eq!(sample.kill_target.map(CharacterId::as_str), Some("s1"));
        }
    }

    #[test]
    fn test_transit_bounds() {
        let path = straight_line();

        assert_eq!(path.sample_at(0.0).position(), (0.0, 0.0));
        assert_eq!(path.sample_at(10.0).position(), (100.0, 0.0));

        let mid = path.sample_at(5.0);
        assert!(mid.x > 0.0 && mid.x < 100.0);
        assert!((mid.x - 50.0).abs() < 1e-4);
        assert!(mid.in_transit());
    }

    #[test]
    fn test_transit_is_eased_not_linear() {
        let path = straight_line();
        // progress 0.25 -> 2 * 0.25^2 = 0.125
        assert!((path.sample_at(2.5).x - 12.5).abs() < 1e-4);
        // progress 0.75 -> 1 - 0.5^2 / 2 = 0.875
        assert!((path.sample_at(7.5).x - 87.5).abs() < 1e-4);
    }

    #[test]
    fn test_linear_easing_override() {
        let path = straight_line().with_easing(Easing::Linear);
        assert!((path.sample_at(2.5).x - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_dwell_hold() {
        let path = CharacterPath::new("s1").with_points(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(50.0, 50.0, 2.0)
                .with_dwell(3.0)
                .with_effect(SurvivorEffect::Hiding),
            Waypoint::new(100.0, 50.0, 7.0),
        ]);

        for t in [2.0, 3.0, 4.99] {
            let sample = path.sample_at(t);
            assert_eq!(sample.position(), (50.0, 50.0));
            assert_eq!(sample.at_waypoint, Some(1));
        }

        let leaving = path.sample_at(6.0);
        assert!(leaving.in_transit());
        assert!(leaving.x > 50.0 && leaving.x < 100.0);
        assert_eq!(leaving.y, 50.0);
    }

    #[test]
    fn test_zero_length_transit_does_not_divide_by_zero() {
        let path = CharacterPath::new("s1").with_points(vec![
            Waypoint::new(0.0, 0.0, 0.0).with_dwell(5.0),
            Waypoint::new(100.0, 0.0, 5.0),
            Waypoint::new(200.0, 0.0, 6.0),
        ]);

        let sample = path.sample_at(5.0);
        assert!(sample.x.is_finite());
        assert_eq!(sample.position(), (100.0, 0.0));
    }

    #[test]
    fn test_approaching_kill_reports_target_without_arrival() {
        let path = CharacterPath::new("k").with_points(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(10.0, 0.0, 4.0)
                .with_dwell(1.0)
                .with_effect(Effect::kill("s1")),
            Waypoint::new(20.0, 0.0, 8.0),
        ]);

        let approaching = path.sample_at(2.0);
        assert!(!approaching.arrived_at_kill);
        assert_eq!(approaching.kill_target.map(CharacterId::as_str), Some("s1"));

        let striking = path.sample_at(4.5);
        assert!(striking.arrived_at_kill);
        assert_eq!(striking.at_waypoint, Some(1));

        let leaving = path.sample_at(6.0);
        assert!(!leaving.arrived_at_kill);
        assert_eq!(leaving.kill_target, None);
    }

    #[test]
    fn test_holds_final_waypoint() {
        let path = CharacterPath::new("k").with_points(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(30.0, 40.0, 5.0).with_effect(KillerEffect::Dead),
        ]);

        let sample = path.sample_at(99.0);
        assert_eq!(sample.position(), (30.0, 40.0));
        assert_eq!(sample.at_waypoint, Some(1));
        assert_eq!(path.points[1].effect_kind(), EffectKind::Dead);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let path = straight_line();
        assert_eq!(path.sample_at(3.3), path.sample_at(3.3));
    }

    #[test]
    fn test_resolved_opacity() {
        let hiding = Waypoint::new(0.0, 0.0, 0.0).with_effect(SurvivorEffect::Hiding);
        assert_eq!(hiding.resolved_opacity(), 0.3);
        assert_eq!(hiding.clone().with_opacity(0.6).resolved_opacity(), 0.6);
        assert_eq!(Waypoint::new(0.0, 0.0, 0.0).resolved_opacity(), 1.0);
    }

    #[test]
    fn test_end_time_includes_dwell() {
        let path = CharacterPath::new("s1").with_points(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(1.0, 0.0, 8.0).with_dwell(2.0),
        ]);
        assert_eq!(path.end_time(), 10.0);
    }
}
