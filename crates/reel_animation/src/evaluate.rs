//! Per-frame evaluation
//!
//! Maps a global cursor time to a [`Snapshot`]. The only state carried
//! between frames is the [`KillSet`]: once the killer's clock passes a kill
//! waypoint its target stays dead until the caller clears the set.

use crate::schedule::{Phase, Schedule};
use crate::snapshot::{RenderState, Snapshot};
use indexmap::IndexMap;
use reel_core::{Character, CharacterId, CharacterPath, EffectKind, Project};
use rustc_hash::FxHashSet;

/// Seconds before a kill during which the target shakes
pub const SHAKE_WINDOW: f32 = 3.0;

/// Characters killed so far in the current session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KillSet {
    killed: FxHashSet<CharacterId>,
}

impl KillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a kill; returns `true` the first time `id` is added
    pub fn insert(&mut self, id: CharacterId) -> bool {
        self.killed.insert(id)
    }

    pub fn contains(&self, id: &CharacterId) -> bool {
        self.killed.contains(id)
    }

    pub fn clear(&mut self) {
        if !self.killed.is_empty() {
            tracing::debug!(count = self.killed.len(), "kill set cleared");
        }
        self.killed.clear();
    }

    pub fn len(&self) -> usize {
        self.killed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.killed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterId> {
        self.killed.iter()
    }
}

/// Evaluate every character of `project` at global time `t`
pub fn evaluate(project: &Project, t: f32, kills: &mut KillSet) -> Snapshot {
    let schedule = Schedule::from_project(project);
    let phase = schedule.phase(t);
    let killer_path = project.killer_path();

    if phase != Phase::StartPause {
        if let Some(path) = killer_path {
            register_kills(path, schedule.killer_time(t), kills);
        }
    }

    let frame = Frame {
        schedule,
        t,
        phase,
        killer_path,
        kills,
    };

    let states: IndexMap<CharacterId, RenderState> = project
        .characters
        .iter()
        .map(|character| {
            let state = match project.path_for(&character.id) {
                Some(path) if character.is_killer() => frame.killer(path),
                Some(path) => frame.survivor(character, path),
                None => frame.pathless(character),
            };
            (character.id.clone(), state)
        })
        .collect();

    Snapshot { time: t, phase, states }
}

/// Add every kill target whose waypoint the killer's clock has reached
fn register_kills(killer_path: &CharacterPath, killer_time: f32, kills: &mut KillSet) {
    for point in &killer_path.points {
        let Some(target) = point.kill_target() else {
            continue;
        };
        if killer_time >= point.time && kills.insert(target.clone()) {
            tracing::info!(%target, at = point.time, "kill registered");
        }
    }
}

/// Seconds until the killer strikes `target`, from the first kill waypoint aimed at it
pub fn time_until_kill(
    killer_path: &CharacterPath,
    target: &CharacterId,
    killer_time: f32,
) -> Option<f32> {
    killer_path
        .points
        .iter()
        .find(|point| point.kill_target() == Some(target))
        .map(|point| point.time - killer_time)
}

struct Frame<'a> {
    schedule: Schedule,
    t: f32,
    phase: Phase,
    killer_path: Option<&'a CharacterPath>,
    kills: &'a KillSet,
}

impl Frame<'_> {
    fn killer(&self, path: &CharacterPath) -> RenderState {
        if !self.schedule.killer_active(self.t) {
            let (x, y) = path.start_position();
            return RenderState::hidden(x, y);
        }

        let killer_time = self.schedule.killer_time(self.t);
        let sample = path.sample_at(killer_time);
        let dead = path
            .points
            .iter()
            .any(|point| point.effect_kind() == EffectKind::Dead && killer_time >= point.time);

        let effect = if dead {
            EffectKind::Dead
        } else if sample.arrived_at_kill {
            EffectKind::Kill
        } else {
            EffectKind::Normal
        };

        RenderState {
            effect,
            dead,
            ..RenderState::standing(sample.x, sample.y)
        }
    }

    fn survivor(&self, character: &Character, path: &CharacterPath) -> RenderState {
        if self.phase == Phase::StartPause {
            let (x, y) = path.start_position();
            return RenderState::standing(x, y);
        }

        let sample = path.sample_at(self.schedule.animation_time(self.t));

        if self.kills.contains(&character.id) {
            return RenderState {
                effect: EffectKind::Dead,
                dead: true,
                ..RenderState::standing(sample.x, sample.y)
            };
        }

        // Styling comes from the waypoint being stood at, or the start waypoint in transit
        let styled = path.points.get(sample.at_waypoint.unwrap_or(0));

        RenderState {
            opacity: styled.map(|p| p.resolved_opacity()).unwrap_or(1.0),
            effect: styled.map(|p| p.effect_kind()).unwrap_or_default(),
            shaking: self.is_approached(&character.id),
            ..RenderState::standing(sample.x, sample.y)
        }
    }

    fn pathless(&self, character: &Character) -> RenderState {
        let visible = if character.is_killer() {
            self.schedule.killer_active(self.t)
        } else {
            self.phase != Phase::StartPause
        };
        let dead = self.kills.contains(&character.id);

        RenderState {
            x: 0.0,
            y: 0.0,
            opacity: if visible { 1.0 } else { 0.0 },
            effect: if dead { EffectKind::Dead } else { EffectKind::Normal },
            visible,
            shaking: !dead && self.is_approached(&character.id),
            dead,
        }
    }

    fn is_approached(&self, id: &CharacterId) -> bool {
        let Some(path) = self.killer_path else {
            return false;
        };
        let killer_time = self.schedule.killer_time(self.t);
        time_until_kill(path, id, killer_time)
            .is_some_and(|until| until > 0.0 && until <= SHAKE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::{Effect, Role, SurvivorEffect, TimelineConfig, Waypoint};

    fn timeline(killer_delay: f32, start_pause: f32) -> TimelineConfig {
        TimelineConfig {
            action_duration: 10.0,
            killer_delay,
            start_pause,
            end_pause: 0.0,
        }
    }

    /// Killer strikes s1 at path time 4, survivor walks along the x axis
    fn chase(config: TimelineConfig) -> Project {
        let mut project = Project::new("chase").with_timeline(config);
        project
            .insert_character(Character::new("k", "Killer", Role::Killer))
            .unwrap();
        project
            .insert_character(Character::new("s1", "Survivor 1", Role::Survivor))
            .unwrap();

        project
            .set_path(CharacterPath::new("k").with_points(vec![
                Waypoint::new(0.0, 100.0, 0.0),
                Waypoint::new(50.0, 0.0, 4.0).with_effect(Effect::kill("s1")),
                Waypoint::new(100.0, 0.0, 8.0),
            ]))
            .unwrap();
        project
            .set_path(CharacterPath::new("s1").with_points(vec![
                Waypoint::new(0.0, 0.0, 0.0),
                Waypoint::new(50.0, 0.0, 2.0)
                    .with_dwell(2.0)
                    .with_effect(SurvivorEffect::Hiding),
                Waypoint::new(80.0, 0.0, 6.0),
            ]))
            .unwrap();
        project
    }

    fn id(raw: &str) -> CharacterId {
        CharacterId::new(raw)
    }

    #[test]
    fn test_kill_lands_and_persists() {
        let project = chase(timeline(0.0, 0.0));
        let mut kills = KillSet::new();

        let before = evaluate(&project, 3.0, &mut kills);
        assert!(!before.get(&id("s1")).unwrap().dead);

        let at = evaluate(&project, 5.0, &mut kills);
        let victim = at.get(&id("s1")).unwrap();
        assert!(victim.dead);
        assert_eq!(victim.effect, EffectKind::Dead);
        assert_eq!(victim.opacity, 1.0);

        let later = evaluate(&project, 20.0, &mut kills);
        assert!(later.get(&id("s1")).unwrap().dead);
    }

    #[test]
    fn test_kill_set_is_what_persists() {
        let project = chase(timeline(0.0, 0.0));
        let mut kills = KillSet::new();

        evaluate(&project, 5.0, &mut kills);
        // Re-evaluating an earlier instant keeps the kill until the set is cleared
        assert!(evaluate(&project, 3.0, &mut kills).get(&id("s1")).unwrap().dead);

        kills.clear();
        assert!(!evaluate(&project, 3.0, &mut kills).get(&id("s1")).unwrap().dead);
    }

    #[test]
    fn test_shaking_window() {
        let project = chase(timeline(0.0, 0.0));

        let shaking_at = |t: f32| {
            let mut kills = KillSet::new();
            evaluate(&project, t, &mut kills)
                .get(&id("s1"))
                .unwrap()
                .shaking
        };

        assert!(!shaking_at(0.5));
        assert!(shaking_at(1.0));
        assert!(shaking_at(2.5));
        assert!(shaking_at(3.9));
        // Dead from the moment the kill lands
        assert!(!shaking_at(4.0));
        assert!(!shaking_at(6.0));
    }

    #[test]
    fn test_killer_hidden_until_delay() {
        let project = chase(timeline(3.0, 2.0));
        let mut kills = KillSet::new();

        for t in [0.0, 1.0, 2.0, 4.9] {
            let killer = *evaluate(&project, t, &mut kills).get(&id("k")).unwrap();
            assert!(!killer.visible, "killer visible at {t}");
            assert_eq!(killer.opacity, 0.0);
            assert_eq!((killer.x, killer.y), (0.0, 100.0));
        }

        let killer = *evaluate(&project, 5.0, &mut kills).get(&id("k")).unwrap();
        assert!(killer.visible);
        assert_eq!(killer.opacity, 1.0);
    }

    #[test]
    fn test_killer_effect_at_kill_waypoint() {
        let project = chase(timeline(0.0, 0.0));
        let mut kills = KillSet::new();

        let approaching = *evaluate(&project, 2.0, &mut kills).get(&id("k")).unwrap();
        assert_eq!(approaching.effect, EffectKind::Normal);

        // The final hold sits on a plain waypoint
        let done = *evaluate(&project, 9.0, &mut kills).get(&id("k")).unwrap();
        assert_eq!(done.effect, EffectKind::Normal);
        assert_eq!((done.x, done.y), (100.0, 0.0));
    }

    #[test]
    fn test_survivor_held_during_start_pause() {
        let project = chase(timeline(0.0, 3.0));
        let mut kills = KillSet::new();

        let snapshot = evaluate(&project, 1.0, &mut kills);
        assert_eq!(snapshot.phase, Phase::StartPause);

        let survivor = snapshot.get(&id("s1")).unwrap();
        assert_eq!(*survivor, RenderState::standing(0.0, 0.0));
    }

    #[test]
    fn test_survivor_styled_by_dwell_waypoint() {
        let project = chase(timeline(10.0, 0.0));
        let mut kills = KillSet::new();

        let hiding = *evaluate(&project, 3.0, &mut kills).get(&id("s1")).unwrap();
        assert_eq!((hiding.x, hiding.y), (50.0, 0.0));
        assert_eq!(hiding.effect, EffectKind::Hiding);
        assert_eq!(hiding.opacity, 0.3);

        let moving = *evaluate(&project, 5.0, &mut kills).get(&id("s1")).unwrap();
        assert_eq!(moving.effect, EffectKind::Normal);
        assert_eq!(moving.opacity, 1.0);
    }

    #[test]
    fn test_killer_dead_waypoint_sticks() {
        let mut project = chase(timeline(0.0, 0.0));
        project
            .set_path(CharacterPath::new("k").with_points(vec![
                Waypoint::new(0.0, 0.0, 0.0),
                Waypoint::new(10.0, 0.0, 2.0).with_effect(reel_core::KillerEffect::Dead),
                Waypoint::new(20.0, 0.0, 5.0),
            ]))
            .unwrap();
        let mut kills = KillSet::new();

        assert!(!evaluate(&project, 1.0, &mut kills).get(&id("k")).unwrap().dead);
        for t in [2.0, 3.0, 9.0] {
            let killer = *evaluate(&project, t, &mut kills).get(&id("k")).unwrap();
            assert!(killer.dead);
            assert_eq!(killer.effect, EffectKind::Dead);
        }
    }

    #[test]
    fn test_pathless_characters_are_synthesized() {
        let mut project = chase(timeline(2.0, 1.0));
        project
            .insert_character(Character::new("s2", "Survivor 2", Role::Survivor))
            .unwrap();
        let mut kills = KillSet::new();

        let paused = *evaluate(&project, 0.5, &mut kills).get(&id("s2")).unwrap();
        assert!(!paused.visible);
        assert_eq!(paused.opacity, 0.0);

        let active = *evaluate(&project, 1.5, &mut kills).get(&id("s2")).unwrap();
        assert_eq!(active, RenderState::standing(0.0, 0.0));
    }

    #[test]
    fn test_pathless_victim_reports_dead() {
        let mut project = chase(timeline(0.0, 0.0));
        project.paths.remove(&id("s1"));
        let mut kills = KillSet::new();

        let shaking = *evaluate(&project, 2.0, &mut kills).get(&id("s1")).unwrap();
        assert!(shaking.shaking);

        let dead = *evaluate(&project, 4.0, &mut kills).get(&id("s1")).unwrap();
        assert!(dead.dead);
        assert_eq!(dead.effect, EffectKind::Dead);
        assert!(!dead.shaking);
        assert_eq!((dead.x, dead.y), (0.0, 0.0));
    }

    #[test]
    fn test_unknown_kill_target_is_inert() {
        let mut project = chase(timeline(0.0, 0.0));
        project
            .set_path(CharacterPath::new("k").with_points(vec![
                Waypoint::new(0.0, 0.0, 0.0).with_effect(Effect::kill("ghost")),
            ]))
            .unwrap();
        let mut kills = KillSet::new();

        let snapshot = evaluate(&project, 5.0, &mut kills);
        assert!(snapshot.dead().next().is_none());
        assert!(kills.contains(&id("ghost")));
    }

    #[test]
    fn test_no_kills_during_start_pause() {
        let mut project = chase(timeline(0.0, 5.0));
        project
            .set_path(CharacterPath::new("k").with_points(vec![
                Waypoint::new(0.0, 0.0, 0.0).with_effect(Effect::kill("s1")),
            ]))
            .unwrap();
        let mut kills = KillSet::new();

        evaluate(&project, 4.0, &mut kills);
        assert!(kills.is_empty());

        evaluate(&project, 5.0, &mut kills);
        assert!(kills.contains(&id("s1")));
    }

    #[test]
    fn test_roster_order_preserved() {
        let project = chase(timeline(0.0, 0.0));
        let mut kills = KillSet::new();
        let snapshot = evaluate(&project, 0.0, &mut kills);

        let order: Vec<_> = snapshot.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["k", "s1"]);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let project = chase(timeline(1.0, 1.0));
        let mut first = KillSet::new();
        let mut second = KillSet::new();
        assert_eq!(
            evaluate(&project, 6.5, &mut first),
            evaluate(&project, 6.5, &mut second)
        );
    }
}
