//! Project data: roster, paths, and timeline configuration

use crate::character::{Character, CharacterId, Role, PALETTE};
use crate::error::{ProjectError, Result};
use crate::path::CharacterPath;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Survivor cap used by the storyboard editor
pub const DEFAULT_MAX_SURVIVORS: usize = 5;

/// Global timing configuration, in seconds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Minimum length of the action phase
    pub action_duration: f32,
    /// Delay before the killer starts moving (the "hide phase")
    pub killer_delay: f32,
    /// Idle padding before the action phase
    pub start_pause: f32,
    /// Idle padding after the action phase
    pub end_pause: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            action_duration: 30.0,
            killer_delay: 5.0,
            start_pause: 0.0,
            end_pause: 0.0,
        }
    }
}

impl TimelineConfig {
    /// Clamp values into the ranges the editor allows
    pub fn clamped(self) -> Self {
        Self {
            action_duration: self.action_duration.clamp(5.0, 120.0),
            killer_delay: self.killer_delay.clamp(0.0, 30.0),
            start_pause: self.start_pause.clamp(0.0, 30.0),
            end_pause: self.end_pause.clamp(0.0, 30.0),
        }
    }
}

/// A storyboard project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub paths: FxHashMap<CharacterId, CharacterPath>,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default = "default_max_survivors")]
    pub max_survivors: usize,
}

fn default_max_survivors() -> usize {
    DEFAULT_MAX_SURVIVORS
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled Project")
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            characters: Vec::new(),
            paths: FxHashMap::default(),
            timeline: TimelineConfig::default(),
            max_survivors: DEFAULT_MAX_SURVIVORS,
        }
    }

    /// Builder: set timeline configuration
    pub fn with_timeline(mut self, timeline: TimelineConfig) -> Self {
        self.timeline = timeline;
        self
    }

    /// Add a character with editor defaults for name, id, and colour
    pub fn add_character(&mut self, role: Role) -> Result<&Character> {
        self.check_roster(role)?;

        let count = self.count(role);
        let display_name = match role {
            Role::Killer => "Killer".to_string(),
            Role::Survivor => format!("Survivor {}", count + 1),
        };
        let id = self.fresh_id(role);

        let mut character = Character::new(id, display_name, role);
        if role == Role::Survivor {
            character.accent_color = self.free_color().to_string();
        }

        self.characters.push(character);
        Ok(&self.characters[self.characters.len() - 1])
    }

    /// Add a fully specified character, enforcing roster limits
    pub fn insert_character(&mut self, character: Character) -> Result<()> {
        self.check_roster(character.role)?;
        self.characters.push(character);
        Ok(())
    }

    /// Remove a character together with its path
    pub fn remove_character(&mut self, id: &CharacterId) -> Option<Character> {
        let index = self.characters.iter().position(|c| &c.id == id)?;
        self.paths.remove(id);
        Some(self.characters.remove(index))
    }

    /// Replace or insert the path of its owner
    pub fn set_path(&mut self, path: CharacterPath) -> Result<()> {
        if self.character(&path.owner).is_none() {
            return Err(ProjectError::UnknownCharacter(path.owner));
        }
        self.paths.insert(path.owner.clone(), path);
        Ok(())
    }

    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| &c.id == id)
    }

    /// The project's killer, if one has been added
    pub fn killer(&self) -> Option<&Character> {
        self.characters.iter().find(|c| c.is_killer())
    }

    pub fn survivors(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| !c.is_killer())
    }

    pub fn path_for(&self, id: &CharacterId) -> Option<&CharacterPath> {
        self.paths.get(id)
    }

    /// The killer's path, if the killer exists and has one
    pub fn killer_path(&self) -> Option<&CharacterPath> {
        self.killer().and_then(|k| self.path_for(&k.id))
    }

    /// Report authoring mistakes the engine tolerates silently
    pub fn validate(&self) -> Vec<ProjectError> {
        let mut problems = Vec::new();

        for (owner, path) in &self.paths {
            let Some(character) = self.character(owner) else {
                problems.push(ProjectError::UnknownCharacter(owner.clone()));
                continue;
            };

            for (index, point) in path.points.iter().enumerate() {
                if index > 0 && point.time < path.points[index - 1].time {
                    problems.push(ProjectError::TimeOrder {
                        owner: owner.clone(),
                        index,
                    });
                }

                let Some(effect) = &point.effect else {
                    continue;
                };

                if effect.role() != character.role || !effect.kind().allowed_for(character.role) {
                    problems.push(ProjectError::EffectNotAllowed {
                        owner: owner.clone(),
                        role: character.role,
                        index,
                        effect: effect.kind(),
                    });
                }

                if let Some(target) = effect.kill_target() {
                    let is_survivor = self.character(target).is_some_and(|c| !c.is_killer());
                    if !is_survivor {
                        problems.push(ProjectError::InvalidKillTarget {
                            index,
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        problems
    }

    fn count(&self, role: Role) -> usize {
        self.characters.iter().filter(|c| c.role == role).count()
    }

    fn check_roster(&self, role: Role) -> Result<()> {
        match role {
            Role::Killer if self.count(Role::Killer) >= 1 => Err(ProjectError::KillerExists),
            Role::Survivor if self.count(Role::Survivor) >= self.max_survivors => {
                Err(ProjectError::SurvivorLimit(self.max_survivors))
            }
            _ => Ok(()),
        }
    }

    fn fresh_id(&self, role: Role) -> CharacterId {
        let prefix = match role {
            Role::Killer => "killer",
            Role::Survivor => "survivor",
        };
        (1..)
            .map(|n| CharacterId::new(format!("{prefix}-{n}")))
            .find(|id| self.character(id).is_none())
            .unwrap_or_else(|| CharacterId::new(prefix))
    }

    fn free_color(&self) -> &'static str {
        PALETTE
            .iter()
            .find(|color| !self.characters.iter().any(|c| c.accent_color == **color))
            .copied()
            .unwrap_or(PALETTE[0])
    }
}
