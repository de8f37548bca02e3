//! Characters placed on the storyboard map

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a character within a project
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CharacterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Narrative role of a character
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Survivor,
    Killer,
}

impl Role {
    pub fn is_killer(self) -> bool {
        matches!(self, Role::Killer)
    }

    /// Sprite size the editor assigns to new characters of this role
    pub fn default_sprite_size(self) -> f32 {
        match self {
            Role::Killer => 50.0,
            Role::Survivor => 40.0,
        }
    }
}

/// A character on the map
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub display_name: String,
    pub role: Role,
    /// Avatar image reference, resolved by the rendering layer
    #[serde(default)]
    pub avatar_ref: Option<String>,
    /// Accent colour as a CSS hex string
    pub accent_color: String,
    pub sprite_size: f32,
}

impl Character {
    /// Create a character with role defaults for colour and sprite size
    pub fn new(id: impl Into<CharacterId>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            avatar_ref: None,
            accent_color: match role {
                Role::Killer => KILLER_COLOR.to_string(),
                Role::Survivor => PALETTE[0].to_string(),
            },
            sprite_size: role.default_sprite_size(),
        }
    }

    /// Builder: set accent colour
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.accent_color = color.into();
        self
    }

    /// Builder: set avatar reference
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar_ref = Some(avatar.into());
        self
    }

    pub fn is_killer(&self) -> bool {
        self.role.is_killer()
    }
}

/// Accent colour given to the killer
pub const KILLER_COLOR: &str = "#1f1f1f";

/// Accent colours handed out to survivors, first unused wins
pub const PALETTE: [&str; 8] = [
    "#ef4444", // red
    "#f97316", // orange
    "#eab308", // yellow
    "#22c55e", // green
    "#3b82f6", // blue
    "#8b5cf6", // purple
    "#ec4899", // pink
    "#06b6d4", // cyan
];
