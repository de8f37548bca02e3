//! Per-frame render output

use crate::schedule::Phase;
use indexmap::IndexMap;
use reel_core::{CharacterId, EffectKind};
use serde::Serialize;

/// Render state for one character at one instant
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RenderState {
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub effect: EffectKind,
    pub visible: bool,
    /// The killer is closing in on this character's kill waypoint
    pub shaking: bool,
    pub dead: bool,
}

impl RenderState {
    /// Visible, alive, and standing at `(x, y)`
    pub fn standing(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            opacity: 1.0,
            effect: EffectKind::Normal,
            visible: true,
            shaking: false,
            dead: false,
        }
    }

    /// Not drawn, held at `(x, y)`
    pub fn hidden(x: f32, y: f32) -> Self {
        Self {
            opacity: 0.0,
            visible: false,
            ..Self::standing(x, y)
        }
    }
}

/// All character states for one evaluated instant, in roster order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Global cursor time in seconds
    pub time: f32,
    pub phase: Phase,
    pub states: IndexMap<CharacterId, RenderState>,
}

impl Snapshot {
    pub fn get(&self, id: &CharacterId) -> Option<&RenderState> {
        self.states.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CharacterId, &RenderState)> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Ids of every character currently marked dead
    pub fn dead(&self) -> impl Iterator<Item = &CharacterId> {
        self.states
            .iter()
            .filter(|(_, state)| state.dead)
            .map(|(id, _)| id)
    }
}
