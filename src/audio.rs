//! Audio cues
//!
//! The simulation only emits [`GameEvent`]s. This module turns them into
//! play requests for whatever mixer the host has; no audio is produced here.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Shovel bites into the ground
    Dig,
    /// Metal on metal: reflections, blocked shoves, impacts
    Clang,
    /// Treasure picked up
    Eat,
    /// Alternating footsteps
    StepOne,
    StepTwo,
    /// Pogo hop
    Jump,
    /// Block dragged across the floor
    StoneSliding,
    /// Level ambience
    TreeBreeze,
    OceanWaves,
    /// Music
    MenuMusic,
    GameMusic,
    /// Menu feedback
    StartGame,
    ClickButton,
    ClickBack,
    QuitGame,
}

impl SoundEffect {
    /// Asset name of the clip
    pub fn clip_name(self) -> &'static str {
        match self {
            SoundEffect::Dig => "dig",
            SoundEffect::Clang => "clang",
            SoundEffect::Eat => "eat",
            SoundEffect::StepOne => "stepOne",
            SoundEffect::StepTwo => "stepTwo",
            SoundEffect::Jump => "jump",
            SoundEffect::StoneSliding => "stoneSliding",
            SoundEffect::TreeBreeze => "treeBreeze",
            SoundEffect::OceanWaves => "oceanWaves",
            SoundEffect::MenuMusic => "menuMusic",
            SoundEffect::GameMusic => "gameMusic",
            SoundEffect::StartGame => "startGame",
            SoundEffect::ClickButton => "clickButton",
            SoundEffect::ClickBack => "clickBack",
            SoundEffect::QuitGame => "quitGame",
        }
    }

    /// Looping tracks mixed at music volume
    pub fn is_music(self) -> bool {
        matches!(
            self,
            SoundEffect::MenuMusic
                | SoundEffect::GameMusic
                | SoundEffect::TreeBreeze
                | SoundEffect::OceanWaves
        )
    }
}

/// Tracks that loop for the whole level
pub const LEVEL_AMBIENCE: [SoundEffect; 3] = [
    SoundEffect::GameMusic,
    SoundEffect::TreeBreeze,
    SoundEffect::OceanWaves,
];

/// One sound for the host to play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub effect: SoundEffect,
    /// Final volume in [0, 1]
    pub volume: f32,
}

impl PlayRequest {
    /// Request at the volume `settings` give this kind of sound. None when
    /// that volume is zero (muted).
    pub fn new(effect: SoundEffect, settings: &Settings) -> Option<Self> {
        let volume = if effect.is_music() {
            settings.effective_music_volume()
        } else {
            settings.effective_sfx_volume()
        };
        (volume > 0.0).then_some(Self { effect, volume })
    }
}

/// Maps gameplay events to sound effects
#[derive(Debug, Clone, Default)]
pub struct AudioCues {
    /// Which foot lands next
    right_foot: bool,
}

impl AudioCues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sound for a single event, if it has one
    pub fn effect_for(&mut self, event: &GameEvent) -> Option<SoundEffect> {
        let effect = match event {
            GameEvent::Footstep => {
                self.right_foot = !self.right_foot;
                if self.right_foot {
                    SoundEffect::StepOne
                } else {
                    SoundEffect::StepTwo
                }
            }
            GameEvent::Dug { .. } => SoundEffect::Dig,
            GameEvent::TreasureCollected { .. } => SoundEffect::Eat,
            GameEvent::Jumped { .. } => SoundEffect::Jump,
            GameEvent::ShoveStarted { .. } => SoundEffect::StoneSliding,
            GameEvent::ShoveRejected { .. }
            | GameEvent::ProjectileReflected { .. }
            | GameEvent::ProjectileImpact { .. }
            | GameEvent::BlockBroken { .. } => SoundEffect::Clang,
            GameEvent::Paused => SoundEffect::ClickButton,
            GameEvent::Resumed => SoundEffect::ClickBack,
            _ => return None,
        };
        Some(effect)
    }

    /// Play requests for a batch of drained events, in event order
    pub fn cues(&mut self, events: &[GameEvent], settings: &Settings) -> Vec<PlayRequest> {
        events
            .iter()
            .filter_map(|event| self.effect_for(event))
            .filter_map(|effect| PlayRequest::new(effect, settings))
            .collect()
    }
}
