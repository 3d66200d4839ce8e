use bevy::math::Vec2;
use sk_core::{EffectKind, Poolable};

use crate::signal::ActorSignal;

/// Pooled one-shot effect.
#[derive(Debug, Clone)]
pub struct Effect {
    kind: EffectKind,
    position: Vec2,
    age: f32,
    playing: bool,
}

impl Effect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            age: 0.0,
            playing: false,
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self, at: Vec2) {
        self.position = at;
        self.age = 0.0;
        self.playing = true;
    }

    pub fn tick(&mut self, dt: f32, out: &mut Vec<ActorSignal>) {
        if !self.playing {
            return;
        }
        self.age += dt;
        if self.age >= self.kind.duration() {
            self.playing = false;
            out.push(ActorSignal::ReturnToPool);
        }
    }
}

impl Poolable for Effect {
    type Key = EffectKind;

    fn key(&self) -> EffectKind {
        self.kind
    }

    fn on_release(&mut self) {
        self.playing = false;
        self.age = 0.0;
    }
}
