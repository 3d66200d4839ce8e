use bevy::math::Vec2;
use sk_core::{EffectKind, ProjectileKind};

/// Requests an actor hands to the host from its handlers.
///
/// Actors never touch pools or other actors; the host reads these after
/// each tick or overlap and acts on them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActorSignal {
    /// Hand the actor back to its pool.
    ReturnToPool,
    /// Launch a projectile of `kind`.
    Fire {
        kind: ProjectileKind,
        origin: Vec2,
        direction: Vec2,
    },
    /// The actor was killed; award `score` and play `explosion` at `at`.
    Died {
        score: u32,
        explosion: EffectKind,
        at: Vec2,
    },
    /// Play an impact effect.
    Explode { effect: EffectKind, at: Vec2 },
}
