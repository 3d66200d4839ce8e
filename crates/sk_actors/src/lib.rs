use bevy::prelude::*;

pub mod effect;
pub mod enemy;
pub mod pools;
pub mod projectile;
pub mod signal;

pub use effect::Effect;
pub use enemy::{Behaviour, Enemy, EnemyPhase, EnemyProfile};
pub use pools::{
    effect_pool, enemy_pool, projectile_pool, ActorPools, EffectPool, EnemyPool, LiveEffects,
    LiveEnemies, LiveProjectiles, PoolSetupError, ProjectilePool, Score,
};
pub use projectile::{Projectile, ProjectileProfile};
pub use signal::ActorSignal;

/// Actor plugin for Skirmish.
/// Projectiles, enemies and effects, plus the score they feed.
pub struct SkActorsPlugin;

impl Plugin for SkActorsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Score>()
            .init_resource::<LiveProjectiles>()
            .init_resource::<LiveEnemies>()
            .init_resource::<LiveEffects>();
    }
}
