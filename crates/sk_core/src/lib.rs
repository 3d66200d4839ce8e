use bevy::prelude::*;

pub mod coords;
pub mod kinds;
pub mod layers;
pub mod noise;
pub mod poolable;
pub mod range;

pub use coords::CellCoord;
pub use kinds::{ChunkKind, EffectKind, EnemyKind, ProjectileKind};
pub use layers::CollisionLayers;
pub use noise::NoiseSource;
pub use poolable::{Poolable, Spawnable, SubtypeKey};
pub use range::FloatRange;

/// Core plugin providing the shared vocabulary of Skirmish.
pub struct SkCorePlugin;

impl Plugin for SkCorePlugin {
    fn build(&self, _app: &mut App) {
        // Core types are used by other crates; no systems to register here.
    }
}
