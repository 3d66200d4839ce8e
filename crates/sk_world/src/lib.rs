use bevy::prelude::*;

pub mod definition;

pub use definition::{
    ConfigError, GameConfig, KindWeight, Point2D, PoolConfig, PoolSizes, SlotConfig,
    SpawnSetup, TerrainConfig,
};

/// World plugin for Skirmish.
/// Owns the game configuration resource.
pub struct SkWorldPlugin;

impl Plugin for SkWorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>();
    }
}
