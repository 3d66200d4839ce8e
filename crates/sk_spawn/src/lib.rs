use bevy::prelude::*;

pub mod coordinator;
pub mod roster;
pub mod selector;
pub mod slot;

pub use coordinator::{SpawnCoordinator, SpawnError, Spawned, DEFAULT_MAX_ATTEMPTS};
pub use roster::{EnemyRoster, RosterTick};
pub use selector::{SelectorError, WeightedSelector};
pub use slot::OccupancySlot;

/// Entity spawn plugin for Skirmish.
/// Weighted subtype selection, spawn slots and the enemy roster.
pub struct SkSpawnPlugin;

impl Plugin for SkSpawnPlugin {
    fn build(&self, _app: &mut App) {
        // The coordinator and roster are seeded from the loaded config by the host.
    }
}
