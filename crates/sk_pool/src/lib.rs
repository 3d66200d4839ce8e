use bevy::prelude::*;

pub mod error;
pub mod live;
pub mod pool;

pub use error::{PoolError, ReturnRejected};
pub use live::{Departed, LiveId, LiveSet, ReturnReport, SubscriptionId};
pub use pool::{PoolStats, ReleaseOutcome, TypedObjectPool};

/// Pooling plugin for Skirmish.
/// Pools are registered per category by the crates that own the entity types.
pub struct SkPoolPlugin;

impl Plugin for SkPoolPlugin {
    fn build(&self, _app: &mut App) {
        // Pool resources are inserted by the host once the config is loaded.
    }
}
