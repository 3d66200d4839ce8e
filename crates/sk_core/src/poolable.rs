use bevy::math::Vec2;
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier distinguishing variants inside one pool category.
///
/// Every category uses its own closed enum (see [`crate::kinds`]), so a key
/// can never be confused with a key from another category.
pub trait SubtypeKey: Copy + Eq + Hash + Ord + Debug + Send + Sync + 'static {}

impl<T> SubtypeKey for T where T: Copy + Eq + Hash + Ord + Debug + Send + Sync + 'static {}

/// Contract implemented by every entity managed by a typed object pool.
///
/// The pool owns the value while it sits in an available queue; the use site
/// owns it between acquire and release.
pub trait Poolable: Send + Sync + 'static {
    type Key: SubtypeKey;

    /// Stable subtype key. Must not change while the entity is alive.
    fn key(&self) -> Self::Key;

    /// Reset hook, runs every time the entity leaves the pool.
    fn on_acquire(&mut self) {}

    /// Deactivation hook, runs when the entity is handed back.
    fn on_release(&mut self) {}

    /// Runs right before an overflowing or cleared entity is dropped.
    fn on_dispose(&mut self) {}
}

/// Entities the spawn coordinator can place at a slot location.
pub trait Spawnable: Poolable {
    fn place_at(&mut self, location: Vec2);
}
