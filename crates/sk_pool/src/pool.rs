//! Capacity-bounded object pool keyed by entity subtype.
//!
//! One FIFO queue of released entities per key. Entities are moved out on
//! acquire and moved back on release, so an entity is owned either by the
//! pool or by the use site, never both.

use bevy::log::{debug, warn};
use bevy::prelude::Resource;
use sk_core::Poolable;
use std::collections::{BTreeMap, VecDeque};

use crate::error::{PoolError, ReturnRejected};

type Factory<T> = Box<dyn Fn(<T as Poolable>::Key) -> T + Send + Sync>;

/// Where a released entity ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Queued for reuse.
    Queued,
    /// The available queue was full; the entity was disposed.
    Disposed,
}

/// Counters for a single key's pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub active: usize,
    pub available: usize,
    pub capacity: usize,
    pub created: u64,
    pub disposed: u64,
}

struct PoolEntry<T: Poolable> {
    available: VecDeque<T>,
    active_count: usize,
    capacity: usize,
    created: u64,
    disposed: u64,
    factory: Factory<T>,
}

impl<T: Poolable> PoolEntry<T> {
    fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active_count,
            available: self.available.len(),
            capacity: self.capacity,
            created: self.created,
            disposed: self.disposed,
        }
    }
}

/// Owns one fixed-capacity pool per subtype key.
///
/// Each pool category (projectiles, enemies, chunks, ...) is its own
/// resource, so exclusive access to the resource is the only lock needed.
#[derive(Resource)]
pub struct TypedObjectPool<T: Poolable> {
    label: &'static str,
    entries: BTreeMap<T::Key, PoolEntry<T>>,
}

impl<T: Poolable> TypedObjectPool<T> {
    /// Create an empty pool category. `label` only shows up in logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: BTreeMap::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Register the pool for `key`.
    ///
    /// `initial_count` entities (at most `capacity`) are built up front and
    /// queued, so the first acquisitions do not construct anything.
    pub fn register<F>(
        &mut self,
        key: T::Key,
        factory: F,
        capacity: usize,
        initial_count: usize,
    ) -> Result<(), PoolError<T::Key>>
    where
        F: Fn(T::Key) -> T + Send + Sync + 'static,
    {
        if self.entries.contains_key(&key) {
            return Err(PoolError::DuplicateKey(key));
        }

        let prewarm = initial_count.min(capacity);
        let mut available = VecDeque::with_capacity(capacity);
        for _ in 0..prewarm {
            let mut entity = factory(key);
            entity.on_release();
            available.push_back(entity);
        }

        debug!(
            "{}: registered {:?} (capacity {}, prewarmed {})",
            self.label, key, capacity, prewarm
        );

        self.entries.insert(
            key,
            PoolEntry {
                available,
                active_count: 0,
                capacity,
                created: prewarm as u64,
                disposed: 0,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Take an entity of `key` out of the pool.
    ///
    /// Reuses the oldest released entity first, otherwise builds a new one
    /// while fewer than `capacity` are active.
    pub fn acquire(&mut self, key: T::Key) -> Result<T, PoolError<T::Key>> {
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(PoolError::UnregisteredKey(key))?;

        let mut entity = match entry.available.pop_front() {
            Some(entity) => entity,
            None if entry.active_count < entry.capacity => {
                entry.created += 1;
                (entry.factory)(key)
            }
            None => return Err(PoolError::Exhausted(key)),
        };

        entity.on_acquire();
        entry.active_count += 1;
        Ok(entity)
    }

    /// Hand an entity back to the pool of its key.
    ///
    /// When the available queue is already at capacity the entity is
    /// disposed instead of queued. The active count drops either way.
    pub fn release(&mut self, mut entity: T) -> Result<ReleaseOutcome, ReturnRejected<T>> {
        let key = entity.key();
        let Some(entry) = self.entries.get_mut(&key) else {
            warn!("{}: release of unregistered key {:?}", self.label, key);
            return Err(ReturnRejected {
                entity,
                error: PoolError::UnregisteredKey(key),
            });
        };

        if entry.active_count == 0 {
            warn!(
                "{}: {:?} released with no active entities outstanding",
                self.label, key
            );
        }
        entry.active_count = entry.active_count.saturating_sub(1);
        entity.on_release();

        if entry.available.len() < entry.capacity {
            entry.available.push_back(entity);
            Ok(ReleaseOutcome::Queued)
        } else {
            entity.on_dispose();
            entry.disposed += 1;
            debug!("{}: capacity reached for {:?}, disposing", self.label, key);
            Ok(ReleaseOutcome::Disposed)
        }
    }

    /// Dispose every queued entity of every key. Active entities are untouched.
    ///
    /// Returns the number of disposed entities.
    pub fn clear(&mut self) -> usize {
        let mut total = 0;
        for entry in self.entries.values_mut() {
            let count = entry.available.len();
            for mut entity in entry.available.drain(..) {
                entity.on_dispose();
            }
            entry.disposed += count as u64;
            total += count;
        }
        total
    }

    pub fn is_registered(&self, key: T::Key) -> bool {
        self.entries.contains_key(&key)
    }

    /// Registered keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = T::Key> + '_ {
        self.entries.keys().copied()
    }

    pub fn active_count(&self, key: T::Key) -> Option<usize> {
        self.entries.get(&key).map(|e| e.active_count)
    }

    pub fn available_count(&self, key: T::Key) -> Option<usize> {
        self.entries.get(&key).map(|e| e.available.len())
    }

    pub fn capacity(&self, key: T::Key) -> Option<usize> {
        self.entries.get(&key).map(|e| e.capacity)
    }

    pub fn stats(&self, key: T::Key) -> Option<PoolStats> {
        self.entries.get(&key).map(PoolEntry::stats)
    }

    /// Stats of every key, ordered by key.
    pub fn stats_all(&self) -> Vec<(T::Key, PoolStats)> {
        self.entries.iter().map(|(k, e)| (*k, e.stats())).collect()
    }

    /// Write the counters of every key to the debug log.
    pub fn log_stats(&self) {
        for (key, stats) in self.stats_all() {
            debug!(
                "{} pool {:?}: active {}, available {}, capacity {}, created {}, disposed {}",
                self.label,
                key,
                stats.active,
                stats.available,
                stats.capacity,
                stats.created,
                stats.disposed
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub(crate) enum Shape {
        Round,
        Square,
    }

    #[derive(Debug)]
    pub(crate) struct Token {
        pub shape: Shape,
        pub serial: u32,
        pub acquired: u32,
        pub released: u32,
        pub disposals: Arc<AtomicUsize>,
    }

    impl Poolable for Token {
        type Key = Shape;

        fn key(&self) -> Shape {
            self.shape
        }

        fn on_acquire(&mut self) {
            self.acquired += 1;
        }

        fn on_release(&mut self) {
            self.released += 1;
        }

        fn on_dispose(&mut self) {
            self.disposals.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn token_factory(
        disposals: Arc<AtomicUsize>,
    ) -> impl Fn(Shape) -> Token + Send + Sync + 'static {
        let serial = AtomicU32::new(0);
        move |shape| Token {
            shape,
            serial: serial.fetch_add(1, Ordering::Relaxed),
            acquired: 0,
            released: 0,
            disposals: disposals.clone(),
        }
    }

    pub(crate) fn pool_with(capacity: usize) -> (TypedObjectPool<Token>, Arc<AtomicUsize>) {
        let disposals = Arc::new(AtomicUsize::new(0));
        let mut pool = TypedObjectPool::new("tokens");
        pool.register(Shape::Round, token_factory(disposals.clone()), capacity, 0)
            .unwrap();
        (pool, disposals)
    }

    #[test]
    fn acquire_builds_until_capacity_then_exhausts() {
        let (mut pool, _) = pool_with(2);

        let a = pool.acquire(Shape::Round).unwrap();
        let b = pool.acquire(Shape::Round).unwrap();
        assert_eq!(pool.active_count(Shape::Round), Some(2));
        assert_eq!(
            pool.acquire(Shape::Round).unwrap_err(),
            PoolError::Exhausted(Shape::Round)
        );

        pool.release(a).unwrap();
        assert!(pool.acquire(Shape::Round).is_ok());
        drop(b);
    }

    #[test]
    fn active_count_never_exceeds_capacity() {
        let (mut pool, _) = pool_with(3);
        let mut held = Vec::new();

        // Deterministic mix of acquires and releases.
        for step in 0..200u32 {
            if step % 3 == 2 && !held.is_empty() {
                let token = held.remove((step as usize) % held.len());
                pool.release(token).unwrap();
            } else {
                let queue_empty = pool.available_count(Shape::Round) == Some(0);
                let at_capacity = pool.active_count(Shape::Round) == Some(3);
                match pool.acquire(Shape::Round) {
                    Ok(token) => held.push(token),
                    Err(PoolError::Exhausted(_)) => assert!(queue_empty && at_capacity),
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
            assert!(pool.active_count(Shape::Round).unwrap() <= 3);
        }
    }

    #[test]
    fn reuse_is_fifo() {
        let (mut pool, _) = pool_with(4);
        let first = pool.acquire(Shape::Round).unwrap();
        let second = pool.acquire(Shape::Round).unwrap();
        let (first_serial, second_serial) = (first.serial, second.serial);

        pool.release(first).unwrap();
        pool.release(second).unwrap();

        assert_eq!(pool.acquire(Shape::Round).unwrap().serial, first_serial);
        assert_eq!(pool.acquire(Shape::Round).unwrap().serial, second_serial);
    }

    #[test]
    fn hooks_run_on_acquire_and_release() {
        let (mut pool, _) = pool_with(1);
        let token = pool.acquire(Shape::Round).unwrap();
        assert_eq!((token.acquired, token.released), (1, 0));

        pool.release(token).unwrap();
        let token = pool.acquire(Shape::Round).unwrap();
        assert_eq!((token.acquired, token.released), (2, 1));
    }

    #[test]
    fn release_decrements_active_count() {
        let (mut pool, _) = pool_with(2);
        let a = pool.acquire(Shape::Round).unwrap();
        let b = pool.acquire(Shape::Round).unwrap();

        assert_eq!(pool.release(a).unwrap(), ReleaseOutcome::Queued);
        assert_eq!(pool.active_count(Shape::Round), Some(1));
        assert_eq!(pool.release(b).unwrap(), ReleaseOutcome::Queued);
        assert_eq!(pool.active_count(Shape::Round), Some(0));
    }

    #[test]
    fn overflow_release_disposes_instead_of_queueing() {
        let (mut pool, disposals) = pool_with(1);
        let outside = token_factory(disposals.clone());

        // Entities built outside the pool can overfill the queue.
        assert_eq!(pool.release(outside(Shape::Round)).unwrap(), ReleaseOutcome::Queued);
        assert_eq!(pool.available_count(Shape::Round), Some(1));

        let overflow = outside(Shape::Round);
        assert_eq!(pool.release(overflow).unwrap(), ReleaseOutcome::Disposed);
        assert_eq!(pool.available_count(Shape::Round), Some(1));
        assert_eq!(pool.active_count(Shape::Round), Some(0));
        assert_eq!(disposals.load(Ordering::Relaxed), 1);
        assert_eq!(pool.stats(Shape::Round).unwrap().disposed, 1);
    }

    #[test]
    fn release_of_unregistered_key_hands_entity_back() {
        let (mut pool, disposals) = pool_with(1);
        let stray = token_factory(disposals.clone())(Shape::Square);

        let rejected = pool.release(stray).unwrap_err();
        assert_eq!(rejected.error, PoolError::UnregisteredKey(Shape::Square));
        assert_eq!(rejected.into_entity().shape, Shape::Square);
        assert_eq!(disposals.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn acquire_of_unregistered_key_fails() {
        let (mut pool, _) = pool_with(1);
        assert_eq!(
            pool.acquire(Shape::Square).unwrap_err(),
            PoolError::UnregisteredKey(Shape::Square)
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let (mut pool, disposals) = pool_with(1);
        let err = pool
            .register(Shape::Round, token_factory(disposals), 5, 0)
            .unwrap_err();
        assert_eq!(err, PoolError::DuplicateKey(Shape::Round));
        assert_eq!(pool.capacity(Shape::Round), Some(1));
    }

    #[test]
    fn prewarm_is_capped_by_capacity() {
        let disposals = Arc::new(AtomicUsize::new(0));
        let mut pool = TypedObjectPool::new("tokens");
        pool.register(Shape::Square, token_factory(disposals), 2, 10)
            .unwrap();

        let stats = pool.stats(Shape::Square).unwrap();
        assert_eq!(stats.available, 2);
        assert_eq!(stats.created, 2);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn clear_disposes_only_queued_entities() {
        let (mut pool, disposals) = pool_with(3);
        let a = pool.acquire(Shape::Round).unwrap();
        let b = pool.acquire(Shape::Round).unwrap();
        let c = pool.acquire(Shape::Round).unwrap();
        pool.release(a).unwrap();
        pool.release(b).unwrap();

        assert_eq!(pool.clear(), 2);
        assert_eq!(disposals.load(Ordering::Relaxed), 2);
        assert_eq!(pool.available_count(Shape::Round), Some(0));
        assert_eq!(pool.active_count(Shape::Round), Some(1));
        assert_eq!(c.shape, Shape::Round);
    }
}
