use bevy::log::debug;
use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sk_core::{Spawnable, SubtypeKey};
use sk_pool::{PoolError, TypedObjectPool};
use std::fmt;
use std::time::Duration;

use crate::selector::{SelectorError, WeightedSelector};
use crate::slot::OccupancySlot;

/// Slot draws per spawn when nothing else is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Why a spawn did not happen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnError<K> {
    /// Nothing was spawned. `exhausted` is set when a free slot was found
    /// but the pool of that key had nothing to give.
    NoSpawn { attempts: u32, exhausted: Option<K> },
    UnregisteredKey(K),
    InvalidWeights(SelectorError),
    /// Any other pool failure, passed through unchanged.
    Pool(PoolError<K>),
}

impl<K> SpawnError<K> {
    /// Transient failures: retrying later may succeed.
    pub fn is_no_spawn(&self) -> bool {
        matches!(self, Self::NoSpawn { .. })
    }
}

impl<K: fmt::Debug> fmt::Display for SpawnError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSpawn {
                attempts,
                exhausted: Some(k),
            } => write!(
                f,
                "no spawn after {} attempts: pool for {:?} is exhausted",
                attempts, k
            ),
            Self::NoSpawn {
                attempts,
                exhausted: None,
            } => write!(f, "no free spawn slot after {} attempts", attempts),
            Self::UnregisteredKey(k) => write!(f, "no pool registered for {:?}", k),
            Self::InvalidWeights(e) => write!(f, "invalid spawn weights: {}", e),
            Self::Pool(e) => write!(f, "spawn pool error: {}", e),
        }
    }
}

impl<K: fmt::Debug> std::error::Error for SpawnError<K> {}

impl<K> From<SelectorError> for SpawnError<K> {
    fn from(err: SelectorError) -> Self {
        Self::InvalidWeights(err)
    }
}

impl<K> From<PoolError<K>> for SpawnError<K> {
    fn from(err: PoolError<K>) -> Self {
        match err {
            PoolError::Exhausted(k) => Self::NoSpawn {
                attempts: 0,
                exhausted: Some(k),
            },
            PoolError::UnregisteredKey(k) => Self::UnregisteredKey(k),
            err @ PoolError::DuplicateKey(_) => Self::Pool(err),
        }
    }
}

/// A freshly spawned entity and where it went.
#[derive(Debug)]
pub struct Spawned<T> {
    pub entity: T,
    pub slot: usize,
    /// Slot draws it took, including the successful one.
    pub attempts: u32,
}

/// Picks a weighted subtype and a free slot, then takes the entity from its pool.
#[derive(Resource)]
pub struct SpawnCoordinator<K: SubtypeKey> {
    selector: WeightedSelector<K>,
    slots: Vec<OccupancySlot>,
    occupied_for: Duration,
    max_attempts: u32,
    rng: ChaCha8Rng,
    slot_draws: u64,
}

impl<K: SubtypeKey> SpawnCoordinator<K> {
    pub fn new(seed: u64) -> Self {
        Self {
            selector: WeightedSelector::default(),
            slots: Vec::new(),
            occupied_for: Duration::from_secs(1),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rng: ChaCha8Rng::seed_from_u64(seed),
            slot_draws: 0,
        }
    }

    pub fn with_timing(mut self, occupied_for: Duration, max_attempts: u32) -> Self {
        self.set_timing(occupied_for, max_attempts);
        self
    }

    pub fn set_timing(&mut self, occupied_for: Duration, max_attempts: u32) {
        self.occupied_for = occupied_for;
        self.max_attempts = max_attempts.max(1);
    }

    /// Replace weights and slots together. On error nothing changes.
    pub fn configure(&mut self, weighted_keys: &[(K, f32)], slots: &[Vec2]) -> Result<(), SpawnError<K>> {
        self.selector.configure(weighted_keys)?;
        self.slots = slots.iter().copied().map(OccupancySlot::new).collect();
        Ok(())
    }

    /// Replace only the weights, keeping slots and their locks.
    pub fn set_weights(&mut self, weighted_keys: &[(K, f32)]) -> Result<(), SpawnError<K>> {
        self.selector.configure(weighted_keys)?;
        Ok(())
    }

    pub fn selector(&self) -> &WeightedSelector<K> {
        &self.selector
    }

    pub fn slots(&self) -> &[OccupancySlot] {
        &self.slots
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn occupied_for(&self) -> Duration {
        self.occupied_for
    }

    /// Slot draws made since construction, across all spawn calls.
    pub fn slot_draws(&self) -> u64 {
        self.slot_draws
    }

    /// Slots free at `now`.
    pub fn available_slots(&self, now: Duration) -> usize {
        self.slots.iter().filter(|s| s.is_available(now)).count()
    }

    /// Spawn a key drawn from the weight table.
    pub fn spawn_one<T>(
        &mut self,
        pool: &mut TypedObjectPool<T>,
        now: Duration,
    ) -> Result<Spawned<T>, SpawnError<K>>
    where
        T: Spawnable<Key = K>,
    {
        let key = self
            .selector
            .next(&mut self.rng)
            .ok_or(SpawnError::InvalidWeights(SelectorError::InvalidWeights {
                total: 0.0,
            }))?;
        self.spawn_one_of(key, pool, now)
    }

    /// Spawn a caller-chosen key at a random free slot.
    ///
    /// Draws a slot up to `max_attempts` times. The first free slot gets the
    /// entity; if the pool is exhausted there the call fails with `NoSpawn`
    /// without trying other slots.
    pub fn spawn_one_of<T>(
        &mut self,
        key: K,
        pool: &mut TypedObjectPool<T>,
        now: Duration,
    ) -> Result<Spawned<T>, SpawnError<K>>
    where
        T: Spawnable<Key = K>,
    {
        if self.slots.is_empty() {
            return Err(SpawnError::NoSpawn {
                attempts: 0,
                exhausted: None,
            });
        }

        for attempt in 1..=self.max_attempts {
            let index = self.rng.gen_range(0..self.slots.len());
            self.slot_draws += 1;
            if !self.slots[index].is_available(now) {
                continue;
            }

            let mut entity = match pool.acquire(key) {
                Ok(entity) => entity,
                Err(PoolError::Exhausted(k)) => {
                    return Err(SpawnError::NoSpawn {
                        attempts: attempt,
                        exhausted: Some(k),
                    })
                }
                Err(err) => return Err(err.into()),
            };
            let slot = &mut self.slots[index];
            slot.lock(now, self.occupied_for);
            entity.place_at(slot.location());

            debug!(
                "spawned {:?} at slot {} after {} attempt(s)",
                key, index, attempt
            );
            return Ok(Spawned {
                entity,
                slot: index,
                attempts: attempt,
            });
        }

        Err(SpawnError::NoSpawn {
            attempts: self.max_attempts,
            exhausted: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_core::Poolable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    enum Kind {
        Scout,
        Heavy,
    }

    #[derive(Debug)]
    struct Drone {
        kind: Kind,
        at: Option<Vec2>,
    }

    impl Poolable for Drone {
        type Key = Kind;

        fn key(&self) -> Kind {
            self.kind
        }

        fn on_release(&mut self) {
            self.at = None;
        }
    }

    impl Spawnable for Drone {
        fn place_at(&mut self, location: Vec2) {
            self.at = Some(location);
        }
    }

    fn drone_pool(capacity: usize) -> TypedObjectPool<Drone> {
        let mut pool = TypedObjectPool::new("drones");
        for kind in [Kind::Scout, Kind::Heavy] {
            pool.register(kind, |kind| Drone { kind, at: None }, capacity, 0)
                .unwrap();
        }
        pool
    }

    fn slots(count: usize) -> Vec<Vec2> {
        (0..count).map(|i| Vec2::new(i as f32, 5.0)).collect()
    }

    fn coordinator(slot_count: usize) -> SpawnCoordinator<Kind> {
        let mut coordinator = SpawnCoordinator::new(11);
        coordinator
            .configure(&[(Kind::Scout, 1.0), (Kind::Heavy, 1.0)], &slots(slot_count))
            .unwrap();
        coordinator
    }

    #[test]
    fn spawned_entity_sits_on_its_slot() {
        let mut coordinator = coordinator(3);
        let mut pool = drone_pool(4);

        let spawned = coordinator.spawn_one(&mut pool, Duration::ZERO).unwrap();
        assert_eq!(spawned.entity.at, Some(coordinator.slots()[spawned.slot].location()));
        assert_eq!(spawned.attempts, 1);
        assert!(!coordinator.slots()[spawned.slot].is_available(Duration::ZERO));
        assert_eq!(pool.active_count(spawned.entity.kind), Some(1));
    }

    #[test]
    fn all_slots_locked_gives_up_after_max_attempts() {
        let mut coordinator = coordinator(2).with_timing(Duration::from_secs(1), 7);
        let mut pool = drone_pool(8);
        let now = Duration::ZERO;

        while coordinator.available_slots(now) > 0 {
            coordinator.spawn_one(&mut pool, now).ok();
        }

        let draws_before = coordinator.slot_draws();
        let err = coordinator.spawn_one(&mut pool, now).unwrap_err();
        assert_eq!(
            err,
            SpawnError::NoSpawn {
                attempts: 7,
                exhausted: None
            }
        );
        assert!(err.is_no_spawn());
        assert_eq!(coordinator.slot_draws() - draws_before, 7);

        let err = coordinator
            .spawn_one_of(Kind::Scout, &mut pool, now)
            .unwrap_err();
        assert!(err.is_no_spawn());
        assert_eq!(coordinator.slot_draws() - draws_before, 14);
    }

    #[test]
    fn successful_spawn_stops_drawing() {
        let mut coordinator = coordinator(4).with_timing(Duration::from_secs(1), 50);
        let mut pool = drone_pool(8);

        let spawned = coordinator.spawn_one(&mut pool, Duration::ZERO).unwrap();
        assert_eq!(coordinator.slot_draws(), u64::from(spawned.attempts));
    }

    #[test]
    fn locked_slot_frees_up_after_occupied_for() {
        let mut coordinator = coordinator(1);
        let mut pool = drone_pool(4);

        assert!(coordinator.spawn_one(&mut pool, Duration::ZERO).is_ok());
        assert!(matches!(
            coordinator.spawn_one(&mut pool, Duration::from_millis(999)),
            Err(SpawnError::NoSpawn { .. })
        ));
        assert!(coordinator
            .spawn_one(&mut pool, Duration::from_secs(1))
            .is_ok());
    }

    #[test]
    fn exhausted_pool_fails_without_trying_other_slots() {
        let mut coordinator = coordinator(4);
        let mut pool = drone_pool(1);
        let now = Duration::ZERO;

        coordinator.spawn_one_of(Kind::Heavy, &mut pool, now).unwrap();
        assert_eq!(coordinator.available_slots(now), 3);

        let draws_before = coordinator.slot_draws();
        let err = coordinator
            .spawn_one_of(Kind::Heavy, &mut pool, now)
            .unwrap_err();
        match err {
            SpawnError::NoSpawn {
                attempts,
                exhausted,
            } => {
                assert_eq!(exhausted, Some(Kind::Heavy));
                assert_eq!(u64::from(attempts), coordinator.slot_draws() - draws_before);
            }
            other => panic!("expected NoSpawn, got {:?}", other),
        }
        assert!(err.is_no_spawn());
        assert_eq!(coordinator.available_slots(now), 3);
        assert_eq!(pool.active_count(Kind::Heavy), Some(1));
    }

    #[test]
    fn pool_errors_keep_their_cause() {
        let err: SpawnError<Kind> = PoolError::DuplicateKey(Kind::Scout).into();
        assert_eq!(err, SpawnError::Pool(PoolError::DuplicateKey(Kind::Scout)));
        assert!(!err.is_no_spawn());

        let err: SpawnError<Kind> = PoolError::UnregisteredKey(Kind::Heavy).into();
        assert_eq!(err, SpawnError::UnregisteredKey(Kind::Heavy));

        let err: SpawnError<Kind> = PoolError::Exhausted(Kind::Heavy).into();
        assert!(matches!(
            err,
            SpawnError::NoSpawn {
                exhausted: Some(Kind::Heavy),
                ..
            }
        ));
    }

    #[test]
    fn unregistered_key_is_reported() {
        let mut coordinator = coordinator(2);
        let mut pool = TypedObjectPool::<Drone>::new("drones");
        pool.register(Kind::Scout, |kind| Drone { kind, at: None }, 1, 0)
            .unwrap();

        let err = coordinator
            .spawn_one_of(Kind::Heavy, &mut pool, Duration::ZERO)
            .unwrap_err();
        assert_eq!(err, SpawnError::UnregisteredKey(Kind::Heavy));
        assert!(!err.is_no_spawn());
    }

    #[test]
    fn unconfigured_coordinator_reports_invalid_weights() {
        let mut coordinator = SpawnCoordinator::<Kind>::new(1);
        let mut pool = drone_pool(1);
        assert!(matches!(
            coordinator.spawn_one(&mut pool, Duration::ZERO),
            Err(SpawnError::InvalidWeights(_))
        ));
    }

    #[test]
    fn bad_configure_keeps_slots_and_weights() {
        let mut coordinator = coordinator(3);
        let err = coordinator
            .configure(&[(Kind::Scout, -1.0)], &slots(1))
            .unwrap_err();
        assert!(matches!(err, SpawnError::InvalidWeights(_)));
        assert_eq!(coordinator.slots().len(), 3);
        assert_eq!(coordinator.selector().keys().len(), 2);
    }

    #[test]
    fn same_seed_spawns_the_same_sequence() {
        let mut a = coordinator(5);
        let mut b = coordinator(5);
        let mut pool_a = drone_pool(10);
        let mut pool_b = drone_pool(10);

        for step in 0..6u64 {
            let now = Duration::from_millis(step * 300);
            let sa = a.spawn_one(&mut pool_a, now).map(|s| (s.entity.kind, s.slot));
            let sb = b.spawn_one(&mut pool_b, now).map(|s| (s.entity.kind, s.slot));
            assert_eq!(sa, sb);
        }
    }
}
