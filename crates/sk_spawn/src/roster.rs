//! Keeps the scene topped up with enemies.

use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sk_core::{EnemyKind, Spawnable};
use sk_pool::{LiveId, LiveSet, ReturnReport, SubscriptionId, TypedObjectPool};
use sk_world::SpawnSetup;
use std::time::Duration;

use crate::coordinator::{SpawnCoordinator, SpawnError};

/// What one [`EnemyRoster::tick`] did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RosterTick {
    /// Whether the check interval elapsed this tick.
    pub checked: bool,
    pub spawned: Vec<LiveId>,
    /// Spawns skipped because no slot or pooled entity was available.
    pub no_spawn: u32,
}

/// Periodic enemy generator.
///
/// Every `check_interval` seconds it looks at how many enemies are alive and
/// rolls `spawn_probability` once for each missing one.
#[derive(Resource)]
pub struct EnemyRoster {
    setup: SpawnSetup,
    running: bool,
    until_check: f32,
    rng: ChaCha8Rng,
    subscription: Option<SubscriptionId>,
    departed: u64,
}

impl EnemyRoster {
    pub fn new(setup: SpawnSetup, seed: u64) -> Self {
        Self {
            until_check: setup.check_interval,
            setup,
            running: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
            subscription: None,
            departed: 0,
        }
    }

    pub fn setup(&self) -> &SpawnSetup {
        &self.setup
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Enemies that left the scene since [`attach`](Self::attach).
    pub fn departed(&self) -> u64 {
        self.departed
    }

    fn has_weights(&self) -> bool {
        self.setup.weights.iter().any(|w| w.weight > 0.0)
    }

    /// Replace the setup and push its weights to `coordinator`.
    ///
    /// An empty (or all-zero) weight list stops the generator.
    pub fn set_setup(
        &mut self,
        setup: SpawnSetup,
        coordinator: &mut SpawnCoordinator<EnemyKind>,
    ) -> Result<(), SpawnError<EnemyKind>> {
        if setup.weights.iter().all(|w| w.weight == 0.0) {
            self.setup = setup;
            if self.running {
                info!("enemy roster: no spawn weights, stopping");
            }
            self.running = false;
            return Ok(());
        }

        coordinator.set_weights(&setup.weighted_keys())?;
        self.until_check = self.until_check.min(setup.check_interval);
        self.setup = setup;
        Ok(())
    }

    pub fn start(&mut self) {
        if !self.has_weights() {
            warn!("enemy roster: start ignored, no spawn weights configured");
            return;
        }
        self.running = true;
        self.until_check = self.setup.check_interval;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Listen for enemies leaving `live`.
    pub fn attach<T: Spawnable<Key = EnemyKind>>(&mut self, live: &mut LiveSet<T>) {
        if self.subscription.is_none() {
            self.subscription = Some(live.subscribe());
        }
    }

    pub fn detach<T: Spawnable<Key = EnemyKind>>(&mut self, live: &mut LiveSet<T>) {
        if let Some(subscription) = self.subscription.take() {
            live.unsubscribe(subscription);
        }
    }

    /// Advance the check timer and spawn the missing enemies.
    pub fn tick<T: Spawnable<Key = EnemyKind>>(
        &mut self,
        dt: f32,
        coordinator: &mut SpawnCoordinator<EnemyKind>,
        pool: &mut TypedObjectPool<T>,
        live: &mut LiveSet<T>,
        now: Duration,
    ) -> RosterTick {
        let mut tick = RosterTick::default();

        if let Some(subscription) = self.subscription {
            self.departed += live.take_departures(subscription).len() as u64;
        }

        if !self.running {
            return tick;
        }

        self.until_check -= dt;
        if self.until_check > 0.0 {
            return tick;
        }
        self.until_check += self.setup.check_interval.max(f32::EPSILON);
        tick.checked = true;

        let missing = self.setup.max_enemies_on_scene.saturating_sub(live.len());
        let probability = self.setup.spawn_probability.clamp(0.0, 1.0) as f64;

        for _ in 0..missing {
            if !self.rng.gen_bool(probability) {
                continue;
            }
            match coordinator.spawn_one(pool, now) {
                Ok(spawned) => {
                    let id = live.insert(spawned.entity);
                    tick.spawned.push(id);
                }
                Err(err) if err.is_no_spawn() => {
                    debug!("enemy roster: {}", err);
                    tick.no_spawn += 1;
                }
                Err(err) => {
                    warn!("enemy roster: {}", err);
                    break;
                }
            }
        }

        tick
    }

    /// Send every live enemy back to `pool`.
    pub fn remove_all<T: Spawnable<Key = EnemyKind>>(
        &mut self,
        live: &mut LiveSet<T>,
        pool: &mut TypedObjectPool<T>,
    ) -> ReturnReport<T> {
        let report = live.return_all(pool);
        info!("enemy roster: removed {} enemies", report.returned());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;
    use sk_core::Poolable;
    use sk_world::{KindWeight, SlotConfig};

    struct Dummy {
        kind: EnemyKind,
    }

    impl Poolable for Dummy {
        type Key = EnemyKind;

        fn key(&self) -> EnemyKind {
            self.kind
        }
    }

    impl Spawnable for Dummy {
        fn place_at(&mut self, _location: Vec2) {}
    }

    fn setup(max: usize, probability: f32) -> SpawnSetup {
        SpawnSetup {
            check_interval: 1.0,
            max_enemies_on_scene: max,
            spawn_probability: probability,
            weights: vec![KindWeight::new(EnemyKind::Tank, 1.0)],
        }
    }

    fn world() -> (SpawnCoordinator<EnemyKind>, TypedObjectPool<Dummy>, LiveSet<Dummy>) {
        let mut coordinator = SpawnCoordinator::new(5).with_timing(Duration::ZERO, 20);
        coordinator
            .configure(
                &[(EnemyKind::Tank, 1.0)],
                &SlotConfig::default().positions(),
            )
            .unwrap();
        let mut pool = TypedObjectPool::new("enemies");
        pool.register(EnemyKind::Tank, |kind| Dummy { kind }, 10, 0)
            .unwrap();
        (coordinator, pool, LiveSet::new())
    }

    #[test]
    fn spawns_only_when_interval_elapses() {
        let (mut coordinator, mut pool, mut live) = world();
        let mut roster = EnemyRoster::new(setup(3, 1.0), 1);
        roster.start();

        let tick = roster.tick(0.5, &mut coordinator, &mut pool, &mut live, Duration::ZERO);
        assert!(!tick.checked);
        assert!(live.is_empty());

        let tick = roster.tick(0.5, &mut coordinator, &mut pool, &mut live, Duration::from_secs(1));
        assert!(tick.checked);
        assert_eq!(tick.spawned.len(), 3);
        assert_eq!(live.len(), 3);
    }

    #[test]
    fn never_exceeds_max_on_scene() {
        let (mut coordinator, mut pool, mut live) = world();
        let mut roster = EnemyRoster::new(setup(2, 1.0), 1);
        roster.start();

        for second in 1..10u64 {
            roster.tick(1.0, &mut coordinator, &mut pool, &mut live, Duration::from_secs(second));
            assert!(live.len() <= 2);
        }
        assert_eq!(live.len(), 2);
    }

    #[test]
    fn zero_probability_spawns_nothing() {
        let (mut coordinator, mut pool, mut live) = world();
        let mut roster = EnemyRoster::new(setup(4, 0.0), 1);
        roster.start();
        let tick = roster.tick(1.0, &mut coordinator, &mut pool, &mut live, Duration::ZERO);
        assert!(tick.checked);
        assert!(tick.spawned.is_empty());
    }

    #[test]
    fn stopped_roster_does_nothing() {
        let (mut coordinator, mut pool, mut live) = world();
        let mut roster = EnemyRoster::new(setup(4, 1.0), 1);
        roster.start();
        roster.stop();
        let tick = roster.tick(5.0, &mut coordinator, &mut pool, &mut live, Duration::ZERO);
        assert_eq!(tick, RosterTick::default());
    }

    #[test]
    fn empty_weights_disable_start() {
        let (mut coordinator, _pool, _live) = world();
        let mut roster = EnemyRoster::new(setup(4, 1.0), 1);
        roster.start();

        let mut empty = setup(4, 1.0);
        empty.weights.clear();
        roster.set_setup(empty, &mut coordinator).unwrap();
        assert!(!roster.is_running());

        roster.start();
        assert!(!roster.is_running());
    }

    #[test]
    fn departures_are_counted_and_refilled() {
        let (mut coordinator, mut pool, mut live) = world();
        let mut roster = EnemyRoster::new(setup(2, 1.0), 1);
        roster.attach(&mut live);
        roster.start();

        roster.tick(1.0, &mut coordinator, &mut pool, &mut live, Duration::from_secs(1));
        let first = live.ids()[0];
        live.request_return(first);
        live.drain_returns(&mut pool);
        assert_eq!(live.len(), 1);

        let tick = roster.tick(1.0, &mut coordinator, &mut pool, &mut live, Duration::from_secs(2));
        assert_eq!(roster.departed(), 1);
        assert_eq!(tick.spawned.len(), 1);
        assert_eq!(live.len(), 2);

        roster.detach(&mut live);
        let report = roster.remove_all(&mut live, &mut pool);
        assert_eq!(report.returned(), 2);
        assert_eq!(pool.active_count(EnemyKind::Tank), Some(0));
        assert_eq!(roster.departed(), 1);
    }
}
