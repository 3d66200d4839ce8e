//! Skirmish - headless host running the pooled spawn, actor and terrain
//! simulation on a fixed 60 Hz loop.

mod systems;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sk_actors::ActorPools;
use sk_spawn::EnemyRoster;
use sk_tilemap::{register_chunk_pools, ChunkPainter, ChunkPool, TerrainGenerator};
use sk_world::GameConfig;
use std::time::Duration;

use systems::{EnemyCoordinator, Overlap, PlayerGun, SimClock, SimRng};

const TICK_HZ: f64 = 60.0;

/// Frames simulated before the host shuts down.
const RUN_FRAMES: u64 = 60 * 30;

fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / TICK_HZ)
}

fn main() {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick_duration())));
    app.add_plugins(bevy::log::LogPlugin::default());

    app.add_plugins((
        sk_core::SkCorePlugin,
        sk_pool::SkPoolPlugin,
        sk_noise::SkNoisePlugin,
        sk_persistence::SkPersistencePlugin::default(),
        sk_world::SkWorldPlugin,
        sk_tilemap::SkTilemapPlugin,
        sk_spawn::SkSpawnPlugin,
        sk_actors::SkActorsPlugin,
    ))
    .add_event::<Overlap>()
    .init_resource::<PlayerGun>()
    .insert_resource(SimClock::new(RUN_FRAMES))
    .add_systems(Startup, setup_simulation)
    .add_systems(
        Update,
        (
            systems::player_autofire,
            systems::tick_enemies,
            systems::tick_projectiles,
            systems::tick_effects,
            systems::detect_overlaps,
            systems::apply_overlaps,
            systems::drain_returns,
            systems::run_roster,
            systems::stream_terrain,
            systems::report_stats,
            systems::finish_run,
        )
            .chain()
            .run_if(resource_exists::<EnemyRoster>),
    );

    info!("Starting Skirmish simulation at {} Hz", TICK_HZ);
    app.run();
}

/// Build pools, spawner and terrain from the loaded config.
fn setup_simulation(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut enemies: ResMut<sk_actors::LiveEnemies>,
    mut exit: EventWriter<AppExit>,
) {
    let pools = match ActorPools::from_config(&config.pools) {
        Ok(pools) => pools,
        Err(e) => {
            error!("Failed to build actor pools: {}", e);
            exit.send(AppExit::error());
            return;
        }
    };

    let mut chunk_pool = ChunkPool::new("chunks");
    if let Err(e) = register_chunk_pools(
        &mut chunk_pool,
        config.terrain.cell_size,
        config.pools.chunks.max_elements,
        config.pools.chunks.default_elements,
    ) {
        error!("Failed to build chunk pools: {}", e);
        exit.send(AppExit::error());
        return;
    }

    let occupied_for = Duration::try_from_secs_f32(config.slots.occupied_for).unwrap_or_default();
    let mut coordinator =
        EnemyCoordinator::new(config.seed).with_timing(occupied_for, config.slots.max_attempts);
    if let Err(e) = coordinator.configure(&config.spawn.weighted_keys(), &config.slots.positions()) {
        warn!("Spawn weights rejected, enemies will not spawn: {}", e);
    }

    let mut roster = EnemyRoster::new(config.spawn.clone(), config.seed.wrapping_add(1));
    roster.attach(&mut *enemies);
    roster.start();

    let mut painter = ChunkPainter::new(config.terrain.height, config.terrain.columns_per_tick);
    let mut generator = TerrainGenerator::new(&config.terrain, config.seed.wrapping_add(2));
    for _ in 0..config.terrain.chunks_ahead {
        if let Err(e) = generator.extend(&mut painter, &mut chunk_pool, true) {
            warn!("Initial terrain stopped early: {}", e);
            break;
        }
    }

    info!(
        "Simulation ready: {} spawn slots, {} terrain chunks, seed {}",
        coordinator.slots().len(),
        generator.chunk_count(),
        config.seed
    );

    commands.insert_resource(pools.projectiles);
    commands.insert_resource(pools.enemies);
    commands.insert_resource(pools.effects);
    commands.insert_resource(chunk_pool);
    commands.insert_resource(coordinator);
    commands.insert_resource(roster);
    commands.insert_resource(painter);
    commands.insert_resource(generator);
    commands.insert_resource(SimRng(ChaCha8Rng::seed_from_u64(
        config.seed.wrapping_add(3),
    )));
}
