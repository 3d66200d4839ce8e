//! Simulation systems of the headless host.
//!
//! Actors report what they want through `ActorSignal`s; the systems here
//! route those signals to pools, live sets and the score. Contacts come
//! from `detect_overlaps`, a stand-in for a physics backend.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;
use sk_actors::{
    ActorSignal, EffectPool, EnemyPool, LiveEffects, LiveEnemies, LiveProjectiles,
    ProjectilePool, Score,
};
use sk_core::{CollisionLayers, EffectKind, EnemyKind, Poolable, ProjectileKind};
use sk_pool::{LiveId, LiveSet, ReturnReport};
use sk_spawn::{EnemyRoster, SpawnCoordinator};
use sk_tilemap::{ChunkPainter, ChunkPool, TerrainGenerator};
use sk_world::GameConfig;

/// Playfield; projectiles leaving it hit the boundaries.
pub const ARENA: Rect = Rect {
    min: Vec2::new(0.0, 0.0),
    max: Vec2::new(24.0, 14.0),
};

/// Contact distance between a projectile and a target.
pub const HIT_RADIUS: f32 = 0.5;

/// Seconds between two terrain chunk swaps.
pub const RESTREAM_SECS: f32 = 8.0;

/// Seconds between two stats reports.
pub const STATS_SECS: f32 = 5.0;

pub type EnemyCoordinator = SpawnCoordinator<EnemyKind>;

/// Random stream for actor initialization.
#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

/// Frame counter and periodic timers.
#[derive(Resource)]
pub struct SimClock {
    pub frames: u64,
    pub max_frames: u64,
    pub stats_timer: f32,
    pub restream_timer: f32,
}

impl SimClock {
    pub fn new(max_frames: u64) -> Self {
        Self {
            frames: 0,
            max_frames,
            stats_timer: STATS_SECS,
            restream_timer: RESTREAM_SECS,
        }
    }
}

/// Stationary player cannon that shoots at the nearest enemy.
#[derive(Resource)]
pub struct PlayerGun {
    pub position: Vec2,
    pub reload: f32,
    pub cooldown: f32,
    pub next: ProjectileKind,
}

impl Default for PlayerGun {
    fn default() -> Self {
        Self {
            position: Vec2::new(1.0, 8.0),
            reload: 0.4,
            cooldown: 0.0,
            next: ProjectileKind::FrontCannon,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlapTarget {
    Projectile(LiveId),
    Enemy(LiveId),
}

/// One contact reported for `target`, carrying the other collider's layers.
#[derive(Event, Clone, Copy, Debug)]
pub struct Overlap {
    pub target: OverlapTarget,
    pub layers: CollisionLayers,
}

/// Signals gathered from one batch of actors.
#[derive(Default)]
struct Outbox {
    returns: Vec<LiveId>,
    shots: Vec<(ProjectileKind, Vec2, Vec2)>,
    effects: Vec<(EffectKind, Vec2)>,
    score: u32,
}

impl Outbox {
    fn collect(&mut self, id: LiveId, signals: &mut Vec<ActorSignal>) {
        for signal in signals.drain(..) {
            match signal {
                ActorSignal::ReturnToPool => self.returns.push(id),
                ActorSignal::Fire {
                    kind,
                    origin,
                    direction,
                } => self.shots.push((kind, origin, direction)),
                ActorSignal::Died {
                    score,
                    explosion,
                    at,
                } => {
                    self.score += score;
                    self.effects.push((explosion, at));
                }
                ActorSignal::Explode { effect, at } => self.effects.push((effect, at)),
            }
        }
    }

    fn request_returns<T: Poolable>(&mut self, live: &mut LiveSet<T>) {
        for id in self.returns.drain(..) {
            live.request_return(id);
        }
    }

    fn launch_shots(&mut self, pool: &mut ProjectilePool, live: &mut LiveProjectiles) {
        for (kind, origin, direction) in self.shots.drain(..) {
            launch(pool, live, kind, origin, direction);
        }
    }

    fn play_effects(&mut self, pool: &mut EffectPool, live: &mut LiveEffects) {
        for (kind, at) in self.effects.drain(..) {
            match pool.acquire(kind) {
                Ok(mut effect) => {
                    effect.play(at);
                    live.insert(effect);
                }
                Err(e) => debug!("effect skipped: {}", e),
            }
        }
    }
}

fn launch(
    pool: &mut ProjectilePool,
    live: &mut LiveProjectiles,
    kind: ProjectileKind,
    origin: Vec2,
    direction: Vec2,
) {
    match pool.acquire(kind) {
        Ok(mut projectile) => {
            projectile.fire(origin, direction);
            live.insert(projectile);
        }
        Err(e) => debug!("shot skipped: {}", e),
    }
}

fn log_rejected<T: Poolable>(label: &str, report: ReturnReport<T>) {
    for entity in report.rejected {
        warn!("{}: dropping {:?} the pool refused", label, entity.key());
    }
}

pub fn player_autofire(
    time: Res<Time>,
    mut gun: ResMut<PlayerGun>,
    enemies: Res<LiveEnemies>,
    mut pool: ResMut<ProjectilePool>,
    mut live: ResMut<LiveProjectiles>,
) {
    gun.cooldown -= time.delta_secs();
    if gun.cooldown > 0.0 {
        return;
    }
    let reload = gun.reload;
    gun.cooldown += reload;

    let origin = gun.position;
    let target = enemies
        .iter()
        .filter(|(_, enemy)| enemy.is_alive())
        .map(|(_, enemy)| enemy.position())
        .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)));
    let direction = target.map_or(Vec2::X, |t| t - origin);

    let kind = gun.next;
    gun.next = match kind {
        ProjectileKind::FrontCannon => ProjectileKind::TopCannon,
        _ => ProjectileKind::FrontCannon,
    };
    launch(&mut pool, &mut live, kind, origin, direction);
}

pub fn tick_enemies(
    time: Res<Time>,
    mut enemies: ResMut<LiveEnemies>,
    mut projectile_pool: ResMut<ProjectilePool>,
    mut projectiles: ResMut<LiveProjectiles>,
) {
    let dt = time.delta_secs();
    let mut outbox = Outbox::default();
    let mut signals = Vec::new();

    for (id, enemy) in enemies.iter_mut() {
        enemy.tick(dt, &mut signals);
        outbox.collect(id, &mut signals);
    }

    outbox.request_returns(&mut *enemies);
    outbox.launch_shots(&mut projectile_pool, &mut projectiles);
}

pub fn tick_projectiles(
    time: Res<Time>,
    mut projectiles: ResMut<LiveProjectiles>,
    mut effect_pool: ResMut<EffectPool>,
    mut effects: ResMut<LiveEffects>,
) {
    let dt = time.delta_secs();
    let mut outbox = Outbox::default();
    let mut signals = Vec::new();

    for (id, projectile) in projectiles.iter_mut() {
        projectile.tick(dt, &mut signals);
        outbox.collect(id, &mut signals);
    }

    outbox.request_returns(&mut *projectiles);
    outbox.play_effects(&mut effect_pool, &mut effects);
}

pub fn tick_effects(time: Res<Time>, mut effects: ResMut<LiveEffects>) {
    let dt = time.delta_secs();
    let mut outbox = Outbox::default();
    let mut signals = Vec::new();

    for (id, effect) in effects.iter_mut() {
        effect.tick(dt, &mut signals);
        outbox.collect(id, &mut signals);
    }

    outbox.request_returns(&mut *effects);
}

/// Report one overlap per contact: arena exits, ground hits, enemy hits
/// and shots crossing each other.
pub fn detect_overlaps(
    projectiles: Res<LiveProjectiles>,
    enemies: Res<LiveEnemies>,
    painter: Res<ChunkPainter>,
    mut overlaps: EventWriter<Overlap>,
) {
    let in_flight: Vec<_> = projectiles
        .iter()
        .filter(|(_, p)| p.is_in_flight())
        .map(|(id, p)| (id, p.position(), p.kind().is_friendly()))
        .collect();
    let mut hit = Vec::new();

    for &(id, position, friendly) in &in_flight {
        if !ARENA.contains(position) {
            overlaps.send(Overlap {
                target: OverlapTarget::Projectile(id),
                layers: CollisionLayers::BOUNDARIES,
            });
            hit.push(id);
            continue;
        }
        if painter
            .ground_height(position.x)
            .is_some_and(|ground| position.y < ground)
        {
            overlaps.send(Overlap {
                target: OverlapTarget::Projectile(id),
                layers: CollisionLayers::GROUND,
            });
            hit.push(id);
            continue;
        }
        if !friendly {
            continue;
        }
        let struck = enemies
            .iter()
            .find(|(_, e)| e.is_alive() && e.position().distance(position) < HIT_RADIUS);
        if let Some((enemy, _)) = struck {
            overlaps.send(Overlap {
                target: OverlapTarget::Enemy(enemy),
                layers: CollisionLayers::PLAYER_BULLETS,
            });
            overlaps.send(Overlap {
                target: OverlapTarget::Projectile(id),
                layers: CollisionLayers::ENEMIES,
            });
        }
    }

    for &(friendly_id, friendly_at, _) in in_flight.iter().filter(|p| p.2) {
        if hit.contains(&friendly_id) {
            continue;
        }
        let crossing = in_flight.iter().find(|(id, at, is_friendly)| {
            !is_friendly && !hit.contains(id) && at.distance(friendly_at) < HIT_RADIUS
        });
        if let Some(&(hostile_id, _, _)) = crossing {
            overlaps.send(Overlap {
                target: OverlapTarget::Projectile(friendly_id),
                layers: CollisionLayers::ENEMY_BULLETS,
            });
            overlaps.send(Overlap {
                target: OverlapTarget::Projectile(hostile_id),
                layers: CollisionLayers::PLAYER_BULLETS,
            });
            hit.push(hostile_id);
        }
    }
}

pub fn apply_overlaps(
    mut overlaps: EventReader<Overlap>,
    mut projectiles: ResMut<LiveProjectiles>,
    mut enemies: ResMut<LiveEnemies>,
    mut effect_pool: ResMut<EffectPool>,
    mut effects: ResMut<LiveEffects>,
    mut score: ResMut<Score>,
) {
    let mut projectile_out = Outbox::default();
    let mut enemy_out = Outbox::default();
    let mut signals = Vec::new();

    for overlap in overlaps.read() {
        match overlap.target {
            OverlapTarget::Projectile(id) => {
                if let Some(projectile) = projectiles.get_mut(id) {
                    projectile.on_overlap(overlap.layers, &mut signals);
                    projectile_out.collect(id, &mut signals);
                }
            }
            OverlapTarget::Enemy(id) => {
                if let Some(enemy) = enemies.get_mut(id) {
                    enemy.on_overlap(overlap.layers, &mut signals);
                    enemy_out.collect(id, &mut signals);
                }
            }
        }
    }

    if enemy_out.score > 0 {
        score.add(enemy_out.score);
        info!("Score: {}", score.0);
    }
    projectile_out.request_returns(&mut *projectiles);
    enemy_out.request_returns(&mut *enemies);
    projectile_out.play_effects(&mut effect_pool, &mut effects);
    enemy_out.play_effects(&mut effect_pool, &mut effects);
}

pub fn drain_returns(
    mut projectile_pool: ResMut<ProjectilePool>,
    mut projectiles: ResMut<LiveProjectiles>,
    mut enemy_pool: ResMut<EnemyPool>,
    mut enemies: ResMut<LiveEnemies>,
    mut effect_pool: ResMut<EffectPool>,
    mut effects: ResMut<LiveEffects>,
) {
    log_rejected("projectiles", projectiles.drain_returns(&mut projectile_pool));
    log_rejected("enemies", enemies.drain_returns(&mut enemy_pool));
    log_rejected("effects", effects.drain_returns(&mut effect_pool));
}

pub fn run_roster(
    time: Res<Time>,
    mut roster: ResMut<EnemyRoster>,
    mut coordinator: ResMut<EnemyCoordinator>,
    mut pool: ResMut<EnemyPool>,
    mut enemies: ResMut<LiveEnemies>,
    mut rng: ResMut<SimRng>,
) {
    let tick = roster.tick(
        time.delta_secs(),
        &mut coordinator,
        &mut *pool,
        &mut *enemies,
        time.elapsed(),
    );

    for id in tick.spawned {
        if let Some(enemy) = enemies.get_mut(id) {
            let location = enemy.position();
            enemy.init(location, &mut rng.0);
            info!("{} entered at {}", enemy.kind().name(), location);
        }
    }
}

pub fn stream_terrain(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut clock: ResMut<SimClock>,
    mut painter: ResMut<ChunkPainter>,
    mut generator: ResMut<TerrainGenerator>,
    mut pool: ResMut<ChunkPool>,
) {
    let tick = painter.step();
    if tick.columns_painted > 0 {
        debug!("painted {} terrain columns", tick.columns_painted);
    }

    clock.restream_timer -= time.delta_secs();
    if clock.restream_timer > 0.0 {
        return;
    }
    clock.restream_timer += RESTREAM_SECS;

    if let Err(e) = generator.extend(&mut painter, &mut pool, false) {
        warn!("terrain: {}", e);
    }
    while generator.chunk_count() > config.terrain.chunks_ahead {
        match generator.retire_oldest(&mut painter, &mut pool) {
            Some(report) => log_rejected("chunks", report),
            None => break,
        }
    }
}

pub fn report_stats(
    time: Res<Time>,
    mut clock: ResMut<SimClock>,
    projectile_pool: Res<ProjectilePool>,
    enemy_pool: Res<EnemyPool>,
    effect_pool: Res<EffectPool>,
    chunk_pool: Res<ChunkPool>,
    enemies: Res<LiveEnemies>,
    score: Res<Score>,
) {
    clock.stats_timer -= time.delta_secs();
    if clock.stats_timer > 0.0 {
        return;
    }
    clock.stats_timer += STATS_SECS;

    info!(
        "t={:.1}s enemies on scene: {}, score: {}",
        time.elapsed_secs(),
        enemies.len(),
        score.0
    );
    projectile_pool.log_stats();
    enemy_pool.log_stats();
    effect_pool.log_stats();
    chunk_pool.log_stats();
}

/// Count frames; after the last one hand everything back and exit.
#[allow(clippy::too_many_arguments)]
pub fn finish_run(
    mut clock: ResMut<SimClock>,
    mut roster: ResMut<EnemyRoster>,
    mut enemy_pool: ResMut<EnemyPool>,
    mut enemies: ResMut<LiveEnemies>,
    mut projectile_pool: ResMut<ProjectilePool>,
    mut projectiles: ResMut<LiveProjectiles>,
    mut effect_pool: ResMut<EffectPool>,
    mut effects: ResMut<LiveEffects>,
    mut painter: ResMut<ChunkPainter>,
    mut chunk_pool: ResMut<ChunkPool>,
    score: Res<Score>,
    mut exit: EventWriter<AppExit>,
) {
    clock.frames += 1;
    if clock.frames < clock.max_frames {
        return;
    }

    roster.stop();
    roster.detach(&mut *enemies);
    log_rejected("enemies", roster.remove_all(&mut *enemies, &mut *enemy_pool));
    log_rejected("projectiles", projectiles.return_all(&mut projectile_pool));
    log_rejected("effects", effects.return_all(&mut effect_pool));
    log_rejected("chunks", painter.recycle_all(&mut chunk_pool));

    let disposed = projectile_pool.clear()
        + enemy_pool.clear()
        + effect_pool.clear()
        + chunk_pool.clear();
    info!(
        "Finished after {} frames, final score {}, {} pooled entities disposed",
        clock.frames, score.0, disposed
    );
    exit.send(AppExit::Success);
}
