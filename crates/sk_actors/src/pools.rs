use bevy::prelude::Resource;
use sk_core::{EffectKind, EnemyKind, ProjectileKind};
use sk_pool::{LiveSet, PoolError, TypedObjectPool};
use sk_world::{PoolConfig, PoolSizes};
use std::fmt;

use crate::effect::Effect;
use crate::enemy::Enemy;
use crate::projectile::Projectile;

pub type ProjectilePool = TypedObjectPool<Projectile>;
pub type EnemyPool = TypedObjectPool<Enemy>;
pub type EffectPool = TypedObjectPool<Effect>;

pub type LiveProjectiles = LiveSet<Projectile>;
pub type LiveEnemies = LiveSet<Enemy>;
pub type LiveEffects = LiveSet<Effect>;

/// Points collected by killing enemies.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub u64);

impl Score {
    pub fn add(&mut self, points: u32) {
        self.0 += points as u64;
    }
}

pub fn projectile_pool(sizes: PoolSizes) -> Result<ProjectilePool, PoolError<ProjectileKind>> {
    let mut pool = ProjectilePool::new("projectiles");
    for &kind in ProjectileKind::all() {
        pool.register(kind, Projectile::new, sizes.max_elements, sizes.default_elements)?;
    }
    Ok(pool)
}

pub fn enemy_pool(sizes: PoolSizes) -> Result<EnemyPool, PoolError<EnemyKind>> {
    let mut pool = EnemyPool::new("enemies");
    for &kind in EnemyKind::all() {
        pool.register(kind, Enemy::new, sizes.max_elements, sizes.default_elements)?;
    }
    Ok(pool)
}

pub fn effect_pool(sizes: PoolSizes) -> Result<EffectPool, PoolError<EffectKind>> {
    let mut pool = EffectPool::new("effects");
    for &kind in EffectKind::all() {
        pool.register(kind, Effect::new, sizes.max_elements, sizes.default_elements)?;
    }
    Ok(pool)
}

/// A pool category failed to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolSetupError {
    Projectiles(PoolError<ProjectileKind>),
    Enemies(PoolError<EnemyKind>),
    Effects(PoolError<EffectKind>),
}

impl fmt::Display for PoolSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Projectiles(e) => write!(f, "projectile pools: {}", e),
            Self::Enemies(e) => write!(f, "enemy pools: {}", e),
            Self::Effects(e) => write!(f, "effect pools: {}", e),
        }
    }
}

impl std::error::Error for PoolSetupError {}

impl From<PoolError<ProjectileKind>> for PoolSetupError {
    fn from(err: PoolError<ProjectileKind>) -> Self {
        Self::Projectiles(err)
    }
}

impl From<PoolError<EnemyKind>> for PoolSetupError {
    fn from(err: PoolError<EnemyKind>) -> Self {
        Self::Enemies(err)
    }
}

impl From<PoolError<EffectKind>> for PoolSetupError {
    fn from(err: PoolError<EffectKind>) -> Self {
        Self::Effects(err)
    }
}

/// All actor pools, built from one config.
pub struct ActorPools {
    pub projectiles: ProjectilePool,
    pub enemies: EnemyPool,
    pub effects: EffectPool,
}

impl ActorPools {
    pub fn from_config(config: &PoolConfig) -> Result<Self, PoolSetupError> {
        Ok(Self {
            projectiles: projectile_pool(config.projectiles)?,
            enemies: enemy_pool(config.enemies)?,
            effects: effect_pool(config.effects)?,
        })
    }
}
