use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use sk_core::EnemyKind;
use sk_noise::HeightParams;
use std::fmt;

/// Game configuration resource.
///
/// Top-level serializable structure holding every tunable the host hands to
/// the pools, the spawn coordinator and the terrain generator.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for every random stream (spawning, chunk seeds, actor jitter).
    pub seed: u64,
    /// Pool sizes per category.
    pub pools: PoolConfig,
    /// Enemy generator setup.
    pub spawn: SpawnSetup,
    /// Enemy spawn locations.
    pub slots: SlotConfig,
    /// Terrain chunk generation.
    pub terrain: TerrainConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            pools: PoolConfig::default(),
            spawn: SpawnSetup::default(),
            slots: SlotConfig::default(),
            terrain: TerrainConfig::default(),
        }
    }
}

impl GameConfig {
    /// Check ranges that would otherwise make a component misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, sizes) in [
            ("pools.projectiles", &self.pools.projectiles),
            ("pools.enemies", &self.pools.enemies),
            ("pools.chunks", &self.pools.chunks),
            ("pools.effects", &self.pools.effects),
        ] {
            if sizes.max_elements == 0 {
                return Err(ConfigError::new(name, "max_elements must be at least 1"));
            }
        }

        let spawn = &self.spawn;
        if !(spawn.check_interval > 0.0) {
            return Err(ConfigError::new("spawn.check_interval", "must be positive"));
        }
        if !(0.0..=1.0).contains(&spawn.spawn_probability) {
            return Err(ConfigError::new(
                "spawn.spawn_probability",
                "must lie in [0, 1]",
            ));
        }
        if let Some(bad) = spawn
            .weights
            .iter()
            .find(|w| !w.weight.is_finite() || w.weight < 0.0)
        {
            return Err(ConfigError::new(
                "spawn.weights",
                format!("weight {} for {:?} is not a non-negative number", bad.weight, bad.kind),
            ));
        }

        if self.slots.max_attempts == 0 {
            return Err(ConfigError::new("slots.max_attempts", "must be at least 1"));
        }
        if !(self.slots.occupied_for >= 0.0) {
            return Err(ConfigError::new("slots.occupied_for", "must not be negative"));
        }

        let terrain = &self.terrain;
        if terrain.min_chunk_width == 0 || terrain.min_chunk_width > terrain.max_chunk_width {
            return Err(ConfigError::new(
                "terrain.min_chunk_width",
                "must be at least 1 and not above max_chunk_width",
            ));
        }
        if terrain.columns_per_tick == 0 {
            return Err(ConfigError::new("terrain.columns_per_tick", "must be at least 1"));
        }
        if !(terrain.height.smoothness > 0.0) {
            return Err(ConfigError::new("terrain.height.smoothness", "must be positive"));
        }
        if !(terrain.cell_size > 0.0) {
            return Err(ConfigError::new("terrain.cell_size", "must be positive"));
        }

        Ok(())
    }
}

/// Size limits of one pool category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSizes {
    /// Entities built per key when the pool is registered.
    pub default_elements: usize,
    /// Capacity per key.
    pub max_elements: usize,
}

impl PoolSizes {
    pub const fn new(default_elements: usize, max_elements: usize) -> Self {
        Self {
            default_elements,
            max_elements,
        }
    }
}

/// Pool sizes per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub projectiles: PoolSizes,
    pub enemies: PoolSizes,
    pub chunks: PoolSizes,
    pub effects: PoolSizes,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            projectiles: PoolSizes::new(20, 50),
            enemies: PoolSizes::new(5, 10),
            chunks: PoolSizes::new(3, 6),
            effects: PoolSizes::new(5, 15),
        }
    }
}

/// Relative spawn weight of one enemy kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindWeight {
    pub kind: EnemyKind,
    pub weight: f32,
}

impl KindWeight {
    pub const fn new(kind: EnemyKind, weight: f32) -> Self {
        Self { kind, weight }
    }
}

/// Enemy generator setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSetup {
    /// Seconds between two checks of the enemy count.
    pub check_interval: f32,
    /// Upper bound of enemies alive at once.
    pub max_enemies_on_scene: usize,
    /// Chance that a missing enemy is spawned at a check.
    pub spawn_probability: f32,
    /// Weighted enemy mix.
    pub weights: Vec<KindWeight>,
}

impl Default for SpawnSetup {
    fn default() -> Self {
        Self {
            check_interval: 2.0,
            max_enemies_on_scene: 4,
            spawn_probability: 0.6,
            weights: vec![
                KindWeight::new(EnemyKind::Ufo, 3.0),
                KindWeight::new(EnemyKind::Turret, 1.0),
                KindWeight::new(EnemyKind::Tank, 2.0),
            ],
        }
    }
}

impl SpawnSetup {
    /// Weights as `(key, weight)` pairs.
    pub fn weighted_keys(&self) -> Vec<(EnemyKind, f32)> {
        self.weights.iter().map(|w| (w.kind, w.weight)).collect()
    }
}

/// A 2D point used for spawn locations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Enemy spawn locations and their lock policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    pub locations: Vec<Point2D>,
    /// Seconds a slot stays locked after a spawn.
    pub occupied_for: f32,
    /// Slot draws per spawn before giving up.
    pub max_attempts: u32,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            locations: vec![
                Point2D::new(4.0, 9.0),
                Point2D::new(8.0, 9.5),
                Point2D::new(12.0, 10.0),
                Point2D::new(16.0, 9.5),
                Point2D::new(20.0, 9.0),
            ],
            occupied_for: 1.0,
            max_attempts: 20,
        }
    }
}

impl SlotConfig {
    pub fn positions(&self) -> Vec<Vec2> {
        self.locations.iter().map(|p| p.to_vec2()).collect()
    }
}

/// Terrain chunk generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Narrowest streamed chunk, in columns.
    pub min_chunk_width: u32,
    /// Widest streamed chunk, in columns. Initial chunks always use it.
    pub max_chunk_width: u32,
    /// Profile shape.
    pub height: HeightParams,
    /// Columns painted per tick by time-sliced builds.
    pub columns_per_tick: u32,
    /// World size of one cell.
    pub cell_size: f32,
    /// Chunks kept built ahead of the player.
    pub chunks_ahead: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            min_chunk_width: 60,
            max_chunk_width: 100,
            height: HeightParams::default(),
            columns_per_tick: 3,
            cell_size: 0.1,
            chunks_ahead: 3,
        }
    }
}

/// A config value outside its accepted range.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid config `{}`: {}", self.field, self.reason)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_chunk_widths_are_rejected() {
        let mut config = GameConfig::default();
        config.terrain.min_chunk_width = 120;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "terrain.min_chunk_width");
    }

    #[test]
    fn negative_weights_are_rejected() {
        let mut config = GameConfig::default();
        config.spawn.weights.push(KindWeight::new(EnemyKind::Tank, -1.0));
        assert_eq!(config.validate().unwrap_err().field, "spawn.weights");
    }

    #[test]
    fn probability_must_be_a_fraction() {
        let mut config = GameConfig::default();
        config.spawn.spawn_probability = 1.5;
        assert_eq!(
            config.validate().unwrap_err().field,
            "spawn.spawn_probability"
        );
    }

    #[test]
    fn zero_capacity_pool_is_rejected() {
        let mut config = GameConfig::default();
        config.pools.chunks.max_elements = 0;
        assert_eq!(config.validate().unwrap_err().field, "pools.chunks");
    }

    #[test]
    fn weighted_keys_follow_setup_order() {
        let keys = SpawnSetup::default().weighted_keys();
        assert_eq!(keys[0], (EnemyKind::Ufo, 3.0));
        assert_eq!(keys.len(), 3);
    }
}
