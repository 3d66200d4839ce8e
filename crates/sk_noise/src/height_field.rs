use serde::{Deserialize, Serialize};
use sk_core::NoiseSource;

use crate::perlin::PerlinSource;

/// Smallest horizontal smoothness accepted; keeps `x / smoothness` finite.
pub const MIN_SMOOTHNESS: f64 = 1e-3;

/// Anything that maps a column index to a column height in cells.
pub trait HeightSource: Send + Sync {
    fn height_at(&self, x: i32) -> i32;
}

/// Shape parameters of the terrain profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightParams {
    /// Amplitude of the noise-driven part of the profile, in cells.
    pub base_height: i32,
    /// Flat offset added under every column, in cells.
    pub added_height: i32,
    /// Horizontal stretch; larger values give gentler slopes.
    pub smoothness: f64,
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            base_height: 40,
            added_height: 30,
            smoothness: 50.0,
        }
    }
}

/// Deterministic 1-D height profile.
///
/// `height_at(x) = round(base_height * noise(x / smoothness, seed)) + added_height`,
/// with halves rounded to even.
///
/// The seed is the second noise coordinate, so chunks built with different
/// seeds never repeat each other.
#[derive(Clone)]
pub struct NoiseHeightField<N: NoiseSource = PerlinSource> {
    source: N,
    seed: f64,
    params: HeightParams,
}

impl NoiseHeightField<PerlinSource> {
    pub fn new(seed: f64, params: HeightParams) -> Self {
        Self::with_source(PerlinSource::new(), seed, params)
    }
}

impl<N: NoiseSource> NoiseHeightField<N> {
    pub fn with_source(source: N, seed: f64, params: HeightParams) -> Self {
        let params = HeightParams {
            smoothness: params.smoothness.max(MIN_SMOOTHNESS),
            ..params
        };
        Self {
            source,
            seed,
            params,
        }
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn params(&self) -> &HeightParams {
        &self.params
    }

    /// Column height in cells, including the added-height offset.
    pub fn height_at(&self, x: i32) -> i32 {
        let n = self.source.sample(x as f64 / self.params.smoothness, self.seed);
        (self.params.base_height as f64 * n).round_ties_even() as i32 + self.params.added_height
    }

    /// Height range the profile can reach.
    pub fn bounds(&self) -> (i32, i32) {
        let lo = self.params.added_height + self.params.base_height.min(0);
        let hi = self.params.added_height + self.params.base_height.max(0);
        (lo, hi)
    }
}

impl<N: NoiseSource> HeightSource for NoiseHeightField<N> {
    fn height_at(&self, x: i32) -> i32 {
        NoiseHeightField::height_at(self, x)
    }
}
