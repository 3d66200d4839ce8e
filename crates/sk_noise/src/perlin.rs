use noise::{NoiseFn, Perlin};
use sk_core::NoiseSource;

/// Permutation table seed. Variation between chunks comes from the sample
/// coordinate, not from reshuffling the table.
const PERMUTATION_SEED: u32 = 0;

/// Gradient noise remapped to `[0.0, 1.0]`.
#[derive(Clone)]
pub struct PerlinSource {
    noise: Perlin,
}

impl PerlinSource {
    pub fn new() -> Self {
        Self::with_permutation(PERMUTATION_SEED)
    }

    pub fn with_permutation(seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
        }
    }
}

impl Default for PerlinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSource for PerlinSource {
    fn sample(&self, x: f64, y: f64) -> f64 {
        // Perlin output is roughly [-1, 1].
        (self.noise.get([x, y]) * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    fn name(&self) -> &'static str {
        "Perlin"
    }
}
