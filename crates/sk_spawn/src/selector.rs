use rand::Rng;
use sk_core::SubtypeKey;
use std::fmt;

/// Rejected weight table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectorError {
    /// Weights sum to zero (or the table is empty).
    InvalidWeights { total: f64 },
    /// A weight is negative, NaN or infinite.
    BadWeight { index: usize, weight: f32 },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWeights { total } => {
                write!(f, "weights must sum to a positive value (got {})", total)
            }
            Self::BadWeight { index, weight } => {
                write!(f, "weight #{} is not a non-negative number: {}", index, weight)
            }
        }
    }
}

impl std::error::Error for SelectorError {}

/// Draws keys with probability proportional to their weight.
#[derive(Debug, Clone)]
pub struct WeightedSelector<K: SubtypeKey> {
    keys: Vec<K>,
    /// Running totals; `prefix[i]` is the sum of weights `0..=i`.
    prefix: Vec<f64>,
}

impl<K: SubtypeKey> Default for WeightedSelector<K> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            prefix: Vec::new(),
        }
    }
}

impl<K: SubtypeKey> WeightedSelector<K> {
    pub fn new(weights: &[(K, f32)]) -> Result<Self, SelectorError> {
        let mut selector = Self::default();
        selector.configure(weights)?;
        Ok(selector)
    }

    /// Replace the whole table. On error the previous table is kept.
    pub fn configure(&mut self, weights: &[(K, f32)]) -> Result<(), SelectorError> {
        let mut keys = Vec::with_capacity(weights.len());
        let mut prefix = Vec::with_capacity(weights.len());
        let mut total = 0.0f64;

        for (index, &(key, weight)) in weights.iter().enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SelectorError::BadWeight { index, weight });
            }
            if weight == 0.0 {
                continue;
            }
            total += weight as f64;
            keys.push(key);
            prefix.push(total);
        }

        if total <= 0.0 {
            return Err(SelectorError::InvalidWeights { total });
        }

        self.keys = keys;
        self.prefix = prefix;
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys with a non-zero weight, in configuration order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Probability of drawing `key`.
    pub fn probability(&self, key: K) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        let mut previous = 0.0;
        let mut weight = 0.0;
        for (k, &running) in self.keys.iter().zip(&self.prefix) {
            if *k == key {
                weight += running - previous;
            }
            previous = running;
        }
        weight / total
    }

    /// Draw one key, or `None` while no table is configured.
    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<K> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        let draw = rng.gen_range(0.0..total);
        let index = self.prefix.partition_point(|&running| running <= draw);
        self.keys.get(index.min(self.keys.len() - 1)).copied()
    }
}
