/// Two-argument smoothed noise used to shape terrain.
///
/// Implementations must be pure: the same `(x, y)` always yields the same
/// value, and the value lies in `[0.0, 1.0]`.
pub trait NoiseSource: Send + Sync {
    /// Sample the noise at `(x, y)`.
    ///
    /// Terrain passes the scaled column coordinate as `x` and the chunk
    /// seed as `y`, so two seeds never produce the same profile.
    fn sample(&self, x: f64, y: f64) -> f64;

    /// Returns the name of this noise source for debugging.
    fn name(&self) -> &'static str {
        "NoiseSource"
    }
}
