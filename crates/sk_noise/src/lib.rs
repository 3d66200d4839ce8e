use bevy::prelude::*;

pub mod height_field;
pub mod perlin;

pub use height_field::{HeightParams, HeightSource, NoiseHeightField, MIN_SMOOTHNESS};
pub use perlin::PerlinSource;

/// Noise plugin for Skirmish.
/// Height fields are pure values built per chunk; nothing to register.
pub struct SkNoisePlugin;

impl Plugin for SkNoisePlugin {
    fn build(&self, _app: &mut App) {}
}
