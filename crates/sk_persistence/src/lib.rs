use bevy::prelude::*;

pub mod config_io;

pub use config_io::{
    default_config_path, ensure_config_dir, load_config, load_or_default, save_config,
    ConfigIoError, CONFIG_DIR, DEFAULT_CONFIG_FILE,
};

/// Persistence plugin for Skirmish.
/// Loads the game config from RON before the first frame.
pub struct SkPersistencePlugin {
    pub path: std::path::PathBuf,
}

impl Default for SkPersistencePlugin {
    fn default() -> Self {
        Self {
            path: default_config_path(),
        }
    }
}

impl Plugin for SkPersistencePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(load_or_default(&self.path));
    }
}
