use bevy::log::{info, warn};
use sk_world::{ConfigError, GameConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Default directory for config files.
pub const CONFIG_DIR: &str = "assets/config";

/// Config file the host loads at startup.
pub const DEFAULT_CONFIG_FILE: &str = "skirmish.ron";

/// Error type for config I/O operations.
#[derive(Debug)]
pub enum ConfigIoError {
    Io(std::io::Error),
    Ron(ron::Error),
    RonSpanned(ron::error::SpannedError),
    Invalid(ConfigError),
}

impl From<std::io::Error> for ConfigIoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ron::Error> for ConfigIoError {
    fn from(err: ron::Error) -> Self {
        Self::Ron(err)
    }
}

impl From<ron::error::SpannedError> for ConfigIoError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonSpanned(err)
    }
}

impl From<ConfigError> for ConfigIoError {
    fn from(err: ConfigError) -> Self {
        Self::Invalid(err)
    }
}

impl std::fmt::Display for ConfigIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Ron(e) => write!(f, "RON serialization error: {}", e),
            Self::RonSpanned(e) => write!(f, "RON parse error: {}", e),
            Self::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigIoError {}

/// Save a game config to a RON file.
pub fn save_config(path: &Path, config: &GameConfig) -> Result<(), ConfigIoError> {
    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .struct_names(true);

    let ron_string = ron::ser::to_string_pretty(config, pretty_config)?;
    fs::write(path, ron_string)?;
    Ok(())
}

/// Load a game config from a RON file and validate it.
///
/// Missing fields take their default values.
pub fn load_config(path: &Path) -> Result<GameConfig, ConfigIoError> {
    let contents = fs::read_to_string(path)?;
    let config: GameConfig = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path`, falling back to defaults on any error.
pub fn load_or_default(path: &Path) -> GameConfig {
    match load_config(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(ConfigIoError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No config at {}, using defaults", path.display());
            GameConfig::default()
        }
        Err(e) => {
            warn!("Failed to load config from {}: {}; using defaults", path.display(), e);
            GameConfig::default()
        }
    }
}

/// Ensure the config directory exists.
pub fn ensure_config_dir() -> Result<(), std::io::Error> {
    fs::create_dir_all(CONFIG_DIR)
}

/// Path of the config file the host loads.
pub fn default_config_path() -> PathBuf {
    Path::new(CONFIG_DIR).join(DEFAULT_CONFIG_FILE)
}
