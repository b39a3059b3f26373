use serde::Deserialize;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigLoadError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Yaml(err) => write!(f, "yaml error: {err}"),
            Self::Invalid(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl std::error::Error for ConfigLoadError {}

impl From<std::io::Error> for ConfigLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigLoadError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub screen_width: i32,
    pub screen_height: i32,
    pub max_sprites: usize,
    pub max_blockers: usize,
    pub max_projectiles: usize,
    pub max_blinkers: usize,
    /// Sprites with an x position past this are considered gone east.
    pub exit_east: i32,
    /// Gap between a walker's feet and the bottom of the screen.
    pub ground_margin: i32,
    /// Furthest east the hero may stand before the world scrolls instead.
    pub hero_midpoint_east: i32,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            screen_width: 480,
            screen_height: 272,
            max_sprites: 50,
            max_blockers: 5,
            max_projectiles: 5,
            max_blinkers: 5,
            exit_east: 485,
            ground_margin: 10,
            hero_midpoint_east: 200,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigLoadError> {
        let config: SimConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.max_sprites == 0 {
            return Err(ConfigLoadError::Invalid("max_sprites must be at least 1".into()));
        }
        if self.screen_width <= 0 || self.screen_height <= 0 {
            return Err(ConfigLoadError::Invalid(format!(
                "screen size {}x{} is not drawable",
                self.screen_width, self.screen_height
            )));
        }
        Ok(())
    }

    pub fn floor_for(&self, h: i32) -> i32 {
        self.screen_height - h - self.ground_margin
    }
}
