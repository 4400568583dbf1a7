use crate::error::ConfigError;
use crate::stimulus::SizePalette;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Collected and persisted, but has no effect on stimuli or scoring yet.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub dark_mode: bool,
    pub difficulty: Difficulty,
    pub num_letters: usize,
    pub time_limit_secs: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            difficulty: Difficulty::Medium,
            num_letters: 5,
            time_limit_secs: 10,
        }
    }
}

impl Settings {
    /// Reject settings no session could run with.
    pub fn validate(&self, palette: &SizePalette) -> Result<(), ConfigError> {
        if self.num_letters == 0 {
            return Err(ConfigError::NoLetters);
        }
        if self.num_letters > palette.len() {
            return Err(ConfigError::TooManyLetters {
                requested: self.num_letters,
                available: palette.len(),
            });
        }
        if self.time_limit_secs == 0 {
            return Err(ConfigError::NonPositiveTimeLimit);
        }
        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "eyetest") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("eyetest_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Settings>(&bytes) {
                Ok(settings) => return settings,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), "ignoring unreadable config: {e}")
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), "cannot read config: {e}"),
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
