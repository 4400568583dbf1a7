// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod countdown;
pub mod diagnosis;
pub mod error;
pub mod history;
pub mod logging;
pub mod runtime;
pub mod stimulus;

pub use config::{ConfigStore, Difficulty, FileConfigStore, Settings};
pub use controller::{Phase, RoundController, RoundOutcome, RoundState, ROUNDS_PER_SESSION};
pub use diagnosis::{Diagnosis, SessionResult};
pub use error::ConfigError;
pub use stimulus::{SizePalette, Stimulus};
