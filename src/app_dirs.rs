use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("eyetest"))
        } else {
            ProjectDirs::from("", "", "eyetest")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn history_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("results.csv"))
            .unwrap_or_else(|| PathBuf::from("eyetest_results.csv"))
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("eyetest.log"))
            .unwrap_or_else(|| PathBuf::from("eyetest.log"))
    }
}
