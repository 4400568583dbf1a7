use crate::config::{Difficulty, Settings};
use crate::diagnosis::{Diagnosis, SessionResult};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// One finished session, as stored in the results log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub date: DateTime<Local>,
    pub score: u32,
    pub percentage: f64,
    pub total_elapsed_secs: u64,
    pub num_letters: usize,
    pub time_limit_secs: u32,
    pub difficulty: Difficulty,
    pub diagnosis: Diagnosis,
}

impl SessionRecord {
    pub fn new(result: &SessionResult, settings: &Settings, date: DateTime<Local>) -> Self {
        Self {
            date,
            score: result.score,
            percentage: result.percentage,
            total_elapsed_secs: result.total_elapsed_secs,
            num_letters: settings.num_letters,
            time_limit_secs: settings.time_limit_secs,
            difficulty: settings.difficulty,
            diagnosis: result.diagnosis,
        }
    }
}

/// Append-only CSV log of finished sessions
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &SessionRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record).map_err(io::Error::other)?;
        writer.flush()
    }

    /// Reads every readable record; malformed rows are skipped.
    pub fn load(&self) -> io::Result<Vec<SessionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path).map_err(io::Error::other)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<SessionRecord>() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), "skipping bad history row: {e}")
                }
            }
        }
        Ok(records)
    }

    pub fn best_percentage(&self) -> io::Result<Option<f64>> {
        Ok(self
            .load()?
            .into_iter()
            .map(|r| r.percentage)
            .fold(None, |best: Option<f64>, p| {
                Some(best.map_or(p, |b| b.max(p)))
            }))
    }
}
