//! Round score history.
//!
//! The score-reporting sink for finished rounds: a small JSON file under
//! the user data directory, capped to the most recent rounds. A corrupt or
//! missing file starts a fresh history rather than failing; losing
//! arcade-score records is not worth an error.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// How many rounds we keep on disk.
pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub theme: String,
    pub score: u32,
    /// Unix timestamp (seconds).
    pub played_at: i64,
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    records: Vec<RoundRecord>,
}

impl HistoryStore {
    /// Open the default per-user history file, creating its directory.
    pub fn open() -> Result<Self> {
        let dir = dirs::data_dir()
            .context("could not determine user data directory")?
            .join("flappy-arcade");
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self::open_at(dir.join("history.json")))
    }

    pub fn open_at(path: PathBuf) -> Self {
        let records = fs::read_to_string(&path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        Self { path, records }
    }

    /// Record one finished round. Called exactly once per round end.
    pub fn record(&mut self, theme: &str, score: u32) -> Result<()> {
        self.records.insert(
            0,
            RoundRecord {
                theme: theme.to_string(),
                score,
                played_at: Utc::now().timestamp(),
            },
        );
        self.records.truncate(HISTORY_LIMIT);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    pub fn best(&self) -> u32 {
        self.records.iter().map(|r| r.score).max().unwrap_or(0)
    }

    pub fn best_for(&self, theme: &str) -> u32 {
        self.records
            .iter()
            .filter(|r| r.theme == theme)
            .map(|r| r.score)
            .max()
            .unwrap_or(0)
    }
}
