//! High score persistence.
//!
//! Scores are kept as a JSON array of [`ScoreRecord`]s. Every game gets a
//! record when it starts and that record is rewritten after each placement, so
//! a game that is quit midway still keeps its score. Without a path the store
//! lives in memory only.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};

use crate::types::{GameMode, ScoreRecord};

/// Handle to one record in a [`ScoreStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreId(usize);

#[derive(Debug, Clone, Default)]
pub struct ScoreStore {
    path: Option<PathBuf>,
    records: Vec<ScoreRecord>,
}

impl ScoreStore {
    /// Store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let records = match fs::read_to_string(path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("parse score file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("read score file {}", path.display()));
            }
        };
        tracing::debug!(path = %path.display(), records = records.len(), "score store opened");
        Ok(Self {
            path: Some(path.to_path_buf()),
            records,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// Add a record and persist.
    pub fn create(&mut self, record: ScoreRecord) -> Result<ScoreId> {
        self.records.push(record);
        self.save()?;
        Ok(ScoreId(self.records.len() - 1))
    }

    /// Replace a record and persist.
    pub fn update(&mut self, id: ScoreId, record: ScoreRecord) -> Result<()> {
        let slot = self
            .records
            .get_mut(id.0)
            .ok_or_else(|| anyhow!("unknown score id {}", id.0))?;
        if *slot == record {
            return Ok(());
        }
        *slot = record;
        self.save()
    }

    /// Highest score recorded for `mode`.
    pub fn best(&self, mode: GameMode) -> Option<u64> {
        self.records
            .iter()
            .filter(|r| r.mode == mode)
            .map(|r| r.score)
            .max()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("create score directory {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
        Ok(())
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
