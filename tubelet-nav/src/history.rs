//! Bounded recent-search list persisted as a JSON array of strings.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::NavError;

pub const HISTORY_FILE: &str = "search-history.json";
pub const DEFAULT_DEPTH: usize = 20;

#[derive(Debug, Clone)]
pub struct SearchHistory {
    path: PathBuf,
    depth: usize,
}

impl SearchHistory {
    /// Use `path` as backing file, creating its directory if needed.
    pub fn open(path: impl Into<PathBuf>, depth: usize) -> Result<Self, NavError> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
                tracing::debug!(dir=%dir.display(), "nav.history.created_dir");
            }
        }
        Ok(Self {
            path,
            depth: depth.max(1),
        })
    }

    pub fn in_profile(profile_dir: &Path, depth: usize) -> Result<Self, NavError> {
        Self::open(profile_dir.join(HISTORY_FILE), depth)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Stored queries, most recent first.
    pub fn queries(&self) -> Result<Vec<String>, NavError> {
        match std::fs::read(&self.path) {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Put `query` in front, dropping an older copy and anything past the depth.
    pub fn push(&self, query: &str) -> Result<(), NavError> {
        let mut queries = self.queries()?;
        queries.retain(|q| q != query);
        queries.insert(0, query.to_string());
        queries.truncate(self.depth);

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec(&queries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(len = queries.len(), "nav.history.push");
        Ok(())
    }
}
