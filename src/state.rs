use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Watermark for the last successfully processed channel message.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingState {
    pub last_seen_id: i64,
}

/// JSON-file-backed watermark store.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the stored state, creating a zeroed file when missing and
    /// resetting to zero (rewriting the file) when the contents do not
    /// parse.
    pub fn read(&self) -> anyhow::Result<ProcessingState> {
        if !self.path.exists() {
            log::info!("creating state file at {}", self.path.display());
            let state = ProcessingState::default();
            self.write(&state)?;
            return Ok(state);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Reading {}", self.path.display()))?;
        match serde_json::from_str(&raw) {
            Ok(state) => Ok(state),
            Err(err) => {
                log::warn!(
                    "state file {} is corrupted ({}); resetting to defaults",
                    self.path.display(),
                    err
                );
                let state = ProcessingState::default();
                self.write(&state)?;
                Ok(state)
            }
        }
    }

    /// Advances the watermark. A candidate id that is not strictly greater
    /// than the stored one is a no-op; in dry-run mode the advanced state is
    /// returned without being persisted.
    pub fn update_last_seen(
        &self,
        message_id: i64,
        dry_run: bool,
    ) -> anyhow::Result<ProcessingState> {
        let state = self.read()?;
        if message_id <= state.last_seen_id {
            return Ok(state);
        }

        let updated = ProcessingState {
            last_seen_id: message_id,
        };

        if dry_run {
            log::info!(
                "dry run: not persisting last_seen_id {} (stored: {})",
                message_id,
                state.last_seen_id
            );
            return Ok(updated);
        }

        self.write(&updated)?;
        log::info!("advanced last_seen_id to {}", message_id);
        Ok(updated)
    }

    /// Rewrites the backing file atomically via a sibling temp file.
    fn write(&self, state: &ProcessingState) -> anyhow::Result<()> {
        let serialized = serde_json::to_string(state).context("Serializing state")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &serialized).with_context(|| format!("Writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Replacing {}", self.path.display()))?;
        Ok(())
    }
}
