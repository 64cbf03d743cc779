//! Best-score record
//!
//! A single scalar, persisted as JSON through a `KeyValueStore`.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, PersistError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub best: Option<u64>,
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "endless_runner_highscore";

    pub fn new() -> Self {
        Self { best: None }
    }

    /// A score is a new high score unless the stored one is strictly higher
    pub fn qualifies(&self, score: u64) -> bool {
        self.best.is_none_or(|best| score >= best)
    }

    /// Record `score` if it qualifies. Returns whether it did.
    pub fn submit(&mut self, score: u64) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = Some(score);
        true
    }

    pub fn load(store: &dyn KeyValueStore) -> Result<Self, PersistError> {
        match store.get(Self::STORAGE_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Self::new()),
        }
    }

    /// Load, falling back to an empty record on any failure
    pub fn load_or_default(store: &dyn KeyValueStore) -> Self {
        match Self::load(store) {
            Ok(score) => {
                log::info!("Loaded high score {:?}", score.best);
                score
            }
            Err(e) => {
                log::warn!("High score unreadable ({}), starting fresh", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("High score saved ({:?})", self.best);
        Ok(())
    }
}
