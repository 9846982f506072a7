//! Shared per-difficulty leaderboard
//!
//! The board itself is an append-and-query collaborator; ordering and
//! truncation for display happen here on the client side.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::{self, KeyValueStore, StorageError, keys};
use crate::sim::Difficulty;

/// Largest board the settings allow
pub const MAX_LEADERBOARD_SIZE: usize = 10;

/// Records kept per difficulty by `LocalLeaderboard`; the lowest score goes
/// first once a board is full
pub const MAX_STORED_PER_DIFFICULTY: usize = 100;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard backend failed: {0}")]
    Backend(String),
    #[error("leaderboard data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A single submitted run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// Unix timestamp (ms) when submitted
    pub timestamp: u64,
    pub difficulty: Difficulty,
}

/// Append-only score store, filterable by difficulty.
///
/// No ordering is promised by `query`; no deduplication on `submit`.
pub trait Leaderboard {
    fn submit(&mut self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError>;
    fn query(&self, difficulty: Difficulty) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

/// Leaderboard kept in a key-value store as one JSON list
#[derive(Debug, Clone, Default)]
pub struct LocalLeaderboard<S> {
    store: S,
}

impl<S: KeyValueStore> LocalLeaderboard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        match self.store.get(keys::LEADERBOARD) {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}

impl<S: KeyValueStore> Leaderboard for LocalLeaderboard<S> {
    fn submit(&mut self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
        let mut entries = self.all()?;
        entries.push(entry.clone());

        let stored = entries
            .iter()
            .filter(|e| e.difficulty == entry.difficulty)
            .count();
        if stored > MAX_STORED_PER_DIFFICULTY {
            // min_by_key picks the oldest of equal scores
            if let Some(lowest) = entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.difficulty == entry.difficulty)
                .min_by_key(|(_, e)| e.score)
                .map(|(i, _)| i)
            {
                entries.remove(lowest);
            }
        }

        persistence::save_json(&mut self.store, keys::LEADERBOARD, &entries)?;
        log::info!(
            "Submitted {} on {} for {}",
            entry.score,
            entry.difficulty.label(),
            entry.name
        );
        Ok(())
    }

    fn query(&self, difficulty: Difficulty) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| e.difficulty == difficulty)
            .collect())
    }
}

/// Sort descending by score and keep the best `n`
pub fn top_entries(mut entries: Vec<LeaderboardEntry>, n: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(n);
    entries
}

/// What the leaderboard panel for one difficulty should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardView {
    Entries(Vec<LeaderboardEntry>),
    Empty,
    Failed,
}

impl BoardView {
    /// Query the board and shape the result for display
    pub fn fetch(board: &dyn Leaderboard, difficulty: Difficulty, size: usize) -> Self {
        match board.query(difficulty) {
            Ok(entries) if entries.is_empty() => BoardView::Empty,
            Ok(entries) => BoardView::Entries(top_entries(entries, size)),
            Err(e) => {
                log::error!("[Leaderboard ERROR - {}] {e}", difficulty.label());
                BoardView::Failed
            }
        }
    }

    /// Text lines for the panel
    pub fn lines(&self, difficulty: Difficulty) -> Vec<String> {
        match self {
            BoardView::Entries(entries) => entries
                .iter()
                .map(|e| format!("{}: {}", e.name, e.score))
                .collect(),
            BoardView::Empty => vec![format!("No entries yet for {}", difficulty.label())],
            BoardView::Failed => vec![format!(
                "Error loading leaderboard for {}",
                difficulty.label()
            )],
        }
    }
}
