//! High-score bookkeeping between a finished game and whatever stores scores.
//!
//! The engine never holds a store; callers pass a [`ScoreStore`] to
//! [`record_if_best`] once a single-player game is terminal.

use log::{info, warn};
use std::collections::HashMap;

use crate::game::GameError;
use crate::logutil::escape_log;

/// Returned by a store asked to score a player it has no record of.
/// [`record_if_best`] reports it as a caller mistake, not as an outage.
#[derive(Debug, thiserror::Error)]
#[error("no account named {0}")]
pub struct UnknownPlayer(pub String);

fn store_error(e: anyhow::Error) -> GameError {
    match e.downcast_ref::<UnknownPlayer>() {
        Some(unknown) => GameError::InvalidOperation(unknown.to_string()),
        None => GameError::PersistenceUnavailable(e.to_string()),
    }
}

/// Score persistence keyed by player name.
#[allow(async_fn_in_trait)]
pub trait ScoreStore {
    /// Best score so far; 0 when the player has none.
    async fn high_score(&self, username: &str) -> anyhow::Result<u32>;

    /// Replace the stored score unconditionally. Fails with [`UnknownPlayer`]
    /// when the store keeps a fixed set of players and `username` is not one.
    async fn set_score(&mut self, username: &str, score: u32) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub score: u32,
    pub previous: u32,
    /// True when `score` beat `previous` and was written.
    pub stored: bool,
}

/// Store `score` only if it is strictly greater than the player's best.
pub async fn record_if_best<S: ScoreStore>(
    store: &mut S,
    username: &str,
    score: u32,
) -> Result<ScoreUpdate, GameError> {
    let previous = store.high_score(username).await.map_err(|e| {
        warn!("reading high score for {} failed: {}", escape_log(username), e);
        store_error(e)
    })?;
    if score <= previous {
        return Ok(ScoreUpdate {
            score,
            previous,
            stored: false,
        });
    }
    store.set_score(username, score).await.map_err(|e| {
        warn!("saving high score for {} failed: {}", escape_log(username), e);
        store_error(e)
    })?;
    info!(
        "new best for {}: {} (was {})",
        escape_log(username),
        score,
        previous
    );
    Ok(ScoreUpdate {
        score,
        previous,
        stored: true,
    })
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    scores: HashMap<String, u32>,
    unavailable: bool,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail, as a broken disk would.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn get(&self, username: &str) -> Option<u32> {
        self.scores.get(username).copied()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.unavailable {
            Err(anyhow::anyhow!("score store offline"))
        } else {
            Ok(())
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    async fn high_score(&self, username: &str) -> anyhow::Result<u32> {
        self.check()?;
        Ok(self.get(username).unwrap_or(0))
    }

    async fn set_score(&mut self, username: &str, score: u32) -> anyhow::Result<()> {
        self.check()?;
        self.scores.insert(username.to_string(), score);
        Ok(())
    }
}
