//! In-process game counters.
//! Per-mode entry/exit tracking plus global round and reload totals.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

static ROUNDS_RESOLVED: AtomicU64 = AtomicU64::new(0);
static RELOADS: AtomicU64 = AtomicU64::new(0);
static LIVE_HITS: AtomicU64 = AtomicU64::new(0);

static GAME_COUNTERS: OnceLock<Mutex<HashMap<String, GameCounter>>> = OnceLock::new();

pub fn inc_rounds_resolved() {
    ROUNDS_RESOLVED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_reloads() {
    RELOADS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_live_hits() {
    LIVE_HITS.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameCounter {
    pub entries: u64,
    pub exits: u64,
    pub currently_active: u64,
    pub concurrent_peak: u64,
}

fn game_counters() -> MutexGuard<'static, HashMap<String, GameCounter>> {
    GAME_COUNTERS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Record that a game in `mode` started (or restarted after a continue).
pub fn record_game_entry(mode: &str) -> GameCounter {
    let mut guard = game_counters();
    let counter = guard.entry(mode.to_string()).or_default();
    counter.entries = counter.entries.saturating_add(1);
    counter.currently_active = counter.currently_active.saturating_add(1);
    if counter.currently_active > counter.concurrent_peak {
        counter.concurrent_peak = counter.currently_active;
    }
    *counter
}

/// Record that a game in `mode` reached a terminal state.
pub fn record_game_exit(mode: &str) -> GameCounter {
    let mut guard = game_counters();
    let counter = guard.entry(mode.to_string()).or_default();
    counter.exits = counter.exits.saturating_add(1);
    if counter.currently_active > 0 {
        counter.currently_active -= 1;
    }
    *counter
}

pub fn game_counters_snapshot() -> HashMap<String, GameCounter> {
    game_counters().clone()
}

#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub rounds_resolved: u64,
    pub reloads: u64,
    pub live_hits: u64,
    pub games: HashMap<String, GameCounter>,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        rounds_resolved: ROUNDS_RESOLVED.load(Ordering::Relaxed),
        reloads: RELOADS.load(Ordering::Relaxed),
        live_hits: LIVE_HITS.load(Ordering::Relaxed),
        games: game_counters_snapshot(),
    }
}
