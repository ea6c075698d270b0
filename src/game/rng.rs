//! Randomness capability consumed by the engine.
//!
//! The engine never reaches for an ambient generator. Every session owns a
//! boxed [`ShellRng`], so production code plugs in [`ThreadShellRng`], replays
//! use [`SeededShellRng`], and tests script exact outcomes with [`ScriptedRng`].

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::shell::Shell;

pub trait ShellRng: Send {
    /// Uniform integer in `low..=high`.
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32;

    /// Fair coin.
    fn coin_flip(&mut self) -> bool;

    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Uniform permutation in place.
    fn shuffle(&mut self, shells: &mut [Shell]);
}

/// Unseeded generator backed by `rand::thread_rng()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadShellRng;

impl ShellRng for ThreadShellRng {
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        rand::thread_rng().gen_range(low..=high)
    }

    fn coin_flip(&mut self) -> bool {
        rand::thread_rng().gen_bool(0.5)
    }

    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn shuffle(&mut self, shells: &mut [Shell]) {
        shells.shuffle(&mut rand::thread_rng());
    }
}

/// Reproducible generator; the same seed replays the same game.
#[derive(Debug, Clone)]
pub struct SeededShellRng {
    inner: StdRng,
}

impl SeededShellRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl ShellRng for SeededShellRng {
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.inner.gen_range(low..=high)
    }

    fn coin_flip(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    fn shuffle(&mut self, shells: &mut [Shell]) {
        shells.shuffle(&mut self.inner);
    }
}

/// How [`ScriptedRng`] arranges a reload. Draws pop from the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleOrder {
    /// Every live shell is drawn before any blank.
    LiveFirst,
    /// Every blank is drawn before any live shell.
    BlankFirst,
}

/// Deterministic generator that replays scripted values, cycling when a
/// script runs out.
///
/// - live counts are returned in order for every reload (default `[1]`)
/// - coin flips are returned in order (default `[true]`, i.e. shoot self)
/// - picks are returned in order, wrapped into range (default `[0]`)
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    live_counts: Vec<u32>,
    live_idx: usize,
    coin_flips: Vec<bool>,
    coin_idx: usize,
    picks: Vec<usize>,
    pick_idx: usize,
    order: ShuffleOrder,
}

impl ScriptedRng {
    pub fn new(live_counts: Vec<u32>) -> Self {
        Self {
            live_counts: if live_counts.is_empty() {
                vec![1]
            } else {
                live_counts
            },
            live_idx: 0,
            coin_flips: vec![true],
            coin_idx: 0,
            picks: vec![0],
            pick_idx: 0,
            order: ShuffleOrder::LiveFirst,
        }
    }

    pub fn with_coin_flips(mut self, flips: Vec<bool>) -> Self {
        if !flips.is_empty() {
            self.coin_flips = flips;
            self.coin_idx = 0;
        }
        self
    }

    pub fn with_picks(mut self, picks: Vec<usize>) -> Self {
        if !picks.is_empty() {
            self.picks = picks;
            self.pick_idx = 0;
        }
        self
    }

    pub fn with_order(mut self, order: ShuffleOrder) -> Self {
        self.order = order;
        self
    }
}

fn cycle<T: Copy>(values: &[T], idx: &mut usize) -> T {
    let v = values[*idx % values.len()];
    *idx += 1;
    v
}

impl ShellRng for ScriptedRng {
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        cycle(&self.live_counts, &mut self.live_idx).clamp(low, high)
    }

    fn coin_flip(&mut self) -> bool {
        cycle(&self.coin_flips, &mut self.coin_idx)
    }

    fn pick(&mut self, len: usize) -> usize {
        cycle(&self.picks, &mut self.pick_idx) % len
    }

    fn shuffle(&mut self, shells: &mut [Shell]) {
        // Sort so the shells meant to come out first sit at the back.
        match self.order {
            ShuffleOrder::LiveFirst => shells.sort_by_key(|s| s.is_live()),
            ShuffleOrder::BlankFirst => shells.sort_by_key(|s| !s.is_live()),
        }
    }
}
