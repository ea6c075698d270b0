//! Shells and the revolver chamber.
//!
//! A chamber holds one cycle of six shells. Every reload picks a live count
//! uniformly from 1..=5, fills the rest with blanks and shuffles once. Draws
//! pop from the back of the vector, so the shuffled order is the draw order.

use serde::{Deserialize, Serialize};

use super::rng::ShellRng;

/// Shells loaded per reload.
pub const CHAMBER_CAPACITY: u8 = 6;
/// Fewest live shells a reload may contain.
pub const MIN_LIVE: u8 = 1;
/// Most live shells a reload may contain.
pub const MAX_LIVE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shell {
    Live,
    Blank,
}

impl Shell {
    pub fn is_live(self) -> bool {
        matches!(self, Shell::Live)
    }
}

/// Live/blank split of a single reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub live: u8,
    pub blank: u8,
}

impl Composition {
    pub fn total(&self) -> u8 {
        self.live + self.blank
    }
}

/// Result of pulling the trigger once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub shell: Shell,
    /// Set when the chamber was empty and had to be reloaded before this draw.
    pub reloaded: Option<Composition>,
}

#[derive(Debug, Clone, Default)]
pub struct Chamber {
    shells: Vec<Shell>,
    last_reload: Option<Composition>,
}

impl Chamber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shells.len()
    }

    /// Live shells still waiting in the chamber.
    pub fn live_count(&self) -> usize {
        self.shells.iter().filter(|s| s.is_live()).count()
    }

    /// Blank shells still waiting in the chamber.
    pub fn blank_count(&self) -> usize {
        self.shells.len() - self.live_count()
    }

    /// Composition of the most recent reload, if any since the last clear.
    pub fn last_reload(&self) -> Option<Composition> {
        self.last_reload
    }

    /// Replace the chamber content with a freshly shuffled load of six shells.
    pub fn reload(&mut self, rng: &mut dyn ShellRng) -> Composition {
        let live = rng.range_inclusive(MIN_LIVE as u32, MAX_LIVE as u32) as u8;
        let live = live.clamp(MIN_LIVE, MAX_LIVE);
        let composition = Composition {
            live,
            blank: CHAMBER_CAPACITY - live,
        };

        self.shells.clear();
        self.shells
            .extend(std::iter::repeat(Shell::Live).take(composition.live as usize));
        self.shells
            .extend(std::iter::repeat(Shell::Blank).take(composition.blank as usize));
        rng.shuffle(&mut self.shells);
        self.last_reload = Some(composition);
        composition
    }

    /// Draw the next shell, reloading first when the chamber is empty.
    pub fn draw(&mut self, rng: &mut dyn ShellRng) -> Draw {
        if let Some(shell) = self.shells.pop() {
            return Draw {
                shell,
                reloaded: None,
            };
        }
        let composition = self.reload(rng);
        // A reload holds at least MIN_LIVE live shells.
        let shell = self.shells.pop().unwrap_or(Shell::Live);
        Draw {
            shell,
            reloaded: Some(composition),
        }
    }

    /// Drop all remaining shells and forget the last reload.
    pub fn clear(&mut self) {
        self.shells.clear();
        self.last_reload = None;
    }
}
