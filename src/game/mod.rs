//! # Turn engine
//!
//! The rules of the shell-chamber game, free of any I/O:
//!
//! - [`shell`]: shells, reload composition and the six-shell chamber
//! - [`rng`]: the randomness capability every session is built with
//! - [`session`]: participants, turn order, life and end-of-game detection
//! - [`outcome`]: what a single action did, with a printable summary
//! - [`score`]: the single-player end-of-game score
//!
//! Scores are only persisted through [`crate::scores`]; nothing in this module
//! touches the disk.

pub mod errors;
pub mod outcome;
pub mod rng;
pub mod score;
pub mod session;
pub mod shell;

pub use errors::GameError;
pub use outcome::{Action, RoundOutcome};
pub use rng::{ScriptedRng, SeededShellRng, ShellRng, ShuffleOrder, ThreadShellRng};
pub use session::{
    clamp_lives, clamp_player_count, Clamped, Configured, Controller, GameSession, Mode,
    Participant, Roster,
};
pub use shell::{Chamber, Composition, Draw, Shell};
