//! # Roulette - Turn-based Russian Roulette
//!
//! A party game played at the terminal. Participants take turns pulling the
//! trigger on a revolver loaded with a random mix of live and blank shells,
//! aiming either at themselves or at an opponent.
//!
//! ## Features
//!
//! - **One Engine, Two Modes**: single-player against a coin-flip dealer, or
//!   2–4 local players passing the keyboard around.
//! - **Six-Shell Chamber**: every reload loads 1–5 live shells and fills the
//!   rest with blanks, shuffled once.
//! - **Scoring**: single-player games score rounds survived times a bonus for
//!   finishing on few lives; the best score per account is kept.
//! - **Accounts**: Argon2id password hashes in per-user JSON files written
//!   atomically under a file lock.
//! - **Deterministic Testing**: randomness is injected through [`game::ShellRng`].
//!
//! ## Quick Start
//!
//! ```rust
//! use roulette::game::{Action, GameSession, ScriptedRng};
//!
//! let (mut game, _) = GameSession::single_player("alice", 1, Box::new(ScriptedRng::new(vec![1])));
//! let outcome = game.resolve_action(0, Action::ShootOpponent, None).unwrap();
//! assert!(outcome.terminal);
//! assert_eq!(game.winner(), Some(0));
//! assert_eq!(game.final_score(), Some(300));
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - the turn engine: chamber, sessions, outcomes, scoring
//! - [`scores`] - the high-score boundary between games and storage
//! - [`storage`] - account and score persistence
//! - [`console`] - the interactive menu loop
//! - [`config`] - TOML configuration
//! - [`validation`] - input validation and sanitization utilities
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    Console      │ ← menus, prompts, rendering
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Game Engine   │ ← pure rules, injected randomness
//! └─────────────────┘
//!          │  (terminal games only)
//! ┌─────────────────┐
//! │   Storage       │ ← accounts and high scores
//! └─────────────────┘
//! ```

pub mod config;
pub mod console;
pub mod game;
pub mod logutil;
pub mod metrics;
pub mod scores;
pub mod storage;
pub mod validation;
