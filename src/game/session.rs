//! # Game Session
//!
//! One [`GameSession`] is one game: its participants, their life totals, the
//! chamber and whose turn it is. Both play modes run on this single engine:
//!
//! - **Single-player**: the human participant at index 0 against a dealer at
//!   index 1 whose moves come from a coin flip ([`Controller::CoinFlip`]).
//! - **Multiplayer**: 2–4 human participants, every move supplied by the caller.
//!
//! ## Turn rules
//!
//! - Shooting yourself keeps the turn, live or blank.
//! - Shooting an opponent passes the turn to the next active participant after
//!   the actor, wrapping and skipping anyone at zero life.
//! - A participant eliminated by their own shot cannot keep the turn; it passes
//!   as if they had shot an opponent.
//!
//! The session is terminal once at most one participant is still active. It
//! stays terminal until [`GameSession::reset`] or [`GameSession::continue_game`].
//!
//! ```
//! use roulette::game::{Action, GameSession, Roster, ScriptedRng};
//!
//! let roster = Roster::SinglePlayer { player: "alice".into(), dealer: "Dealer".into() };
//! let (mut game, _) = GameSession::configure(roster, 3, Box::new(ScriptedRng::new(vec![1])));
//! let outcome = game.resolve_action(0, Action::ShootSelf, None).unwrap();
//! assert_eq!(game.life_of(0), Some(2));
//! assert_eq!(outcome.next_turn, 0);
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::GameError;
use super::outcome::{Action, RoundOutcome};
use super::rng::ShellRng;
use super::score;
use super::shell::{Chamber, Composition, Shell};
use crate::logutil::escape_log;
use crate::metrics;
use crate::validation::sanitize_participant_name;

pub const MIN_LIFE: u8 = 1;
pub const MAX_LIFE: u8 = 5;
/// Life used when the requested value is out of range.
pub const DEFAULT_LIFE: u8 = 1;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
/// Participant count used when the requested count is out of range.
pub const DEFAULT_PLAYERS: usize = 2;

/// A configuration value after range checking. Out-of-range requests are
/// replaced by a default rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped<T> {
    pub requested: i64,
    pub effective: T,
    pub clamped: bool,
}

pub fn clamp_lives(requested: i64) -> Clamped<u8> {
    if (MIN_LIFE as i64..=MAX_LIFE as i64).contains(&requested) {
        Clamped {
            requested,
            effective: requested as u8,
            clamped: false,
        }
    } else {
        Clamped {
            requested,
            effective: DEFAULT_LIFE,
            clamped: true,
        }
    }
}

pub fn clamp_player_count(requested: i64) -> Clamped<usize> {
    if (MIN_PLAYERS as i64..=MAX_PLAYERS as i64).contains(&requested) {
        Clamped {
            requested,
            effective: requested as usize,
            clamped: false,
        }
    } else {
        Clamped {
            requested,
            effective: DEFAULT_PLAYERS,
            clamped: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    SinglePlayer,
    Multiplayer,
}

impl Mode {
    pub fn slug(self) -> &'static str {
        match self {
            Mode::SinglePlayer => "singleplayer",
            Mode::Multiplayer => "multiplayer",
        }
    }
}

/// Who decides a participant's moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    /// Moves are supplied by the caller.
    Human,
    /// Moves come from a fair coin: heads shoots self, tails shoots an opponent.
    CoinFlip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub name: String,
    pub life: u8,
    pub controller: Controller,
}

impl Participant {
    fn new(name: String, life: u8, controller: Controller) -> Self {
        Participant {
            name,
            life,
            controller,
        }
    }

    pub fn is_active(&self) -> bool {
        self.life > 0
    }
}

/// Who sits at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Roster {
    SinglePlayer { player: String, dealer: String },
    /// Names in turn order. Blank names become `Player N`.
    Multiplayer(Vec<String>),
}

/// Effective configuration reported back from [`GameSession::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configured {
    pub lives: Clamped<u8>,
    pub players: Clamped<usize>,
}

pub struct GameSession {
    id: Uuid,
    mode: Mode,
    participants: Vec<Participant>,
    initial_life: u8,
    chamber: Chamber,
    rng: Box<dyn ShellRng>,
    turn: usize,
    round: u32,
    terminal: bool,
    winner: Option<usize>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("participants", &self.participants)
            .field("turn", &self.turn)
            .field("round", &self.round)
            .field("chamber_len", &self.chamber.len())
            .field("terminal", &self.terminal)
            .field("winner", &self.winner)
            .finish()
    }
}

// A session dropped mid-game still leaves the active count.
impl Drop for GameSession {
    fn drop(&mut self) {
        if !self.terminal {
            metrics::record_game_exit(self.mode.slug());
            debug!("game {} abandoned", self.id);
        }
    }
}

fn display_name(raw: &str, fallback: String) -> String {
    let cleaned = sanitize_participant_name(raw);
    if cleaned.is_empty() {
        fallback
    } else {
        cleaned
    }
}

impl GameSession {
    /// Seat the roster with `requested_life` lives each.
    ///
    /// Out-of-range lives fall back to [`DEFAULT_LIFE`]; a multiplayer roster
    /// outside 2..=4 names falls back to [`DEFAULT_PLAYERS`] seats (extra names
    /// are dropped, missing seats get `Player N`).
    pub fn configure(
        roster: Roster,
        requested_life: i64,
        rng: Box<dyn ShellRng>,
    ) -> (Self, Configured) {
        let lives = clamp_lives(requested_life);
        let (mode, participants, players) = match roster {
            Roster::SinglePlayer { player, dealer } => {
                let participants = vec![
                    Participant::new(
                        display_name(&player, "Player".to_string()),
                        lives.effective,
                        Controller::Human,
                    ),
                    Participant::new(
                        display_name(&dealer, "Dealer".to_string()),
                        lives.effective,
                        Controller::CoinFlip,
                    ),
                ];
                let players = Clamped {
                    requested: 2,
                    effective: 2,
                    clamped: false,
                };
                (Mode::SinglePlayer, participants, players)
            }
            Roster::Multiplayer(names) => {
                let players = clamp_player_count(names.len() as i64);
                let participants = (0..players.effective)
                    .map(|i| {
                        let fallback = format!("Player {}", i + 1);
                        let name = match names.get(i) {
                            Some(raw) => display_name(raw, fallback),
                            None => fallback,
                        };
                        Participant::new(name, lives.effective, Controller::Human)
                    })
                    .collect();
                (Mode::Multiplayer, participants, players)
            }
        };

        if lives.clamped {
            warn!(
                "requested {} lives is out of range {}..={}, using {}",
                lives.requested, MIN_LIFE, MAX_LIFE, lives.effective
            );
        }
        if players.clamped {
            warn!(
                "requested {} players is out of range {}..={}, using {}",
                players.requested, MIN_PLAYERS, MAX_PLAYERS, players.effective
            );
        }

        let session = GameSession {
            id: Uuid::new_v4(),
            mode,
            participants,
            initial_life: lives.effective,
            chamber: Chamber::new(),
            rng,
            turn: 0,
            round: 0,
            terminal: false,
            winner: None,
        };
        metrics::record_game_entry(mode.slug());
        info!(
            "game {} started: {} [{}] with {} lives",
            session.id,
            mode.slug(),
            session
                .participants
                .iter()
                .map(|p| escape_log(&p.name))
                .collect::<Vec<_>>()
                .join(", "),
            session.initial_life
        );
        (session, Configured { lives, players })
    }

    /// Human `player` against a coin-flip dealer named `Dealer`.
    pub fn single_player(
        player: &str,
        requested_life: i64,
        rng: Box<dyn ShellRng>,
    ) -> (Self, Configured) {
        let roster = Roster::SinglePlayer {
            player: player.to_string(),
            dealer: "Dealer".to_string(),
        };
        Self::configure(roster, requested_life, rng)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, index: usize) -> Option<&Participant> {
        self.participants.get(index)
    }

    pub fn initial_life(&self) -> u8 {
        self.initial_life
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn current_turn(&self) -> usize {
        self.turn
    }

    pub fn life_of(&self, index: usize) -> Option<u8> {
        self.participants.get(index).map(|p| p.life)
    }

    /// Rounds the human has started in single-player mode; always 0 in multiplayer.
    pub fn round_number(&self) -> u32 {
        self.round
    }

    /// Live shells left in the chamber.
    pub fn chamber_live_count(&self) -> usize {
        self.chamber.live_count()
    }

    /// Blank shells left in the chamber.
    pub fn chamber_blank_count(&self) -> usize {
        self.chamber.blank_count()
    }

    /// Composition of the latest reload in this game.
    pub fn last_reload(&self) -> Option<Composition> {
        self.chamber.last_reload()
    }

    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub fn active_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_active()).count()
    }

    /// Active participants other than `actor`, in seat order.
    pub fn opponents_of(&self, actor: usize) -> Vec<usize> {
        self.participants
            .iter()
            .enumerate()
            .filter(|(i, p)| *i != actor && p.is_active())
            .map(|(i, _)| i)
            .collect()
    }

    /// True when the participant to move is driven by a coin flip.
    pub fn scripted_turn_pending(&self) -> bool {
        !self.terminal && self.participants[self.turn].controller == Controller::CoinFlip
    }

    /// Score for a finished single-player game; `None` while playing or in multiplayer.
    pub fn final_score(&self) -> Option<u32> {
        if self.mode == Mode::SinglePlayer && self.terminal {
            Some(score::score(self.round, self.participants[0].life))
        } else {
            None
        }
    }

    /// True once the participant in seat 0 (the session owner) has been eliminated.
    pub fn owner_eliminated(&self) -> bool {
        !self.participants[0].is_active()
    }

    /// Resolve one trigger pull by `actor`.
    ///
    /// `target` is only read for [`Action::ShootOpponent`]; when omitted and
    /// exactly one opponent is active, that opponent is the target.
    pub fn resolve_action(
        &mut self,
        actor: usize,
        action: Action,
        target: Option<usize>,
    ) -> Result<RoundOutcome, GameError> {
        if self.terminal {
            return Err(GameError::invalid("game already over"));
        }
        let Some(actor_p) = self.participants.get(actor) else {
            return Err(GameError::invalid(format!("no participant at seat {}", actor)));
        };
        if !actor_p.is_active() {
            return Err(GameError::invalid(format!(
                "{} is out of the game",
                actor_p.name
            )));
        }
        if actor != self.turn {
            return Err(GameError::invalid(format!(
                "it is not {}'s turn",
                actor_p.name
            )));
        }

        let affected = match action {
            Action::ShootSelf => actor,
            Action::ShootOpponent => self.resolve_target(actor, target)?,
        };

        let starts_round =
            self.mode == Mode::SinglePlayer && actor_p.controller == Controller::Human;
        if starts_round {
            self.round = self.round.saturating_add(1);
        }

        let draw = self.chamber.draw(self.rng.as_mut());
        if let Some(c) = draw.reloaded {
            metrics::inc_reloads();
            debug!(
                "game {} reloaded: {} live, {} blank",
                self.id, c.live, c.blank
            );
        }

        let target_p = &mut self.participants[affected];
        let life_before = target_p.life;
        if draw.shell == Shell::Live {
            target_p.life = target_p.life.saturating_sub(1);
            metrics::inc_live_hits();
        }
        let life_after = target_p.life;
        let eliminated = life_before > 0 && life_after == 0;

        let actor_still_active = self.participants[actor].is_active();
        let turn_passed = action == Action::ShootOpponent || !actor_still_active;
        if turn_passed {
            self.turn = self.next_active_after(actor);
        }

        self.check_game_over();
        metrics::inc_rounds_resolved();

        let outcome = RoundOutcome {
            round: if starts_round { self.round } else { 0 },
            actor,
            actor_name: self.participants[actor].name.clone(),
            action,
            affected,
            affected_name: self.participants[affected].name.clone(),
            shell: draw.shell,
            life_delta: if life_after < life_before { -1 } else { 0 },
            life_after,
            eliminated,
            reload: draw.reloaded,
            turn_passed,
            next_turn: self.turn,
            next_name: self.participants[self.turn].name.clone(),
            terminal: self.terminal,
            winner: self.winner,
            winner_name: self.winner.map(|w| self.participants[w].name.clone()),
        };
        debug!(
            "game {} round: {} {:?} -> {} {:?} (life {}), next {}",
            self.id,
            escape_log(&outcome.actor_name),
            action,
            escape_log(&outcome.affected_name),
            draw.shell,
            life_after,
            escape_log(&outcome.next_name)
        );
        Ok(outcome)
    }

    /// Play the current participant's move with a coin flip. Only valid when
    /// that participant is [`Controller::CoinFlip`].
    pub fn play_scripted_turn(&mut self) -> Result<RoundOutcome, GameError> {
        if self.terminal {
            return Err(GameError::invalid("game already over"));
        }
        let actor = self.turn;
        if self.participants[actor].controller != Controller::CoinFlip {
            return Err(GameError::invalid(format!(
                "{} moves by player input",
                self.participants[actor].name
            )));
        }
        if self.rng.coin_flip() {
            self.resolve_action(actor, Action::ShootSelf, None)
        } else {
            let opponents = self.opponents_of(actor);
            if opponents.is_empty() {
                return Err(GameError::invalid("no opponent left to shoot"));
            }
            let target = opponents[self.rng.pick(opponents.len())];
            self.resolve_action(actor, Action::ShootOpponent, Some(target))
        }
    }

    /// Start a fresh game with the same participants.
    pub fn reset(&mut self) {
        if !self.terminal {
            metrics::record_game_exit(self.mode.slug());
        }
        self.restart();
        info!("game {} reset", self.id);
    }

    /// Keep playing after a won game: lives back to the configured value,
    /// chamber emptied, round counter back to zero.
    ///
    /// Refused while the game is still running and after the session owner
    /// (seat 0) has been eliminated, which is a final loss.
    pub fn continue_game(&mut self) -> Result<(), GameError> {
        if !self.terminal {
            return Err(GameError::invalid("game still in progress"));
        }
        if self.owner_eliminated() {
            return Err(GameError::invalid(format!(
                "{} lost all lives; the game cannot be continued",
                self.participants[0].name
            )));
        }
        self.restart();
        info!("game {} continued", self.id);
        Ok(())
    }

    fn restart(&mut self) {
        for p in &mut self.participants {
            p.life = self.initial_life;
        }
        self.chamber.clear();
        self.turn = 0;
        self.round = 0;
        self.terminal = false;
        self.winner = None;
        metrics::record_game_entry(self.mode.slug());
    }

    fn resolve_target(&self, actor: usize, target: Option<usize>) -> Result<usize, GameError> {
        let opponents = self.opponents_of(actor);
        if opponents.is_empty() {
            return Err(GameError::invalid("no opponent left to shoot"));
        }
        match target {
            Some(t) if t == actor => Err(GameError::invalid(
                "cannot target yourself with a shot at an opponent",
            )),
            Some(t) => match self.participants.get(t) {
                None => Err(GameError::invalid(format!("no participant at seat {}", t))),
                Some(p) if !p.is_active() => {
                    Err(GameError::invalid(format!("{} is out of the game", p.name)))
                }
                Some(_) => Ok(t),
            },
            None if opponents.len() == 1 => Ok(opponents[0]),
            None => Err(GameError::invalid("choose which opponent to shoot")),
        }
    }

    fn next_active_after(&self, from: usize) -> usize {
        let n = self.participants.len();
        (1..=n)
            .map(|step| (from + step) % n)
            .find(|&i| self.participants[i].is_active())
            .unwrap_or(from)
    }

    fn check_game_over(&mut self) {
        if self.terminal || self.active_count() > 1 {
            return;
        }
        self.terminal = true;
        // First participant at the highest life among everyone, eliminated or not.
        let best = self.participants.iter().map(|p| p.life).max().unwrap_or(0);
        self.winner = self.participants.iter().position(|p| p.life == best);
        metrics::record_game_exit(self.mode.slug());
        let winner_name = self
            .winner
            .map(|w| escape_log(&self.participants[w].name))
            .unwrap_or_default();
        info!(
            "game {} over after round {}: winner {}",
            self.id, self.round, winner_name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rng::{ScriptedRng, SeededShellRng, ShuffleOrder};

    fn single(lives: i64, rng: ScriptedRng) -> GameSession {
        let roster = Roster::SinglePlayer {
            player: "alice".into(),
            dealer: "Dealer".into(),
        };
        GameSession::configure(roster, lives, Box::new(rng)).0
    }

    fn multi(names: &[&str], lives: i64, rng: ScriptedRng) -> GameSession {
        let roster = Roster::Multiplayer(names.iter().map(|s| s.to_string()).collect());
        GameSession::configure(roster, lives, Box::new(rng)).0
    }

    #[test]
    fn clamps_report_effective_values() {
        assert_eq!(clamp_lives(3).effective, 3);
        assert!(!clamp_lives(5).clamped);
        let low = clamp_lives(0);
        assert!(low.clamped);
        assert_eq!(low.effective, DEFAULT_LIFE);
        assert_eq!(clamp_lives(-4).effective, DEFAULT_LIFE);
        assert_eq!(clamp_lives(6).effective, DEFAULT_LIFE);

        assert_eq!(clamp_player_count(4).effective, 4);
        let one = clamp_player_count(1);
        assert!(one.clamped);
        assert_eq!(one.effective, DEFAULT_PLAYERS);
        assert_eq!(clamp_player_count(9).effective, DEFAULT_PLAYERS);
    }

    #[test]
    fn configure_single_player_seats_player_and_dealer() {
        let roster = Roster::SinglePlayer {
            player: "alice".into(),
            dealer: "".into(),
        };
        let (game, cfg) = GameSession::configure(roster, 9, Box::new(ScriptedRng::new(vec![1])));
        assert!(cfg.lives.clamped);
        assert_eq!(cfg.lives.effective, 1);
        assert_eq!(game.mode(), Mode::SinglePlayer);
        assert_eq!(game.participants().len(), 2);
        assert_eq!(game.participant(1).map(|p| p.name.as_str()), Some("Dealer"));
        assert_eq!(game.participant(1).map(|p| p.controller), Some(Controller::CoinFlip));
        assert_eq!(game.life_of(0), Some(1));
        assert_eq!(game.current_turn(), 0);
        assert_eq!(game.round_number(), 0);
        assert!(!game.is_terminal());
    }

    #[test]
    fn configure_multiplayer_clamps_seat_count() {
        let (game, cfg) = GameSession::configure(
            Roster::Multiplayer(vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()]),
            2,
            Box::new(ScriptedRng::new(vec![1])),
        );
        assert!(cfg.players.clamped);
        assert_eq!(cfg.players.effective, 2);
        let names: Vec<_> = game.participants().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let (game, _) = GameSession::configure(
            Roster::Multiplayer(vec!["solo".into()]),
            2,
            Box::new(ScriptedRng::new(vec![1])),
        );
        let names: Vec<_> = game.participants().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["solo", "Player 2"]);
    }

    #[test]
    fn blank_names_get_seat_numbers() {
        let game = multi(&["ann", "  ", "cid"], 2, ScriptedRng::new(vec![1]));
        assert_eq!(game.participant(1).map(|p| p.name.as_str()), Some("Player 2"));
    }

    #[test]
    fn live_self_shot_costs_a_life_and_keeps_turn() {
        let mut game = single(3, ScriptedRng::new(vec![1]));
        let out = game.resolve_action(0, Action::ShootSelf, None).unwrap();
        assert_eq!(out.shell, Shell::Live);
        assert_eq!(out.reload, Some(Composition { live: 1, blank: 5 }));
        assert_eq!(game.life_of(0), Some(2));
        assert_eq!(game.life_of(1), Some(3));
        assert_eq!(game.current_turn(), 0);
        assert!(!out.turn_passed);
        assert!(!game.is_terminal());
        assert_eq!(game.round_number(), 1);
    }

    #[test]
    fn self_shots_never_move_the_turn() {
        let mut game = single(5, ScriptedRng::new(vec![2]).with_order(ShuffleOrder::BlankFirst));
        for _ in 0..4 {
            let out = game.resolve_action(0, Action::ShootSelf, None).unwrap();
            assert_eq!(out.shell, Shell::Blank);
            assert_eq!(game.current_turn(), 0);
        }
        let out = game.resolve_action(0, Action::ShootSelf, None).unwrap();
        assert_eq!(out.shell, Shell::Live);
        assert_eq!(game.current_turn(), 0);
        assert_eq!(game.life_of(0), Some(4));
    }

    #[test]
    fn shooting_the_dealer_on_last_life_wins() {
        let mut game = single(1, ScriptedRng::new(vec![1]));
        let out = game.resolve_action(0, Action::ShootOpponent, None).unwrap();
        assert_eq!(out.affected, 1);
        assert!(out.eliminated);
        assert_eq!(game.life_of(1), Some(0));
        assert!(game.is_terminal());
        assert_eq!(game.winner(), Some(0));
        assert_eq!(out.winner_name.as_deref(), Some("alice"));
        assert_eq!(game.final_score(), Some(300));
    }

    #[test]
    fn blank_at_opponent_still_passes_turn() {
        let mut game = single(2, ScriptedRng::new(vec![1]).with_order(ShuffleOrder::BlankFirst));
        let out = game.resolve_action(0, Action::ShootOpponent, Some(1)).unwrap();
        assert_eq!(out.shell, Shell::Blank);
        assert!(out.turn_passed);
        assert_eq!(game.current_turn(), 1);
        assert!(game.scripted_turn_pending());
    }

    #[test]
    fn terminal_session_rejects_actions_without_mutation() {
        let mut game = single(1, ScriptedRng::new(vec![1]));
        game.resolve_action(0, Action::ShootSelf, None).unwrap();
        assert!(game.is_terminal());
        assert_eq!(game.winner(), Some(1));
        let before = (game.life_of(0), game.life_of(1), game.round_number(), game.chamber_live_count());
        let err = game.resolve_action(0, Action::ShootSelf, None).unwrap_err();
        assert!(matches!(err, GameError::InvalidOperation(_)));
        assert!(game.play_scripted_turn().is_err());
        let after = (game.life_of(0), game.life_of(1), game.round_number(), game.chamber_live_count());
        assert_eq!(before, after);
        assert!(game.is_terminal());
    }

    #[test]
    fn rejects_out_of_turn_and_bad_targets() {
        let mut game = multi(&["a", "b", "c"], 2, ScriptedRng::new(vec![1]));
        assert!(game.resolve_action(1, Action::ShootSelf, None).is_err());
        assert!(game.resolve_action(7, Action::ShootSelf, None).is_err());
        assert!(game.resolve_action(0, Action::ShootOpponent, Some(0)).is_err());
        assert!(game.resolve_action(0, Action::ShootOpponent, Some(9)).is_err());
        // Two opponents: the target must be named.
        assert!(game.resolve_action(0, Action::ShootOpponent, None).is_err());
        assert_eq!(game.round_number(), 0);
        assert!(game.chamber_live_count() + game.chamber_blank_count() == 0);
    }

    #[test]
    fn human_seat_cannot_use_coin_flip() {
        let mut game = single(3, ScriptedRng::new(vec![1]));
        assert!(game.play_scripted_turn().is_err());
    }

    #[test]
    fn dealer_coin_flip_heads_shoots_self() {
        let rng = ScriptedRng::new(vec![1])
            .with_order(ShuffleOrder::BlankFirst)
            .with_coin_flips(vec![true]);
        let mut game = single(3, rng);
        game.resolve_action(0, Action::ShootOpponent, None).unwrap();
        let out = game.play_scripted_turn().unwrap();
        assert_eq!(out.actor, 1);
        assert_eq!(out.action, Action::ShootSelf);
        assert_eq!(out.round, 0);
        assert_eq!(game.current_turn(), 1);
        assert_eq!(game.round_number(), 1);
    }

    #[test]
    fn dealer_coin_flip_tails_shoots_player() {
        let rng = ScriptedRng::new(vec![1])
            .with_order(ShuffleOrder::BlankFirst)
            .with_coin_flips(vec![false]);
        let mut game = single(3, rng);
        game.resolve_action(0, Action::ShootOpponent, None).unwrap();
        let out = game.play_scripted_turn().unwrap();
        assert_eq!(out.action, Action::ShootOpponent);
        assert_eq!(out.affected, 0);
        assert_eq!(game.current_turn(), 0);
    }

    #[test]
    fn multiplayer_turns_skip_eliminated_seats() {
        let mut game = multi(&["A", "B", "C"], 2, ScriptedRng::new(vec![5]));
        let out = game.resolve_action(0, Action::ShootOpponent, Some(1)).unwrap();
        assert_eq!(out.shell, Shell::Live);
        assert_eq!(game.life_of(1), Some(1));
        assert_eq!(game.current_turn(), 1);

        game.resolve_action(1, Action::ShootOpponent, Some(2)).unwrap();
        assert_eq!(game.life_of(2), Some(1));
        assert_eq!(game.current_turn(), 2);

        let out = game.resolve_action(2, Action::ShootOpponent, Some(1)).unwrap();
        assert!(out.eliminated);
        assert_eq!(game.life_of(1), Some(0));
        assert_eq!(game.current_turn(), 0);

        game.resolve_action(0, Action::ShootOpponent, Some(2)).unwrap();
        assert_eq!(game.current_turn(), 0, "B is skipped and C is out, so play would wrap to A");
        assert!(game.is_terminal());
        assert_eq!(game.winner(), Some(0));
    }

    #[test]
    fn shooting_an_eliminated_target_is_rejected() {
        let mut game = multi(&["A", "B", "C"], 1, ScriptedRng::new(vec![5]));
        game.resolve_action(0, Action::ShootOpponent, Some(1)).unwrap();
        assert_eq!(game.life_of(1), Some(0));
        assert_eq!(game.current_turn(), 2);
        let err = game.resolve_action(2, Action::ShootOpponent, Some(1)).unwrap_err();
        assert_eq!(err, GameError::InvalidOperation("B is out of the game".into()));
    }

    #[test]
    fn self_elimination_passes_the_turn() {
        let mut game = multi(&["A", "B", "C"], 1, ScriptedRng::new(vec![5]));
        let out = game.resolve_action(0, Action::ShootSelf, None).unwrap();
        assert!(out.eliminated);
        assert!(out.turn_passed);
        assert_eq!(game.current_turn(), 1);
        assert!(!game.is_terminal());
    }

    #[test]
    fn winner_is_first_seat_at_highest_life() {
        let mut game = multi(&["A", "B"], 3, ScriptedRng::new(vec![5]));
        game.resolve_action(0, Action::ShootOpponent, None).unwrap();
        game.resolve_action(1, Action::ShootOpponent, None).unwrap();
        game.resolve_action(0, Action::ShootOpponent, None).unwrap();
        game.resolve_action(1, Action::ShootOpponent, None).unwrap();
        game.resolve_action(0, Action::ShootOpponent, None).unwrap();
        assert!(game.is_terminal());
        assert_eq!(game.life_of(0), Some(1));
        assert_eq!(game.winner(), Some(0));
        assert_eq!(game.final_score(), None);
    }

    #[test]
    fn seventh_action_reloads() {
        let mut game = single(5, ScriptedRng::new(vec![1, 2]).with_order(ShuffleOrder::BlankFirst));
        let mut reloads = 0;
        for _ in 0..5 {
            if game.resolve_action(0, Action::ShootSelf, None).unwrap().reload.is_some() {
                reloads += 1;
            }
        }
        // Five blanks drawn, the single live shell is next.
        let sixth = game.resolve_action(0, Action::ShootSelf, None).unwrap();
        assert_eq!(sixth.shell, Shell::Live);
        assert!(sixth.reload.is_none());
        let seventh = game.resolve_action(0, Action::ShootSelf, None).unwrap();
        assert_eq!(seventh.reload, Some(Composition { live: 2, blank: 4 }));
        assert_eq!(reloads, 1);
        assert_eq!(game.last_reload(), Some(Composition { live: 2, blank: 4 }));
        assert_eq!(game.chamber_blank_count(), 3);
        assert_eq!(game.chamber_live_count(), 2);
    }

    #[test]
    fn continue_after_win_resets_state() {
        let mut game = single(2, ScriptedRng::new(vec![5]));
        assert!(game.continue_game().is_err(), "cannot continue a running game");
        game.resolve_action(0, Action::ShootOpponent, None).unwrap();
        game.resolve_action(1, Action::ShootOpponent, None).unwrap();
        game.resolve_action(0, Action::ShootOpponent, None).unwrap();
        assert!(game.is_terminal());
        assert_eq!(game.winner(), Some(0));
        assert_eq!(game.final_score(), Some(2 * 300));

        game.continue_game().unwrap();
        assert!(!game.is_terminal());
        assert_eq!(game.life_of(0), Some(2));
        assert_eq!(game.life_of(1), Some(2));
        assert_eq!(game.round_number(), 0);
        assert_eq!(game.current_turn(), 0);
        assert_eq!(game.chamber_live_count() + game.chamber_blank_count(), 0);
        assert_eq!(game.participant(0).map(|p| p.name.as_str()), Some("alice"));
    }

    #[test]
    fn continue_after_loss_is_refused_but_reset_works() {
        let mut game = single(1, ScriptedRng::new(vec![1]));
        game.resolve_action(0, Action::ShootSelf, None).unwrap();
        assert!(game.owner_eliminated());
        assert_eq!(game.final_score(), Some(0));
        assert!(game.continue_game().is_err());
        assert!(game.is_terminal());
        game.reset();
        assert!(!game.is_terminal());
        assert_eq!(game.life_of(0), Some(1));
    }

    #[test]
    fn random_games_keep_invariants() {
        for seed in 0..40u64 {
            let mut rng = SeededShellRng::new(seed);
            let picks: Vec<bool> = (0..400).map(|_| rng.coin_flip()).collect();
            let roster = Roster::Multiplayer(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
            let (mut game, _) =
                GameSession::configure(roster, (seed % 5 + 1) as i64, Box::new(SeededShellRng::new(seed)));
            let mut was_terminal = false;
            for shoot_self in picks {
                if game.is_terminal() {
                    was_terminal = true;
                    assert!(game.resolve_action(game.current_turn(), Action::ShootSelf, None).is_err());
                    continue;
                }
                assert!(!was_terminal, "terminal must be monotonic");
                let actor = game.current_turn();
                assert!(game.participant(actor).map(|p| p.is_active()).unwrap_or(false));
                let before = game.current_turn();
                let out = if shoot_self {
                    game.resolve_action(actor, Action::ShootSelf, None).unwrap()
                } else {
                    let target = game.opponents_of(actor)[0];
                    game.resolve_action(actor, Action::ShootOpponent, Some(target)).unwrap()
                };
                if shoot_self && !out.eliminated {
                    assert_eq!(game.current_turn(), before);
                }
                if !game.is_terminal() {
                    assert!(game.participant(game.current_turn()).map(|p| p.is_active()).unwrap_or(false));
                }
                assert!(game.participants().iter().all(|p| p.life <= game.initial_life()));
            }
            assert!(game.is_terminal(), "seed {} never finished", seed);
        }
    }
}
