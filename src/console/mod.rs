//! # Console front end
//!
//! A line-oriented menu loop over any `BufRead`/`Write` pair. The binary
//! wires it to stdin/stdout; tests drive it with in-memory buffers.
//!
//! ```text
//! 1. Play  2. Scoreboard  3. Log In  4. Sign Up  5. Exit
//! ```
//!
//! Playing requires a logged-in account. Single-player games end with a
//! score that is kept when it beats the player's best; multiplayer games
//! only announce a winner. End of input at any prompt leaves the loop.

use anyhow::Result;
use log::{info, warn};
use std::io::{BufRead, Write};

use crate::config::GameConfig;
use crate::game::{
    clamp_lives, clamp_player_count, Action, GameSession, Roster, SeededShellRng, ShellRng,
    ThreadShellRng,
};
use crate::logutil::escape_log;
use crate::scores::record_if_best;
use crate::storage::Storage;
use crate::validation::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};

/// Produces the generator for each new game.
pub type RngFactory = Box<dyn FnMut() -> Box<dyn ShellRng> + Send>;

/// Reads a password after showing the given prompt, without echo.
pub type SecretReader = Box<dyn FnMut(&str) -> std::io::Result<String> + Send>;

/// Build the generator source for a run: a fixed seed replays the same
/// sequence of games, otherwise thread-local randomness.
pub fn rng_factory(seed: Option<u64>) -> RngFactory {
    match seed {
        Some(seed) => {
            let mut games = 0u64;
            Box::new(move || {
                let rng = SeededShellRng::new(seed.wrapping_add(games));
                games += 1;
                Box::new(rng) as Box<dyn ShellRng>
            })
        }
        None => Box::new(|| Box::new(ThreadShellRng) as Box<dyn ShellRng>),
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
    storage: Storage,
    game: GameConfig,
    rng_factory: RngFactory,
    secret_reader: Option<SecretReader>,
    user: Option<String>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, storage: Storage, game: GameConfig) -> Self {
        let game = game.normalized();
        let rng_factory = rng_factory(game.seed);
        Console {
            input,
            output,
            storage,
            game,
            rng_factory,
            secret_reader: None,
            user: None,
        }
    }

    pub fn with_rng_factory(mut self, factory: RngFactory) -> Self {
        self.rng_factory = factory;
        self
    }

    /// Read passwords through `reader` instead of the line input.
    pub fn with_secret_reader(mut self, reader: SecretReader) -> Self {
        self.secret_reader = Some(reader);
        self
    }

    /// Name of the logged-in account, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the main menu until Exit or end of input.
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "🔫 Welcome to Russian Roulette!")?;
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "=== Main Menu ===")?;
            writeln!(self.output, "1. Play")?;
            writeln!(self.output, "2. Scoreboard")?;
            writeln!(self.output, "3. Log In")?;
            writeln!(self.output, "4. Sign Up")?;
            writeln!(self.output, "5. Exit")?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };
            let keep_going = match choice.as_str() {
                "1" => self.play_menu().await?,
                "2" => {
                    self.show_scoreboard().await?;
                    true
                }
                "3" => self.log_in().await?,
                "4" => self.sign_up().await?,
                "5" => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Invalid option, please try again.")?;
                    true
                }
            };
            if !keep_going {
                return Ok(());
            }
        }
    }

    /// Print `text`, read one trimmed line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like [`Self::prompt`], but through the secret reader when one is set.
    fn prompt_secret(&mut self, text: &str) -> Result<Option<String>> {
        let Some(read) = self.secret_reader.as_mut() else {
            return self.prompt(text);
        };
        self.output.flush()?;
        match read(text) {
            Ok(secret) => Ok(Some(secret.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Prompt for an integer; blank input picks `default`. Re-prompts on junk.
    fn prompt_number(&mut self, text: &str, default: i64) -> Result<Option<i64>> {
        loop {
            let Some(answer) = self.prompt(text)? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match answer.parse::<i64>() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => writeln!(self.output, "Please enter a number.")?,
            }
        }
    }

    async fn show_scoreboard(&mut self) -> Result<()> {
        writeln!(self.output, "=== Scoreboard ===")?;
        match self.storage.scoreboard().await {
            Ok(entries) if entries.is_empty() => writeln!(self.output, "No scores yet.")?,
            Ok(entries) => {
                for (rank, entry) in entries.iter().enumerate() {
                    writeln!(self.output, "{}. {}: {}", rank + 1, entry.username, entry.score)?;
                }
            }
            Err(e) => {
                warn!("scoreboard unavailable: {}", e);
                writeln!(self.output, "Scoreboard unavailable: {}", e)?;
            }
        }
        Ok(())
    }

    async fn log_in(&mut self) -> Result<bool> {
        let Some(username) = self.prompt("Username: ")? else {
            return Ok(false);
        };
        let Some(password) = self.prompt_secret("Password: ")? else {
            return Ok(false);
        };
        match self.storage.verify_user_password(&username, &password).await {
            Ok((Some(user), true)) => {
                if let Err(e) = self.storage.record_user_login(&user.username).await {
                    warn!("could not record login for {}: {}", escape_log(&user.username), e);
                }
                info!("{} logged in", escape_log(&user.username));
                writeln!(self.output, "Welcome back, {}!", user.username)?;
                self.user = Some(user.username);
            }
            Ok(_) => {
                warn!("failed login for {}", escape_log(&username));
                writeln!(self.output, "Invalid username or password.")?;
            }
            Err(e) => writeln!(self.output, "Login failed: {}", e)?,
        }
        Ok(true)
    }

    async fn sign_up(&mut self) -> Result<bool> {
        let Some(username) = self.prompt("Choose a username: ")? else {
            return Ok(false);
        };
        let Some(password) = self.prompt_secret(&format!(
            "Choose a password ({}-{} characters): ",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        ))?
        else {
            return Ok(false);
        };
        let Some(confirm) = self.prompt_secret("Confirm password: ")? else {
            return Ok(false);
        };
        if password != confirm {
            writeln!(self.output, "Passwords do not match.")?;
            return Ok(true);
        }
        match self.storage.register_user(&username, &password).await {
            Ok(user) => {
                writeln!(
                    self.output,
                    "Account created. You are now logged in as {}.",
                    user.username
                )?;
                self.user = Some(user.username);
            }
            Err(e) => writeln!(self.output, "Sign up failed: {}", e)?,
        }
        Ok(true)
    }

    async fn play_menu(&mut self) -> Result<bool> {
        let Some(player) = self.user.clone() else {
            writeln!(self.output, "Please log in first.")?;
            return Ok(true);
        };
        writeln!(self.output, "=== Play ===")?;
        writeln!(self.output, "1. Singleplayer")?;
        writeln!(self.output, "2. Multiplayer")?;
        writeln!(self.output, "3. Back")?;
        let Some(choice) = self.prompt("Choose a mode: ")? else {
            return Ok(false);
        };
        match choice.as_str() {
            "1" => self.play_single(&player).await,
            "2" => self.play_multi().await,
            "3" => Ok(true),
            _ => {
                writeln!(self.output, "Invalid option, please try again.")?;
                Ok(true)
            }
        }
    }

    fn ask_lives(&mut self) -> Result<Option<i64>> {
        let default = self.game.default_lives as i64;
        let Some(requested) =
            self.prompt_number(&format!("Lives per player (1-5) [{}]: ", default), default)?
        else {
            return Ok(None);
        };
        let lives = clamp_lives(requested);
        if lives.clamped {
            writeln!(
                self.output,
                "Lives must be between 1 and 5; using {}.",
                lives.effective
            )?;
        }
        Ok(Some(requested))
    }

    fn print_lives(&mut self, game: &GameSession) -> Result<()> {
        let line = game
            .participants()
            .iter()
            .map(|p| format!("{} ❤ {}", p.name, p.life))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    async fn play_single(&mut self, player: &str) -> Result<bool> {
        let Some(lives) = self.ask_lives()? else {
            return Ok(false);
        };
        let roster = Roster::SinglePlayer {
            player: player.to_string(),
            dealer: self.game.dealer_name.clone(),
        };
        let (mut game, _) = GameSession::configure(roster, lives, (self.rng_factory)());

        loop {
            while !game.is_terminal() {
                if game.scripted_turn_pending() {
                    let outcome = game.play_scripted_turn()?;
                    write!(self.output, "{}", outcome)?;
                    continue;
                }
                self.print_lives(&game)?;
                let dealer = game.participants()[1].name.clone();
                let Some(answer) =
                    self.prompt(&format!("Shoot (s)elf or (d) {}? ", dealer))?
                else {
                    return Ok(false);
                };
                let action = match answer.to_lowercase().as_str() {
                    "s" => Action::ShootSelf,
                    "d" => Action::ShootOpponent,
                    _ => {
                        writeln!(self.output, "Please enter 's' or 'd'.")?;
                        continue;
                    }
                };
                match game.resolve_action(0, action, None) {
                    Ok(outcome) => write!(self.output, "{}", outcome)?,
                    Err(e) => writeln!(self.output, "{}", e)?,
                }
            }

            let score = game.final_score().unwrap_or(0);
            writeln!(self.output, "Final score: {}", score)?;
            match record_if_best(&mut self.storage, player, score).await {
                Ok(update) if update.stored => {
                    writeln!(self.output, "🏆 New high score! (previous best: {})", update.previous)?
                }
                Ok(update) => writeln!(self.output, "Best score: {}", update.previous)?,
                Err(e) => writeln!(self.output, "Could not save score: {}", e)?,
            }

            if game.owner_eliminated() {
                writeln!(self.output, "You lost all your lives. Game over.")?;
                return Ok(true);
            }
            let Some(answer) = self.prompt("Continue playing? (y/n): ")? else {
                return Ok(false);
            };
            if !answer.eq_ignore_ascii_case("y") {
                return Ok(true);
            }
            game.continue_game()?;
            writeln!(self.output, "Lives restored. A new chamber awaits.")?;
        }
    }

    async fn play_multi(&mut self) -> Result<bool> {
        let default = self.game.default_players as i64;
        let Some(requested) =
            self.prompt_number(&format!("Number of players (2-4) [{}]: ", default), default)?
        else {
            return Ok(false);
        };
        let count = clamp_player_count(requested);
        if count.clamped {
            writeln!(
                self.output,
                "Players must be between 2 and 4; using {}.",
                count.effective
            )?;
        }
        let mut names = Vec::with_capacity(count.effective);
        for seat in 1..=count.effective {
            let Some(name) = self.prompt(&format!("Name for player {}: ", seat))? else {
                return Ok(false);
            };
            names.push(name);
        }
        let Some(lives) = self.ask_lives()? else {
            return Ok(false);
        };
        let (mut game, _) =
            GameSession::configure(Roster::Multiplayer(names), lives, (self.rng_factory)());

        while !game.is_terminal() {
            self.print_lives(&game)?;
            let actor = game.current_turn();
            let name = game.participants()[actor].name.clone();
            let Some(answer) = self.prompt(&format!(
                "{}, (1) shoot yourself or (2) shoot an opponent: ",
                name
            ))?
            else {
                return Ok(false);
            };
            let (action, target) = match answer.as_str() {
                "1" => (Action::ShootSelf, None),
                "2" => match self.choose_target(&game, actor)? {
                    Some(Some(target)) => (Action::ShootOpponent, Some(target)),
                    Some(None) => continue,
                    None => return Ok(false),
                },
                _ => {
                    writeln!(self.output, "Please enter 1 or 2.")?;
                    continue;
                }
            };
            match game.resolve_action(actor, action, target) {
                Ok(outcome) => write!(self.output, "{}", outcome)?,
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
        Ok(true)
    }

    /// Outer `None` is end of input; inner `None` is an invalid choice.
    fn choose_target(&mut self, game: &GameSession, actor: usize) -> Result<Option<Option<usize>>> {
        let opponents = game.opponents_of(actor);
        if opponents.len() == 1 {
            return Ok(Some(Some(opponents[0])));
        }
        for &seat in &opponents {
            writeln!(self.output, "  {}. {}", seat + 1, game.participants()[seat].name)?;
        }
        let Some(answer) = self.prompt("Target: ")? else {
            return Ok(None);
        };
        match answer.parse::<usize>() {
            Ok(n) if n >= 1 && opponents.contains(&(n - 1)) => Ok(Some(Some(n - 1))),
            _ => {
                writeln!(self.output, "That is not a valid target.")?;
                Ok(Some(None))
            }
        }
    }
}
