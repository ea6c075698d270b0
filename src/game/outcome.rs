use serde::{Deserialize, Serialize};
use std::fmt;

use super::shell::{Composition, Shell};

/// What the acting participant does with the revolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    ShootSelf,
    ShootOpponent,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::ShootSelf => "Shot Self",
            Action::ShootOpponent => "Shot Opponent",
        }
    }
}

/// Everything that happened while resolving one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundOutcome {
    /// Round counter after this action (single-player mode; 0 otherwise).
    pub round: u32,
    pub actor: usize,
    pub actor_name: String,
    pub action: Action,
    /// Participant whose life was at stake: the actor for self-shots, the target otherwise.
    pub affected: usize,
    pub affected_name: String,
    pub shell: Shell,
    /// `-1` on a live hit, `0` on a blank.
    pub life_delta: i8,
    pub life_after: u8,
    pub eliminated: bool,
    /// Present when the chamber was empty and reloaded for this action.
    pub reload: Option<Composition>,
    pub turn_passed: bool,
    pub next_turn: usize,
    pub next_name: String,
    pub terminal: bool,
    pub winner: Option<usize>,
    pub winner_name: Option<String>,
}

impl RoundOutcome {
    /// Multi-line summary for console or log output.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if self.round > 0 {
            out.push_str(&format!("🔄 Round: {}\n", self.round));
        }
        if let Some(c) = self.reload {
            out.push_str(&format!(
                "🔴 Live shell(s): {}, 🔵 Blank shell(s): {}\n",
                c.live, c.blank
            ));
        }
        match self.action {
            Action::ShootSelf => {
                out.push_str(&format!("{} shoots themselves.\n", self.actor_name))
            }
            Action::ShootOpponent => out.push_str(&format!(
                "{} shoots {}.\n",
                self.actor_name, self.affected_name
            )),
        }
        match (self.shell, self.action) {
            (Shell::Live, _) => out.push_str(&format!(
                "💥 Hit! {} loses one life ({} left)\n",
                self.affected_name, self.life_after
            )),
            (Shell::Blank, Action::ShootSelf) => out.push_str(&format!(
                "💨 Blank! {} survives and keeps the turn.\n",
                self.actor_name
            )),
            (Shell::Blank, Action::ShootOpponent) => {
                out.push_str("💨 Blank! No one is hit, and the turn changes.\n")
            }
        }
        if self.eliminated {
            out.push_str(&format!("💀 {} is out of the game!\n", self.affected_name));
        }
        if self.terminal {
            match &self.winner_name {
                Some(name) => out.push_str(&format!("🎉 Game over! Winner: {}\n", name)),
                None => out.push_str("🎉 Game over!\n"),
            }
        } else {
            out.push_str(&format!("Next turn: {}\n", self.next_name));
        }
        out
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
