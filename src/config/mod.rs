//! # Configuration Management Module
//!
//! TOML configuration for the `roulette` binary, organized into sections:
//!
//! - [`GameConfig`] - table defaults (lives, players, dealer name, fixed seed)
//! - [`StorageConfig`] - where account files live
//! - [`LoggingConfig`] - log level and optional log file
//! - [`SecurityConfig`] - Argon2 cost parameters for password hashing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roulette::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Data dir: {}", config.storage.data_dir);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! default_lives = 3
//! default_players = 2
//! dealer_name = "Dealer"
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "roulette.log"
//! ```
//!
//! Every section may be omitted. Precedence: CLI args > config file > defaults.

use anyhow::{anyhow, Result};
use argon2::Params;
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::session::{clamp_lives, clamp_player_count};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: Option<SecurityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Lives offered when the player just presses enter at the prompt.
    #[serde(default = "default_lives")]
    pub default_lives: u8,
    /// Seats offered when the player just presses enter at the prompt.
    #[serde(default = "default_players")]
    pub default_players: usize,
    #[serde(default = "default_dealer_name")]
    pub dealer_name: String,
    /// Fixed seed for reproducible games; `play --seed` overrides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_lives() -> u8 {
    3
}

fn default_players() -> usize {
    2
}

fn default_dealer_name() -> String {
    "Dealer".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            default_lives: default_lives(),
            default_players: default_players(),
            dealer_name: default_dealer_name(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Prompt defaults forced into the playable range.
    pub fn normalized(&self) -> GameConfig {
        GameConfig {
            default_lives: clamp_lives(self.default_lives as i64).effective,
            default_players: clamp_player_count(self.default_players as i64).effective,
            dealer_name: self.dealer_name.clone(),
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: Some("roulette.log".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Argon2Config {
    #[serde(default)]
    pub memory_kib: Option<u32>,
    #[serde(default)]
    pub time_cost: Option<u32>,
    #[serde(default)]
    pub parallelism: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub argon2: Option<Argon2Config>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load `path`, or the built-in defaults when no such file exists.
    /// A file that exists but cannot be read or parsed is still an error.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        match fs::metadata(path).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "config file {} not found; using defaults (run `roulette init` to create it)",
                    path
                );
                Ok(Config::default())
            }
            _ => Config::load(path).await,
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Argon2 parameters from `[security.argon2]`; unset fields keep the
    /// library defaults. `None` when nothing is configured or the values are
    /// rejected by argon2.
    pub fn argon2_params(&self) -> Option<Params> {
        let a = self.security.as_ref()?.argon2.as_ref()?;
        let mem = a.memory_kib.unwrap_or(Params::DEFAULT_M_COST);
        let time = a.time_cost.unwrap_or(Params::DEFAULT_T_COST);
        let para = a.parallelism.unwrap_or(Params::DEFAULT_P_COST);
        Params::new(mem, time, para, None).ok()
    }
}
