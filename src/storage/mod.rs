//! # Storage Module - Accounts and High Scores
//!
//! File-backed persistence for player accounts. Each account is one JSON
//! document holding the Argon2id password hash and the player's best
//! single-player score:
//!
//! ```text
//! data/
//! └── users/
//!     ├── alice.json
//!     └── Jane%20Doe.json   ← names are percent-encoded into file names
//! ```
//!
//! Writes go through a temp file and an atomic rename while an `fs2`
//! exclusive lock is held on the destination, so a crash never leaves a
//! half-written account behind.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roulette::storage::Storage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut storage = Storage::new("./data").await?;
//!     storage.register_user("alice", "correct horse").await?;
//!     let (_, ok) = storage.verify_user_password("alice", "correct horse").await?;
//!     assert!(ok);
//!     storage.set_score("alice", 600).await?;
//!     for entry in storage.scoreboard().await? {
//!         println!("{}: {}", entry.username, entry.score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The plaintext password is never written; only the PHC hash string is.

use anyhow::{anyhow, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{info, warn};
use password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::logutil::escape_log;
use crate::scores::{ScoreStore, UnknownPlayer};
use crate::validation::{
    safe_filename, secure_json_parse, validate_account_name, validate_file_size,
    validate_password,
};

/// Upper bound for a single account document.
const MAX_USER_FILE_BYTES: u64 = 100_000;

/// Main storage interface
pub struct Storage {
    data_dir: String,
    argon2: Argon2<'static>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub high_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_score_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// One scoreboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub username: String,
    pub score: u32,
    pub achieved_at: Option<DateTime<Utc>>,
}

impl Storage {
    /// Initialize storage with the given data directory
    pub async fn new(data_dir: &str) -> Result<Self> {
        Self::new_with_params(data_dir, None).await
    }

    /// Initialize storage with explicit Argon2 params
    pub async fn new_with_params(data_dir: &str, params: Option<Params>) -> Result<Self> {
        let users_dir = Path::new(data_dir).join("users");
        fs::create_dir_all(&users_dir)
            .await
            .map_err(|e| anyhow!("Failed to create data directory {}: {}", data_dir, e))?;
        let argon2 = match params {
            Some(p) => Argon2::new(Algorithm::Argon2id, Version::V0x13, p),
            None => Argon2::default(),
        };
        Ok(Storage {
            data_dir: data_dir.to_string(),
            argon2,
        })
    }

    /// Return the base data directory path used by this storage instance
    pub fn base_dir(&self) -> &str {
        &self.data_dir
    }

    fn user_file(&self, username: &str) -> PathBuf {
        Path::new(&self.data_dir)
            .join("users")
            .join(format!("{}.json", safe_filename(username)))
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Password hash failure: {e}"))?;
        Ok(hash.to_string())
    }

    /// Write content to a file atomically while holding an exclusive lock on it
    async fn write_file_locked(path: &Path, content: &str) -> Result<()> {
        use std::fs::{File, OpenOptions};
        use std::io::Write;

        // fs2 locks are synchronous; the lock is held across the rename.
        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        lock_file.lock_exclusive()?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let base = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("user.json");
        let mut counter = 0u32;
        let tmp_path = loop {
            let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(mut tmp) => {
                    tmp.write_all(content.as_bytes())?;
                    tmp.flush()?;
                    let _ = tmp.sync_all();
                    break candidate;
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    counter = counter.saturating_add(1);
                }
                Err(e) => return Err(anyhow!("Failed to create temp file for atomic write: {}", e)),
            }
        };

        std::fs::rename(&tmp_path, path)?;
        if let Ok(dir_file) = File::open(dir) {
            let _ = dir_file.sync_all();
        }
        drop(lock_file);
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let json_content = serde_json::to_string_pretty(user)?;
        Self::write_file_locked(&self.user_file(&user.username), &json_content).await
    }

    async fn load_user(&self, username: &str) -> Result<User> {
        self.get_user(username)
            .await?
            .ok_or_else(|| anyhow!("User not found"))
    }

    /// Register a new user with password; fails if user exists.
    pub async fn register_user(&mut self, username: &str, password: &str) -> Result<User> {
        let validated_username =
            validate_account_name(username).map_err(|e| anyhow!("Invalid username: {}", e))?;
        validate_password(password).map_err(|e| anyhow!("{}", e))?;

        if self.get_user(&validated_username).await?.is_some() {
            return Err(anyhow!(
                "Username '{}' is already taken",
                validated_username
            ));
        }

        let now = Utc::now();
        let user = User {
            username: validated_username,
            password_hash: Some(self.hash_password(password)?),
            high_score: 0,
            best_score_at: None,
            created_at: now,
            last_login: now,
        };
        self.save_user(&user).await?;
        info!("registered user {}", escape_log(&user.username));
        Ok(user)
    }

    /// Verify user password; returns (user, bool match)
    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(Option<User>, bool)> {
        let Some(user) = self.get_user(username).await? else {
            return Ok((None, false));
        };
        let Some(stored) = &user.password_hash else {
            return Ok((Some(user), false));
        };
        let parsed = password_hash::PasswordHash::new(stored)
            .map_err(|e| anyhow!("Corrupt password hash: {e}"))?;
        let ok = self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        Ok((Some(user), ok))
    }

    /// Update (set or change) a user's password. Always overwrites existing hash.
    pub async fn update_user_password(&mut self, username: &str, new_password: &str) -> Result<()> {
        validate_password(new_password).map_err(|e| anyhow!("{}", e))?;
        let mut user = self.load_user(username).await?;
        user.password_hash = Some(self.hash_password(new_password)?);
        self.save_user(&user).await?;
        info!("password updated for {}", escape_log(username));
        Ok(())
    }

    /// Record a successful login (updating last_login) and return the updated user.
    pub async fn record_user_login(&self, username: &str) -> Result<User> {
        let mut user = self.load_user(username).await?;
        user.last_login = Utc::now();
        self.save_user(&user).await?;
        Ok(user)
    }

    /// Get user information
    pub async fn get_user(&self, username: &str) -> Result<Option<User>> {
        let user_file = self.user_file(username);
        if !user_file.exists() {
            return Ok(None);
        }

        let metadata = fs::metadata(&user_file).await?;
        validate_file_size(metadata.len(), MAX_USER_FILE_BYTES)
            .map_err(|e| anyhow!("User file too large: {}", e))?;

        let content = fs::read_to_string(&user_file).await?;
        let user: User = secure_json_parse(&content, MAX_USER_FILE_BYTES as usize)
            .map_err(|e| anyhow!("Failed to parse user file: {}", e))?;
        Ok(Some(user))
    }

    /// List all users, sorted by name
    pub async fn list_all_users(&self) -> Result<Vec<User>> {
        let users_dir = Path::new(&self.data_dir).join("users");
        let mut users = Vec::new();

        if users_dir.exists() {
            let mut entries = fs::read_dir(&users_dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let is_json = path.extension().is_some_and(|ext| ext == "json");
                let is_temp = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
                if !entry.file_type().await?.is_file() || !is_json || is_temp {
                    continue;
                }
                let content = fs::read_to_string(&path).await?;
                match secure_json_parse::<User>(&content, MAX_USER_FILE_BYTES as usize) {
                    Ok(user) => users.push(user),
                    Err(e) => warn!("Failed to parse user file {:?}: {}", path, e),
                }
            }
        }

        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    /// Best recorded score; 0 for unknown users.
    pub async fn high_score(&self, username: &str) -> Result<u32> {
        Ok(self
            .get_user(username)
            .await?
            .map(|u| u.high_score)
            .unwrap_or(0))
    }

    /// Overwrite a user's best score. The strictly-greater rule lives in
    /// [`crate::scores::record_if_best`].
    pub async fn set_score(&mut self, username: &str, score: u32) -> Result<User> {
        let Some(mut user) = self.get_user(username).await? else {
            return Err(UnknownPlayer(username.to_string()).into());
        };
        user.high_score = score;
        user.best_score_at = Some(Utc::now());
        self.save_user(&user).await?;
        info!("high score for {} is now {}", escape_log(username), score);
        Ok(user)
    }

    /// Every account with its best score, highest first; ties by name.
    pub async fn scoreboard(&self) -> Result<Vec<ScoreEntry>> {
        let mut entries: Vec<ScoreEntry> = self
            .list_all_users()
            .await?
            .into_iter()
            .map(|u| ScoreEntry {
                username: u.username,
                score: u.high_score,
                achieved_at: u.best_score_at,
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.username.cmp(&b.username)));
        Ok(entries)
    }
}

impl ScoreStore for Storage {
    async fn high_score(&self, username: &str) -> Result<u32> {
        Storage::high_score(self, username).await
    }

    async fn set_score(&mut self, username: &str, score: u32) -> Result<()> {
        Storage::set_score(self, username, score).await.map(|_| ())
    }
}
