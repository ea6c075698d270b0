//! Binary entrypoint for the `roulette` CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and create the data directory
//! - `play [--seed <n>]` - run the interactive console game on stdin/stdout
//! - `scoreboard` - print every account's best single-player score
//! - `passwd <username>` - interactively reset an account password (argon2 hashed)
//!
//! See the library crate docs for module-level details: `roulette::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use roulette::config::Config;
use roulette::console::{rng_factory, Console};
use roulette::storage::Storage;
use roulette::validation::validate_password;

#[derive(Parser)]
#[command(name = "roulette")]
#[command(about = "Turn-based Russian Roulette for the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file and create the data directory
    Init,
    /// Play at the console
    Play {
        /// Fixed seed for reproducible games (overrides `[game] seed`)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the high-score table
    Scoreboard,
    /// Reset the password of an existing account
    Passwd {
        /// Account name
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Lenient pass so logging follows the config file when it parses.
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);
    let config = match (pre_config, &cli.command) {
        (Some(config), _) => config,
        (None, Commands::Init) => Config::default(),
        (None, _) => Config::load_or_default(&cli.config).await?,
    };

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            let config = Config::load(&cli.config).await?;
            Storage::new_with_params(&config.storage.data_dir, config.argon2_params()).await?;
            println!("Wrote default configuration to {}", cli.config);
            println!("Data directory: {}", config.storage.data_dir);
        }
        Commands::Play { seed } => {
            info!("Starting roulette v{}", env!("CARGO_PKG_VERSION"));
            let storage =
                Storage::new_with_params(&config.storage.data_dir, config.argon2_params()).await?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let mut console = Console::new(stdin.lock(), stdout.lock(), storage, config.game.clone());
            if let Some(seed) = seed {
                console = console.with_rng_factory(rng_factory(Some(seed)));
            }
            if atty::is(atty::Stream::Stdin) {
                console = console.with_secret_reader(Box::new(|prompt: &str| {
                    rpassword::prompt_password(prompt)
                }));
            }
            console.run().await?;
        }
        Commands::Scoreboard => {
            let storage =
                Storage::new_with_params(&config.storage.data_dir, config.argon2_params()).await?;
            let entries = storage.scoreboard().await?;
            if entries.is_empty() {
                println!("No scores yet.");
            }
            for (rank, entry) in entries.iter().enumerate() {
                let when = entry
                    .achieved_at
                    .map(|t| t.format(" (%Y-%m-%d)").to_string())
                    .unwrap_or_default();
                println!("{:>3}. {:<30} {:>8}{}", rank + 1, entry.username, entry.score, when);
            }
        }
        Commands::Passwd { username } => {
            let mut storage =
                Storage::new_with_params(&config.storage.data_dir, config.argon2_params()).await?;
            if storage.get_user(&username).await?.is_none() {
                return Err(anyhow!("No such user: {}", username));
            }
            println!("Setting password for '{}'.", username);
            // Prompt twice without echo
            let pass1 = rpassword::prompt_password("New password: ")?;
            if let Err(e) = validate_password(&pass1) {
                println!("Error: {}.", e);
                return Ok(());
            }
            let pass2 = rpassword::prompt_password("Confirm password: ")?;
            if pass1 != pass2 {
                println!("Error: passwords do not match.");
                return Ok(());
            }
            storage.update_user_password(&username, &pass1).await?;
            println!("Password updated.");
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins over the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    match log_file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // The game owns the terminal; mirror only warnings there unless -v was given.
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty && (verbosity > 0 || record.level() <= log::Level::Warn) {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
