use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Pause between a completed trick and the start of the next one
    pub trick_pause: Duration,
    pub default_winning_score: i32,
    /// Buffer size of each game's broadcast channel
    pub event_channel_capacity: usize,
    pub txn_max_attempts: u32,
    /// Directory for saved offline sheets; in memory when unset
    pub scoresheet_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            trick_pause: Duration::from_millis(3000), // 3 seconds
            default_winning_score: 50,
            event_channel_capacity: 100,
            txn_max_attempts: 5,
            scoresheet_dir: None,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            trick_pause: Duration::from_millis(env_or(
                "TRICK_PAUSE_MS",
                defaults.trick_pause.as_millis() as u64,
            )),
            default_winning_score: env_or("DEFAULT_WINNING_SCORE", defaults.default_winning_score)
                .max(1),
            event_channel_capacity: env_or(
                "EVENT_CHANNEL_CAPACITY",
                defaults.event_channel_capacity,
            )
            .max(1),
            txn_max_attempts: env_or("TXN_MAX_ATTEMPTS", defaults.txn_max_attempts).max(1),
            scoresheet_dir: std::env::var("SCORESHEET_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}
