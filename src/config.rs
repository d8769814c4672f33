use anyhow::Result;
use std::path::{Path, PathBuf};

/// Largest accepted starting countdown, the most the display shows
pub const MAX_DEFAULT_MINUTES: u64 = 999;

/// Configuration for nag loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub default_minutes: u64,
    pub default_alarm: Option<String>,
    pub tick_interval_ms: u64,
    pub volume: f32,
    pub enable_audio_feedback: bool,
    pub enable_notifications: bool,
    pub rust_log: String,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_minutes: 10,
            default_alarm: None, // catalog default
            tick_interval_ms: 250,
            volume: 1.0,
            enable_audio_feedback: true,
            enable_notifications: true,
            rust_log: "info".to_string(),
            log_file: default_log_file(),
        }
    }
}

/// `$XDG_CONFIG_HOME/nag/.env`
pub fn default_envfile() -> PathBuf {
    base_dir(dirs::config_dir()).join(".env")
}

/// `$XDG_CACHE_HOME/nag/nag.log`
pub fn default_log_file() -> PathBuf {
    base_dir(dirs::cache_dir()).join("nag.log")
}

fn base_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| std::env::var("HOME").map_or_else(|_| PathBuf::from("."), PathBuf::from))
        .join("nag")
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

impl Config {
    /// Load configuration from environment variables
    #[allow(clippy::field_reassign_with_default)]
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(minutes) = std::env::var("NAG_DEFAULT_MINUTES") {
            if let Ok(parsed) = minutes.trim().parse::<u64>() {
                config.default_minutes = parsed;
            }
        }

        if let Ok(alarm) = std::env::var("NAG_DEFAULT_ALARM") {
            let alarm = alarm.trim();
            if !alarm.is_empty() {
                config.default_alarm = Some(alarm.to_string());
            }
        }

        if let Ok(interval) = std::env::var("NAG_TICK_INTERVAL_MS") {
            if let Ok(parsed) = interval.trim().parse::<u64>() {
                config.tick_interval_ms = parsed;
            }
        }

        if let Ok(volume) = std::env::var("NAG_VOLUME") {
            if let Ok(parsed) = volume.trim().parse::<f32>() {
                config.volume = parsed.clamp(0.0, 1.0);
            }
        }

        if let Ok(enabled) = std::env::var("ENABLE_AUDIO_FEEDBACK") {
            config.enable_audio_feedback = parse_bool(&enabled);
        }

        if let Ok(enabled) = std::env::var("ENABLE_NOTIFICATIONS") {
            config.enable_notifications = parse_bool(&enabled);
        }

        if let Ok(log_level) = std::env::var("RUST_LOG") {
            config.rust_log = log_level;
        }

        if let Ok(path) = std::env::var("NAG_LOG_FILE") {
            if !path.trim().is_empty() {
                config.log_file = PathBuf::from(path);
            }
        }

        config
    }

    /// Load environment file and return config
    pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::from_path(path)?;
        Ok(Self::from_env())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_minutes == 0 {
            return Err(anyhow::anyhow!(
                "NAG_DEFAULT_MINUTES must be greater than 0"
            ));
        }

        if self.default_minutes > MAX_DEFAULT_MINUTES {
            return Err(anyhow::anyhow!(
                "NAG_DEFAULT_MINUTES must be at most {MAX_DEFAULT_MINUTES}, got: {}",
                self.default_minutes
            ));
        }

        if self.tick_interval_ms == 0 {
            return Err(anyhow::anyhow!(
                "NAG_TICK_INTERVAL_MS must be greater than 0"
            ));
        }

        if !(0.0..=1.0).contains(&self.volume) {
            return Err(anyhow::anyhow!(
                "NAG_VOLUME must be between 0.0 and 1.0, got: {}",
                self.volume
            ));
        }

        Ok(())
    }
}

/// Load config from `envfile` when it exists, else from the process
/// environment. Validation is left to the caller so CLI overrides apply first.
pub fn bootstrap(envfile: Option<&Path>) -> Result<Config> {
    let config = match envfile {
        Some(path) if path.exists() => match Config::load_env_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load environment file {}: {}",
                    path.display(),
                    e
                );
                eprintln!("Falling back to system environment");
                Config::from_env()
            }
        },
        _ => Config::from_env(),
    };

    Ok(config)
}
