//! CLI-facing options decoupled from parsing.
//! The actual clap parsing lives in the binary and maps into this struct.

use std::path::PathBuf;

/// Options passed from the CLI into the library entrypoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub envfile: Option<PathBuf>,
    /// Overrides `NAG_DEFAULT_MINUTES`
    pub minutes: Option<u64>,
    /// Overrides `NAG_DEFAULT_ALARM`
    pub alarm: Option<String>,
    pub list_alarms: bool,
}

/// Default path for the env file.
pub fn default_envfile_path() -> PathBuf {
    crate::config::default_envfile()
}
