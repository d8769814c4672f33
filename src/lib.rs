//! nag library entrypoint and public exports.
//!
//! This crate exposes a library-first API with a thin binary wrapper.
//! It coordinates configuration bootstrap, sound synthesis, audio output and
//! running the timer UI.

use anyhow::Result;
use std::sync::Arc;

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod glyphs;
pub mod logging;
pub mod notify;
pub mod signals;
pub mod sounds;
pub mod synth;
pub mod timer;
pub mod tui;

use crate::audio::AudioPlayer;
use crate::config::Config;
use crate::notify::{DesktopNotifier, Notifier, NullNotifier};
use crate::sounds::SoundCatalog;

/// Index of the alarm named `name`, or the catalog default when it is unset
/// or unknown
pub fn resolve_alarm(catalog: &SoundCatalog, name: Option<&str>) -> usize {
    match name {
        Some(name) => catalog.find_alarm(name).unwrap_or_else(|| {
            tracing::warn!("Unknown alarm '{name}', using default");
            catalog.default_alarm()
        }),
        None => catalog.default_alarm(),
    }
}

/// One line per alarm, the default marked with `*`
pub fn alarm_listing(catalog: &SoundCatalog) -> String {
    catalog
        .alarms()
        .iter()
        .enumerate()
        .map(|(idx, clip)| {
            let marker = if idx == catalog.default_alarm() { '*' } else { ' ' };
            format!("{marker} {}", clip.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply CLI overrides on top of the loaded config, then validate the result
pub fn apply_overrides(mut config: Config, options: &cli::RunOptions) -> Result<Config> {
    if let Some(minutes) = options.minutes {
        config.default_minutes = minutes;
    }
    if let Some(alarm) = &options.alarm {
        config.default_alarm = Some(alarm.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Run the application given CLI-level `RunOptions`.
/// Returns a process exit code.
pub async fn run(options: cli::RunOptions) -> Result<i32> {
    // Bootstrap configuration
    let config = crate::config::bootstrap(options.envfile.as_deref())?;
    let config = apply_overrides(config, &options)?;

    let catalog = Arc::new(SoundCatalog::load());

    if options.list_alarms {
        println!("{}", alarm_listing(&catalog));
        return Ok(0);
    }

    if let Err(e) = crate::logging::init(&config.rust_log, &config.log_file) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let selected_alarm = resolve_alarm(&catalog, config.default_alarm.as_deref());

    // Opening the device waits for the audio thread
    let volume = config.volume;
    let player = tokio::task::spawn_blocking(move || AudioPlayer::start(volume)).await?;

    let notifier: Box<dyn Notifier> = if config.enable_notifications {
        Box::new(DesktopNotifier)
    } else {
        Box::new(NullNotifier)
    };

    let app = crate::app::App::new(&config, catalog, selected_alarm, Box::new(player), notifier);
    app.run().await
}
