use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::stream::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::audio::Playback;
use crate::config::Config;
use crate::glyphs::GlyphRenderer;
use crate::notify::Notifier;
use crate::signals;
use crate::sounds::{Cue, SoundCatalog};
use crate::timer::{Command, Effect, Timer, MAX_REMAINING};
use crate::tui::{TerminalGuard, View, ALARM_INFO_TEXT};

/// Map a key press to a timer command
pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char(' ') => Some(Command::ToggleRun),
        KeyCode::Char('s') => Some(Command::Stop),
        KeyCode::Up => Some(Command::AddMinute),
        KeyCode::Down => Some(Command::SubtractMinute),
        KeyCode::Right => Some(Command::AddHour),
        KeyCode::Left => Some(Command::SubtractHour),
        KeyCode::Char('/') => Some(Command::CycleAlarm),
        KeyCode::Char(c @ '1'..='9') => c
            .to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .map(Command::SetMinutes),
        _ => None,
    }
}

pub struct App {
    timer: Timer,
    catalog: Arc<SoundCatalog>,
    glyphs: GlyphRenderer,
    player: Box<dyn Playback>,
    notifier: Box<dyn Notifier>,
    tick_interval: Duration,
    cue_sounds: bool,
}

impl App {
    pub fn new(
        config: &Config,
        catalog: Arc<SoundCatalog>,
        selected_alarm: usize,
        player: Box<dyn Playback>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let remaining = config
            .default_minutes
            .checked_mul(60)
            .map_or(MAX_REMAINING, Duration::from_secs);
        let timer = Timer::new(
            remaining,
            selected_alarm,
            catalog.alarm_count(),
        );
        Self {
            timer,
            catalog,
            glyphs: GlyphRenderer::new(),
            player,
            notifier,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            cue_sounds: config.enable_audio_feedback,
        }
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Build the frame for the current state
    pub fn view(&self) -> View {
        let countdown = self.glyphs.render(
            &self.timer.countdown_text(),
            self.timer.countdown_visible(),
            self.timer.colon_visible(),
        );
        View {
            countdown,
            show_stop_prompt: self.timer.is_stop_prompt_visible(),
            alarm_info: self.timer.is_alarm_active().then_some(ALARM_INFO_TEXT),
            alarm_name: self
                .catalog
                .alarm_name(self.timer.selected_alarm())
                .to_string(),
        }
    }

    /// Carry out side effects. Returns `true` when the app should exit.
    pub fn dispatch(&self, effects: Vec<Effect>) -> bool {
        let mut quit = false;
        for effect in effects {
            match effect {
                Effect::Play(cue) => self.play(cue),
                Effect::Notify { title, body } => self.notifier.notify(title, body),
                Effect::Quit => quit = true,
            }
        }
        quit
    }

    fn play(&self, cue: Cue) {
        if !self.cue_sounds && !matches!(cue, Cue::Alarm(_)) {
            return;
        }
        match self.catalog.clip(cue) {
            Some(clip) => self.player.play(clip),
            None => crate::audio::ring_bell(),
        }
    }

    pub fn on_tick(&mut self, now: std::time::Instant) -> bool {
        let effects = self.timer.tick(now);
        self.dispatch(effects)
    }

    pub fn on_command(&mut self, command: Command) -> bool {
        let effects = self.timer.apply(command);
        self.dispatch(effects)
    }

    /// Run the application main loop
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be set up or drawn, or signal
    /// registration fails
    pub async fn run(mut self) -> Result<i32> {
        let mut signals = signals::build_signal_stream()?;
        let mut terminal = TerminalGuard::enter()?;
        let mut events = EventStream::new();

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Timer ready: {} remaining, alarm {}",
            self.timer.countdown_text(),
            self.catalog.alarm_name(self.timer.selected_alarm())
        );

        loop {
            terminal.draw(&self.view())?;

            let quit = tokio::select! {
                instant = ticker.tick() => self.on_tick(instant.into_std()),
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => match command_for_key(key) {
                        Some(command) => self.on_command(command),
                        None => false,
                    },
                    Some(Ok(_)) => false,
                    Some(Err(e)) => {
                        tracing::error!("Terminal event error: {e}");
                        return Err(e.into());
                    }
                    None => true,
                },
                signal = signals.next() => {
                    tracing::info!("Received signal {signal:?}, shutting down");
                    true
                }
            };

            if quit {
                break;
            }
        }

        tracing::info!("Exiting nag");
        Ok(0)
    }
}
