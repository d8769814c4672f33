//! Countdown and alarm state machine.
//!
//! All mutation happens through [`Timer::tick`] and [`Timer::apply`]. Neither
//! performs I/O: each returns the side effects (sounds, notification, quit)
//! for the caller to dispatch.

use std::time::{Duration, Instant};

use crate::sounds::Cue;

/// How often the alarm sound is replayed while the alarm is active
pub const ALARM_REPEAT_INTERVAL: Duration = Duration::from_secs(60);
/// Flash period of the countdown while alarming
pub const BLINK_INTERVAL: Duration = Duration::from_millis(250);
/// Blink period of the colon while running
pub const COLON_BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Remaining duration at startup unless configured otherwise
pub const DEFAULT_DURATION: Duration = Duration::from_secs(10 * 60);

/// Longest countdown the display can show ("999:59")
pub const MAX_REMAINING: Duration = Duration::from_secs(999 * 60 + 59);

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);
const SECOND: Duration = Duration::from_secs(1);

pub const NOTIFY_TITLE: &str = "Nag";
pub const NOTIFY_BODY: &str = "Time's up";

/// A user intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ToggleRun,
    Stop,
    AddMinute,
    SubtractMinute,
    AddHour,
    SubtractHour,
    CycleAlarm,
    /// Set the countdown to this many minutes (1-9)
    SetMinutes(u8),
}

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Play(Cue),
    Notify {
        title: &'static str,
        body: &'static str,
    },
    Quit,
}

#[derive(Debug, Clone)]
pub struct Timer {
    remaining: Duration,
    running: bool,
    alarm_active: bool,
    blink_visible: bool,
    colon_visible: bool,
    stop_prompt_visible: bool,
    last_alarm_play: Option<Instant>,
    last_blink_toggle: Option<Instant>,
    last_colon_toggle: Option<Instant>,
    last_tick: Option<Instant>,
    selected_alarm: usize,
    alarm_count: usize,
}

impl Timer {
    pub fn new(remaining: Duration, selected_alarm: usize, alarm_count: usize) -> Self {
        let selected_alarm = if selected_alarm < alarm_count {
            selected_alarm
        } else {
            0
        };
        Self {
            remaining: remaining.min(MAX_REMAINING),
            running: false,
            alarm_active: false,
            blink_visible: true,
            colon_visible: true,
            stop_prompt_visible: false,
            last_alarm_play: None,
            last_blink_toggle: None,
            last_colon_toggle: None,
            last_tick: None,
            selected_alarm,
            alarm_count,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_alarm_active(&self) -> bool {
        self.alarm_active
    }

    pub fn is_stop_prompt_visible(&self) -> bool {
        self.stop_prompt_visible
    }

    pub fn selected_alarm(&self) -> usize {
        self.selected_alarm
    }

    /// Whether the countdown digits are drawn this frame
    pub fn countdown_visible(&self) -> bool {
        !self.alarm_active || self.blink_visible
    }

    /// Whether the colon is drawn this frame
    pub fn colon_visible(&self) -> bool {
        !(self.running && !self.colon_visible)
    }

    /// Countdown as `MM:SS`; minutes are not wrapped into hours
    pub fn countdown_text(&self) -> String {
        let total = self.remaining.as_secs();
        format!("{:02}:{:02}", total / 60, total % 60)
    }

    /// Advance the clock to `now`
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();

        // A clock that moved backwards yields a zero delta
        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));

        if self.running && !self.remaining.is_zero() {
            self.remaining = self.remaining.saturating_sub(delta);

            let anchor = *self.last_colon_toggle.get_or_insert(now);
            if now.saturating_duration_since(anchor) >= COLON_BLINK_INTERVAL {
                self.colon_visible = !self.colon_visible;
                self.last_colon_toggle = Some(now);
            }

            if self.remaining.is_zero() {
                tracing::info!("countdown reached zero, raising alarm");
                effects.push(Effect::Notify {
                    title: NOTIFY_TITLE,
                    body: NOTIFY_BODY,
                });
                effects.push(Effect::Play(self.alarm_cue()));
                self.activate_alarm(now);
                self.running = false;
            }
        } else {
            self.colon_visible = true;
            self.last_colon_toggle = None;
        }
        self.last_tick = Some(now);

        if self.alarm_active {
            if self.remaining.is_zero() {
                let repeat_due = self
                    .last_alarm_play
                    .is_some_and(|last| now.saturating_duration_since(last) >= ALARM_REPEAT_INTERVAL);
                if repeat_due {
                    tracing::debug!("repeating alarm");
                    effects.push(Effect::Play(self.alarm_cue()));
                    self.last_alarm_play = Some(now);
                }

                let anchor = *self.last_blink_toggle.get_or_insert(now);
                if now.saturating_duration_since(anchor) >= BLINK_INTERVAL {
                    self.blink_visible = !self.blink_visible;
                    self.last_blink_toggle = Some(now);
                }
            } else {
                self.silence_alarm();
            }
        } else if !self.blink_visible {
            self.blink_visible = true;
        }

        effects
    }

    /// Apply a user command
    pub fn apply(&mut self, command: Command) -> Vec<Effect> {
        tracing::debug!(?command, "applying command");
        let cue = match command {
            Command::Quit => return vec![Effect::Quit],
            Command::ToggleRun => {
                self.running = !self.running;
                self.silence_alarm();
                Cue::Switch
            }
            Command::Stop => {
                self.running = false;
                self.silence_alarm();
                Cue::Stop
            }
            Command::AddMinute => {
                self.remaining = self.remaining.saturating_add(MINUTE).min(MAX_REMAINING);
                self.silence_alarm();
                Cue::Adjust
            }
            Command::SubtractMinute => {
                self.remaining = if self.remaining > MINUTE {
                    self.remaining - MINUTE
                } else if self.remaining > SECOND {
                    self.remaining - SECOND
                } else {
                    SECOND
                };
                self.silence_alarm();
                Cue::Adjust
            }
            Command::AddHour => {
                self.remaining = self.remaining.saturating_add(HOUR).min(MAX_REMAINING);
                self.silence_alarm();
                Cue::Adjust
            }
            Command::SubtractHour => {
                self.remaining = if self.remaining > HOUR {
                    self.remaining - HOUR
                } else {
                    MINUTE
                };
                self.silence_alarm();
                Cue::Adjust
            }
            Command::CycleAlarm => {
                if self.alarm_count == 0 {
                    return Vec::new();
                }
                self.selected_alarm = (self.selected_alarm + 1) % self.alarm_count;
                Cue::Adjust
            }
            Command::SetMinutes(minutes) => {
                self.remaining = MINUTE * u32::from(minutes);
                self.running = false;
                self.silence_alarm();
                Cue::Switch
            }
        };
        vec![Effect::Play(cue)]
    }

    fn alarm_cue(&self) -> Cue {
        Cue::Alarm(self.selected_alarm)
    }

    fn activate_alarm(&mut self, now: Instant) {
        self.alarm_active = true;
        self.blink_visible = true;
        self.last_alarm_play = Some(now);
        self.last_blink_toggle = Some(now);
        self.colon_visible = true;
        self.last_colon_toggle = None;
        self.stop_prompt_visible = true;
    }

    fn silence_alarm(&mut self) {
        self.alarm_active = false;
        self.blink_visible = true;
        self.last_alarm_play = None;
        self.last_blink_toggle = None;
        self.colon_visible = true;
        self.last_colon_toggle = None;
        self.stop_prompt_visible = false;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION, 0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALARMS: usize = 5;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn plays(effects: &[Effect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, Effect::Play(Cue::Alarm(_))))
            .count()
    }

    fn notifies(effects: &[Effect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, Effect::Notify { .. }))
            .count()
    }

    /// Running timer whose first tick has already happened at `t0`
    fn running(remaining: Duration, t0: Instant) -> Timer {
        let mut timer = Timer::new(remaining, 1, ALARMS);
        timer.apply(Command::ToggleRun);
        assert!(timer.tick(t0).is_empty());
        timer
    }

    /// Timer that raised its alarm at the returned instant
    fn alarming() -> (Timer, Instant) {
        let t0 = Instant::now();
        let mut timer = running(ms(500), t0);
        let fired = t0 + ms(500);
        let effects = timer.tick(fired);
        assert_eq!(plays(&effects), 1);
        (timer, fired)
    }

    #[test]
    fn test_initial_state() {
        let timer = Timer::new(DEFAULT_DURATION, 1, ALARMS);
        assert_eq!(timer.remaining(), Duration::from_secs(600));
        assert!(!timer.is_running());
        assert!(!timer.is_alarm_active());
        assert!(timer.countdown_visible());
        assert!(timer.colon_visible());
        assert_eq!(timer.selected_alarm(), 1);
        assert_eq!(timer.countdown_text(), "10:00");
    }

    #[test]
    fn test_out_of_range_selection_resets() {
        let timer = Timer::new(DEFAULT_DURATION, 9, ALARMS);
        assert_eq!(timer.selected_alarm(), 0);
    }

    #[test]
    fn test_countdown_subtracts_elapsed_time() {
        let t0 = Instant::now();
        let mut timer = running(Duration::from_secs(10), t0);

        let mut now = t0;
        let mut expected = Duration::from_secs(10);
        for step in [250, 250, 300, 1000, 0, 2200] {
            now += ms(step);
            timer.tick(now);
            expected = expected.saturating_sub(ms(step));
            assert_eq!(timer.remaining(), expected);
        }
    }

    #[test]
    fn test_paused_timer_does_not_count() {
        let t0 = Instant::now();
        let mut timer = Timer::new(Duration::from_secs(10), 0, ALARMS);
        timer.tick(t0);
        timer.tick(t0 + Duration::from_secs(5));
        assert_eq!(timer.remaining(), Duration::from_secs(10));
    }

    #[test]
    fn test_backward_clock_is_ignored() {
        let t0 = Instant::now() + Duration::from_secs(10);
        let mut timer = running(Duration::from_secs(10), t0);
        timer.tick(t0 - Duration::from_secs(3));
        assert_eq!(timer.remaining(), Duration::from_secs(10));
        timer.tick(t0 - Duration::from_secs(2));
        assert_eq!(timer.remaining(), Duration::from_secs(9));
    }

    #[test]
    fn test_zero_crossing_raises_alarm_once() {
        let t0 = Instant::now();
        let mut timer = running(ms(800), t0);

        let effects = timer.tick(t0 + ms(1000));
        assert_eq!(timer.remaining(), Duration::ZERO);
        assert!(timer.is_alarm_active());
        assert!(!timer.is_running());
        assert!(timer.is_stop_prompt_visible());
        assert_eq!(plays(&effects), 1);
        assert_eq!(notifies(&effects), 1);
        assert_eq!(
            effects,
            vec![
                Effect::Notify {
                    title: NOTIFY_TITLE,
                    body: NOTIFY_BODY
                },
                Effect::Play(Cue::Alarm(1)),
            ]
        );

        let later = timer.tick(t0 + ms(1250));
        assert_eq!(plays(&later), 0);
        assert_eq!(notifies(&later), 0);
    }

    #[test]
    fn test_alarm_repeats_every_minute() {
        let (mut timer, fired) = alarming();

        let effects = timer.tick(fired + Duration::from_secs(59));
        assert_eq!(plays(&effects), 0);

        let effects = timer.tick(fired + Duration::from_secs(61));
        assert_eq!(plays(&effects), 1);

        // Anchor moved to the replay
        let effects = timer.tick(fired + Duration::from_secs(62));
        assert_eq!(plays(&effects), 0);
        let effects = timer.tick(fired + Duration::from_secs(121));
        assert_eq!(plays(&effects), 1);
    }

    #[test]
    fn test_alarm_flashes_display() {
        let (mut timer, fired) = alarming();
        assert!(timer.countdown_visible());

        timer.tick(fired + ms(100));
        assert!(timer.countdown_visible());
        timer.tick(fired + ms(250));
        assert!(!timer.countdown_visible());
        timer.tick(fired + ms(500));
        assert!(timer.countdown_visible());
        timer.tick(fired + ms(750));
        assert!(!timer.countdown_visible());
    }

    #[test]
    fn test_silence_restores_display() {
        let (mut timer, fired) = alarming();
        timer.tick(fired + ms(250));
        assert!(!timer.countdown_visible());

        let effects = timer.apply(Command::Stop);
        assert_eq!(effects, vec![Effect::Play(Cue::Stop)]);
        assert!(!timer.is_alarm_active());
        assert!(!timer.is_stop_prompt_visible());
        assert!(timer.countdown_visible());

        let effects = timer.tick(fired + Duration::from_secs(120));
        assert_eq!(plays(&effects), 0);
    }

    #[test]
    fn test_adding_time_during_alarm_silences_it() {
        let (mut timer, fired) = alarming();
        timer.apply(Command::AddMinute);
        assert!(!timer.is_alarm_active());
        assert_eq!(timer.remaining(), MINUTE);
        let effects = timer.tick(fired + Duration::from_secs(61));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_toggle_during_alarm_silences_and_restarts() {
        let (mut timer, fired) = alarming();
        timer.apply(Command::AddMinute);
        let effects = timer.apply(Command::ToggleRun);
        assert_eq!(effects, vec![Effect::Play(Cue::Switch)]);
        assert!(timer.is_running());
        assert!(!timer.is_alarm_active());

        timer.tick(fired + Duration::from_secs(1));
        assert_eq!(timer.remaining(), Duration::from_secs(59));
    }

    #[test]
    fn test_colon_blinks_only_while_running() {
        let t0 = Instant::now();
        let mut timer = running(Duration::from_secs(60), t0);
        assert!(timer.colon_visible());

        timer.tick(t0 + ms(250));
        assert!(timer.colon_visible());
        timer.tick(t0 + ms(500));
        assert!(!timer.colon_visible());
        timer.tick(t0 + ms(1000));
        assert!(timer.colon_visible());
        timer.tick(t0 + ms(1500));
        assert!(!timer.colon_visible());

        timer.apply(Command::ToggleRun);
        timer.tick(t0 + ms(1750));
        assert!(timer.colon_visible());
    }

    #[test]
    fn test_stop_on_idle_timer_is_harmless() {
        let mut timer = Timer::new(Duration::from_secs(300), 3, ALARMS);
        let effects = timer.apply(Command::Stop);
        assert_eq!(effects, vec![Effect::Play(Cue::Stop)]);
        assert_eq!(timer.remaining(), Duration::from_secs(300));
        assert_eq!(timer.selected_alarm(), 3);
        assert!(!timer.is_alarm_active());
        assert!(!timer.is_running());

        timer.apply(Command::Stop);
        assert_eq!(timer.remaining(), Duration::from_secs(300));
        assert_eq!(timer.selected_alarm(), 3);
    }

    #[test]
    fn test_subtract_minute_three_tiers() {
        let mut timer = Timer::new(Duration::from_secs(90), 0, ALARMS);
        timer.apply(Command::SubtractMinute);
        assert_eq!(timer.remaining(), Duration::from_secs(30));

        // At or below a minute only a second comes off
        timer.apply(Command::SubtractMinute);
        assert_eq!(timer.remaining(), Duration::from_secs(29));

        let mut exact = Timer::new(MINUTE, 0, ALARMS);
        exact.apply(Command::SubtractMinute);
        assert_eq!(exact.remaining(), Duration::from_secs(59));

        let mut tiny = Timer::new(ms(400), 0, ALARMS);
        tiny.apply(Command::SubtractMinute);
        assert_eq!(tiny.remaining(), SECOND);
    }

    #[test]
    fn test_subtract_minute_never_goes_below_one_second() {
        let mut timer = Timer::new(Duration::from_secs(30), 0, ALARMS);
        for _ in 0..100 {
            let effects = timer.apply(Command::SubtractMinute);
            assert_eq!(effects, vec![Effect::Play(Cue::Adjust)]);
            assert!(timer.remaining() >= SECOND);
        }
        assert_eq!(timer.remaining(), SECOND);
    }

    #[test]
    fn test_hour_adjustments() {
        let mut timer = Timer::new(Duration::from_secs(90), 0, ALARMS);
        timer.apply(Command::AddHour);
        assert_eq!(timer.remaining(), Duration::from_secs(3690));
        timer.apply(Command::SubtractHour);
        assert_eq!(timer.remaining(), Duration::from_secs(90));
        timer.apply(Command::SubtractHour);
        assert_eq!(timer.remaining(), MINUTE);

        let mut exact = Timer::new(HOUR, 0, ALARMS);
        exact.apply(Command::SubtractHour);
        assert_eq!(exact.remaining(), MINUTE);
    }

    #[test]
    fn test_additions_stop_at_display_limit() {
        let mut timer = Timer::new(Duration::MAX, 0, ALARMS);
        assert_eq!(timer.remaining(), MAX_REMAINING);

        timer.apply(Command::AddHour);
        assert_eq!(timer.remaining(), MAX_REMAINING);
        timer.apply(Command::AddMinute);
        assert_eq!(timer.remaining(), MAX_REMAINING);
        assert_eq!(timer.countdown_text(), "999:59");

        timer.apply(Command::SubtractHour);
        assert_eq!(timer.remaining(), MAX_REMAINING - HOUR);
    }

    #[test]
    fn test_cycle_alarm_wraps() {
        let (mut timer, _) = alarming();
        let start = timer.selected_alarm();
        for i in 1..=ALARMS {
            let effects = timer.apply(Command::CycleAlarm);
            assert_eq!(effects, vec![Effect::Play(Cue::Adjust)]);
            assert_eq!(timer.selected_alarm(), (start + i) % ALARMS);
        }
        assert_eq!(timer.selected_alarm(), start);
        // Cycling does not silence
        assert!(timer.is_alarm_active());
    }

    #[test]
    fn test_repeat_uses_newly_selected_alarm() {
        let (mut timer, fired) = alarming();
        timer.apply(Command::CycleAlarm);
        let effects = timer.tick(fired + Duration::from_secs(60));
        assert_eq!(effects, vec![Effect::Play(Cue::Alarm(2))]);
    }

    #[test]
    fn test_set_minutes_stops_and_silences() {
        let (mut timer, _) = alarming();
        let effects = timer.apply(Command::SetMinutes(7));
        assert_eq!(effects, vec![Effect::Play(Cue::Switch)]);
        assert_eq!(timer.remaining(), Duration::from_secs(420));
        assert!(!timer.is_running());
        assert!(!timer.is_alarm_active());
    }

    #[test]
    fn test_quit() {
        let mut timer = Timer::default();
        assert_eq!(timer.apply(Command::Quit), vec![Effect::Quit]);
    }

    #[test]
    fn test_countdown_text() {
        let mut timer = Timer::new(Duration::from_millis(65_900), 0, ALARMS);
        assert_eq!(timer.countdown_text(), "01:05");
        timer.apply(Command::AddHour);
        assert_eq!(timer.countdown_text(), "61:05");
        timer.apply(Command::AddHour);
        assert_eq!(timer.countdown_text(), "121:05");
    }
}
