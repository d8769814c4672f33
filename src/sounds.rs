use std::sync::Arc;

use crate::synth::{synthesize, ToneSegment};

/// A named, pre-rendered PCM clip. An empty buffer means "ring the bell instead".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundClip {
    pub name: String,
    pub pcm: Arc<[u8]>,
}

impl SoundClip {
    pub fn from_script(name: impl Into<String>, script: &[ToneSegment]) -> Self {
        Self {
            name: name.into(),
            pcm: synthesize(script).into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }
}

/// Which catalog clip a state transition asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Switch,
    Stop,
    Adjust,
    Alarm(usize),
}

/// Base name of the alarm selected when nothing else is configured
const DEFAULT_ALARM: &str = "siren";

/// Name reported when no alarm clip exists
const BELL_NAME: &str = "Bell";

/// Fixed set of clips synthesized once at startup
#[derive(Debug, Clone)]
pub struct SoundCatalog {
    alarms: Vec<SoundClip>,
    default_alarm: usize,
    switch: SoundClip,
    stop: SoundClip,
    adjust: SoundClip,
}

impl SoundCatalog {
    /// Synthesize every clip
    pub fn load() -> Self {
        let alarm_scripts: [(&str, Vec<ToneSegment>); 5] = [
            ("5-bip", five_bip_tone()),
            ("siren", siren_tone()),
            ("japan", japan_tone()),
            ("quad", quad_tone()),
            ("toot", toot_tone()),
        ];

        let mut alarms = Vec::with_capacity(alarm_scripts.len());
        let mut default_alarm = 0;
        for (idx, (base, script)) in alarm_scripts.iter().enumerate() {
            alarms.push(SoundClip::from_script(pretty_name(base), script));
            if *base == DEFAULT_ALARM {
                default_alarm = idx;
            }
        }

        Self::from_parts(
            alarms,
            default_alarm,
            SoundClip::from_script("Switch", &switch_tone()),
            SoundClip::from_script("Stop", &stop_tone()),
            SoundClip::from_script("Rad", &adjust_tone()),
        )
    }

    /// Assemble a catalog, guaranteeing at least one alarm and a valid default
    pub fn from_parts(
        mut alarms: Vec<SoundClip>,
        default_alarm: usize,
        switch: SoundClip,
        stop: SoundClip,
        adjust: SoundClip,
    ) -> Self {
        let mut default_alarm = default_alarm;
        if alarms.is_empty() {
            alarms.push(SoundClip::from_script("Alarm", &siren_tone()));
            default_alarm = 0;
        }
        if default_alarm >= alarms.len() {
            default_alarm = 0;
        }

        Self {
            alarms,
            default_alarm,
            switch,
            stop,
            adjust,
        }
    }

    pub fn alarms(&self) -> &[SoundClip] {
        &self.alarms
    }

    pub fn alarm_count(&self) -> usize {
        self.alarms.len()
    }

    pub fn default_alarm(&self) -> usize {
        self.default_alarm
    }

    /// Case-insensitive lookup of an alarm by display name
    pub fn find_alarm(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.alarms
            .iter()
            .position(|clip| clip.name.eq_ignore_ascii_case(wanted))
    }

    /// Display name of the alarm at `idx` (wrapping)
    pub fn alarm_name(&self, idx: usize) -> &str {
        self.alarm(idx).map_or(BELL_NAME, |clip| clip.name.as_str())
    }

    fn alarm(&self, idx: usize) -> Option<&SoundClip> {
        if self.alarms.is_empty() {
            return None;
        }
        self.alarms.get(idx % self.alarms.len())
    }

    pub fn clip(&self, cue: Cue) -> Option<&SoundClip> {
        match cue {
            Cue::Switch => Some(&self.switch),
            Cue::Stop => Some(&self.stop),
            Cue::Adjust => Some(&self.adjust),
            Cue::Alarm(idx) => self.alarm(idx),
        }
    }
}

/// Title-case a kebab/snake/space separated base name: "5-bip" -> "5 Bip"
pub fn pretty_name(base: &str) -> String {
    let base = base.trim_end_matches(".wav");
    let words: Vec<String> = base
        .split(['-', '_', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let lower = part.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        return base.to_string();
    }
    words.join(" ")
}

fn switch_tone() -> Vec<ToneSegment> {
    vec![
        ToneSegment::tone(880.0, 70, 0.8),
        ToneSegment::rest(30),
        ToneSegment::tone(660.0, 70, 0.7),
    ]
}

fn stop_tone() -> Vec<ToneSegment> {
    vec![
        ToneSegment::tone(440.0, 120, 0.7),
        ToneSegment::rest(40),
        ToneSegment::tone(330.0, 160, 0.7),
    ]
}

fn adjust_tone() -> Vec<ToneSegment> {
    vec![ToneSegment::tone(1200.0, 90, 0.6)]
}

fn siren_tone() -> Vec<ToneSegment> {
    let pattern = [
        ToneSegment::tone(870.0, 160, 0.85),
        ToneSegment::rest(40),
        ToneSegment::tone(650.0, 160, 0.85),
        ToneSegment::rest(40),
    ];
    pattern.iter().copied().cycle().take(pattern.len() * 4).collect()
}

fn japan_tone() -> Vec<ToneSegment> {
    vec![
        ToneSegment::tone(523.25, 110, 0.7), // C5
        ToneSegment::rest(30),
        ToneSegment::tone(659.25, 110, 0.7), // E5
        ToneSegment::rest(30),
        ToneSegment::tone(783.99, 130, 0.7), // G5
        ToneSegment::rest(160),
    ]
}

fn quad_tone() -> Vec<ToneSegment> {
    let bip = ToneSegment::tone(740.0, 80, 0.6);
    vec![
        bip,
        ToneSegment::rest(30),
        bip,
        ToneSegment::rest(30),
        bip,
        ToneSegment::rest(30),
        bip,
    ]
}

fn toot_tone() -> Vec<ToneSegment> {
    vec![
        ToneSegment::tone(330.0, 150, 0.7),
        ToneSegment::rest(40),
        ToneSegment::tone(660.0, 200, 0.7),
    ]
}

fn five_bip_tone() -> Vec<ToneSegment> {
    vec![
        ToneSegment::tone(880.0, 80, 0.7),
        ToneSegment::rest(20),
        ToneSegment::tone(1046.5, 80, 0.7),
        ToneSegment::rest(20),
        ToneSegment::tone(1244.5, 90, 0.7),
    ]
}
