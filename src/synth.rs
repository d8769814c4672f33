#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::time::Duration;

/// Output sample rate of every synthesized clip
pub const SAMPLE_RATE: u32 = 44100;

/// Amplitude used when a segment leaves it unset (zero or negative)
pub const DEFAULT_AMPLITUDE: f64 = 0.6;

/// Length of the linear fade-in and fade-out applied to each tone
const ENVELOPE_SECONDS: f64 = 0.005;

/// One step of a tone script: a sine tone, or a rest when `frequency` is zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSegment {
    pub frequency: f64,
    pub duration: Duration,
    pub amplitude: f64,
}

impl ToneSegment {
    pub const fn tone(frequency: f64, millis: u64, amplitude: f64) -> Self {
        Self {
            frequency,
            duration: Duration::from_millis(millis),
            amplitude,
        }
    }

    pub const fn rest(millis: u64) -> Self {
        Self {
            frequency: 0.0,
            duration: Duration::from_millis(millis),
            amplitude: 0.0,
        }
    }
}

/// Render a tone script into mono 16-bit little-endian PCM at [`SAMPLE_RATE`]
pub fn synthesize(segments: &[ToneSegment]) -> Vec<u8> {
    let mut pcm = Vec::new();
    for segment in segments {
        render_segment(segment, &mut pcm);
    }
    pcm
}

/// Number of samples a segment of the given duration occupies
pub fn sample_count(duration: Duration) -> usize {
    (duration.as_secs_f64() * f64::from(SAMPLE_RATE)).round() as usize
}

fn render_segment(segment: &ToneSegment, pcm: &mut Vec<u8>) {
    let samples = sample_count(segment.duration);
    if samples == 0 {
        return;
    }

    if segment.frequency <= 0.0 {
        pcm.resize(pcm.len() + samples * 2, 0);
        return;
    }

    let amplitude = if segment.amplitude <= 0.0 {
        DEFAULT_AMPLITUDE
    } else {
        segment.amplitude.min(1.0)
    };

    pcm.reserve(samples * 2);
    let step = 2.0 * std::f64::consts::PI * segment.frequency / f64::from(SAMPLE_RATE);
    for i in 0..samples {
        let wave = (step * i as f64).sin();
        let value = wave * amplitude * envelope(i, samples) * f64::from(i16::MAX);
        pcm.extend_from_slice(&(value as i16).to_le_bytes());
    }
}

/// Linear attack/release gain for sample `index` of a `total`-sample tone
pub fn envelope(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ramp = ((ENVELOPE_SECONDS * f64::from(SAMPLE_RATE)).round() as usize).max(1);

    let mut gain = 1.0_f64;
    if index < ramp {
        gain = index as f64 / ramp as f64;
    }
    let tail = total.saturating_sub(index);
    if tail < ramp {
        gain = gain.min(tail as f64 / ramp as f64);
    }
    gain.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples_of(pcm: &[u8]) -> Vec<i16> {
        pcm.chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    #[test]
    fn test_segment_length_matches_duration() {
        let pcm = synthesize(&[ToneSegment::tone(440.0, 70, 0.8)]);
        assert_eq!(pcm.len(), 3087 * 2);

        let odd = ToneSegment {
            frequency: 440.0,
            duration: Duration::from_micros(1_010),
            amplitude: 0.5,
        };
        // 0.00101 * 44100 = 44.541
        assert_eq!(synthesize(&[odd]).len(), 45 * 2);
    }

    #[test]
    fn test_zero_duration_produces_nothing() {
        assert!(synthesize(&[ToneSegment::tone(440.0, 0, 0.8)]).is_empty());
        assert!(synthesize(&[ToneSegment::rest(0)]).is_empty());
        assert!(synthesize(&[]).is_empty());
    }

    #[test]
    fn test_rest_is_silent() {
        let pcm = synthesize(&[ToneSegment::rest(30)]);
        assert_eq!(pcm.len(), 1323 * 2);
        assert!(pcm.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_segments_concatenate() {
        let script = [
            ToneSegment::tone(880.0, 70, 0.8),
            ToneSegment::rest(30),
            ToneSegment::tone(660.0, 70, 0.7),
        ];
        let pcm = synthesize(&script);
        assert_eq!(pcm.len(), (3087 + 1323 + 3087) * 2);

        let samples = samples_of(&pcm);
        assert!(samples[3087..3087 + 1323].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_envelope_starts_and_ends_quiet() {
        let pcm = synthesize(&[ToneSegment::tone(1000.0, 100, 1.0)]);
        let samples = samples_of(&pcm);
        assert_eq!(samples[0], 0);
        assert!(samples.last().unwrap().unsigned_abs() < 200);
        let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 32000);
    }

    #[test]
    fn test_amplitude_defaults_and_clamps() {
        let unset = samples_of(&synthesize(&[ToneSegment::tone(1000.0, 100, 0.0)]));
        let peak = unset.iter().map(|s| s.unsigned_abs()).max().unwrap();
        let expected = (DEFAULT_AMPLITUDE * f64::from(i16::MAX)) as u16;
        assert!(peak <= expected && peak > expected - 100);

        let loud = samples_of(&synthesize(&[ToneSegment::tone(1000.0, 100, 3.0)]));
        let full = samples_of(&synthesize(&[ToneSegment::tone(1000.0, 100, 1.0)]));
        assert_eq!(loud, full);
    }

    #[test]
    fn test_envelope_shape() {
        assert_eq!(envelope(0, 10_000), 0.0);
        assert_eq!(envelope(5_000, 10_000), 1.0);
        assert!(envelope(110, 10_000) > 0.4 && envelope(110, 10_000) < 0.6);
        assert!(envelope(9_999, 10_000) < 0.01);
        assert_eq!(envelope(0, 0), 0.0);
        // Shorter than the ramp: never exceeds 1
        assert!((0..50).all(|i| envelope(i, 50) <= 1.0));
    }
}
