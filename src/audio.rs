#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::sounds::SoundClip;
use crate::synth::SAMPLE_RATE;

/// How often finished voices are reaped
const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device available")]
    NoDevice,
    #[error("Failed to query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("Unsupported output sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),
    #[error("Failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("Failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("Audio thread unavailable: {0}")]
    Thread(String),
}

/// Something that can play a clip without blocking the caller
pub trait Playback: Send + Sync {
    fn play(&self, clip: &SoundClip);
}

/// Ring the terminal bell
pub fn ring_bell() {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}

/// Plays clips on the default output device.
///
/// The device is opened once by a dedicated audio thread; construction waits
/// for that thread to report readiness. If the device cannot be opened every
/// request rings the terminal bell instead.
pub struct AudioPlayer {
    request_tx: Option<Sender<Arc<[u8]>>>,
}

impl AudioPlayer {
    pub fn start(volume: f32) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<Arc<[u8]>>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();

        let spawned = std::thread::Builder::new()
            .name("nag-audio".to_string())
            .spawn(move || audio_thread(volume, request_rx, ready_tx));

        let ready = match spawned {
            Ok(_) => ready_rx
                .recv()
                .unwrap_or_else(|e| Err(AudioError::Thread(e.to_string()))),
            Err(e) => Err(AudioError::Thread(e.to_string())),
        };

        match ready {
            Ok(()) => Self {
                request_tx: Some(request_tx),
            },
            Err(e) => {
                tracing::warn!("Audio output unavailable, falling back to terminal bell: {e}");
                Self::bell_only()
            }
        }
    }

    /// A player that only ever rings the bell
    pub fn bell_only() -> Self {
        Self { request_tx: None }
    }

    pub fn is_available(&self) -> bool {
        self.request_tx.is_some()
    }
}

impl Playback for AudioPlayer {
    fn play(&self, clip: &SoundClip) {
        if clip.is_empty() {
            ring_bell();
            return;
        }
        let Some(tx) = &self.request_tx else {
            ring_bell();
            return;
        };
        if tx.send(Arc::clone(&clip.pcm)).is_err() {
            tracing::warn!("Audio thread has exited, ringing bell for {}", clip.name);
            ring_bell();
        }
    }
}

/// Output device and the stream format chosen for it
struct Output {
    device: Device,
    config: StreamConfig,
    format: SampleFormat,
}

impl Output {
    fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        tracing::info!(
            "Using audio output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let wanted = cpal::SampleRate(SAMPLE_RATE);
        let preferred = device.supported_output_configs().ok().and_then(|configs| {
            configs
                .filter(|c| c.min_sample_rate() <= wanted && c.max_sample_rate() >= wanted)
                .filter(|c| is_supported_format(c.sample_format()))
                .min_by_key(|c| c.channels())
                .map(|c| c.with_sample_rate(wanted))
        });
        let supported = match preferred {
            Some(config) => config,
            None => device.default_output_config()?,
        };

        let format = supported.sample_format();
        if !is_supported_format(format) {
            return Err(AudioError::UnsupportedFormat(format));
        }
        let config: StreamConfig = supported.into();
        tracing::info!(
            "Audio config: {}Hz, {} channels, {:?}",
            config.sample_rate.0,
            config.channels,
            format
        );

        Ok(Self {
            device,
            config,
            format,
        })
    }

    fn start_voice(&self, pcm: Arc<[u8]>, volume: f32) -> Result<Voice, AudioError> {
        let playing = Arc::new(AtomicBool::new(true));
        let source = ClipSource::new(pcm, self.config.sample_rate.0, volume);

        let stream = match self.format {
            SampleFormat::F32 => self.build_stream::<f32>(source, Arc::clone(&playing))?,
            SampleFormat::I16 => self.build_stream::<i16>(source, Arc::clone(&playing))?,
            SampleFormat::U16 => self.build_stream::<u16>(source, Arc::clone(&playing))?,
            other => return Err(AudioError::UnsupportedFormat(other)),
        };
        stream.play()?;

        Ok(Voice {
            _stream: stream,
            playing,
        })
    }

    fn build_stream<T>(
        &self,
        mut source: ClipSource,
        playing: Arc<AtomicBool>,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = usize::from(self.config.channels);
        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                source.fill(data, channels, &playing);
            },
            |err| tracing::warn!("Audio stream error: {err}"),
            None,
        )?;
        Ok(stream)
    }
}

fn is_supported_format(format: SampleFormat) -> bool {
    matches!(
        format,
        SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
    )
}

/// One clip being played. Dropping it releases the output stream.
struct Voice {
    _stream: Stream,
    playing: Arc<AtomicBool>,
}

impl Voice {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }
}

fn audio_thread(
    volume: f32,
    requests: Receiver<Arc<[u8]>>,
    ready: Sender<Result<(), AudioError>>,
) {
    let output = match Output::open() {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    if ready.send(Ok(())).is_err() {
        return;
    }

    let mut voices: Vec<Voice> = Vec::new();
    loop {
        match requests.recv_timeout(POLL_INTERVAL) {
            Ok(pcm) => match output.start_voice(pcm, volume) {
                Ok(voice) => voices.push(voice),
                Err(e) => {
                    tracing::warn!("Failed to play clip: {e}");
                    ring_bell();
                }
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        voices.retain(|voice| {
            let playing = voice.is_playing();
            if !playing {
                tracing::trace!("Releasing finished voice");
            }
            playing
        });
    }
    tracing::debug!("Audio thread exiting with {} active voices", voices.len());
}

/// Reads 16-bit little-endian mono PCM at [`SAMPLE_RATE`] as f32 frames at the
/// device rate
struct ClipSource {
    pcm: Arc<[u8]>,
    position: f64,
    step: f64,
    volume: f32,
}

impl ClipSource {
    fn new(pcm: Arc<[u8]>, device_rate: u32, volume: f32) -> Self {
        let step = if device_rate == 0 {
            1.0
        } else {
            f64::from(SAMPLE_RATE) / f64::from(device_rate)
        };
        Self {
            pcm,
            position: 0.0,
            step,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    fn next_sample(&mut self) -> Option<f32> {
        let index = self.position as usize;
        let bytes = self.pcm.get(index * 2..index * 2 + 2)?;
        self.position += self.step;
        let value = i16::from_le_bytes([bytes[0], bytes[1]]);
        Some(f32::from(value) / f32::from(i16::MAX) * self.volume)
    }

    fn fill<T>(&mut self, data: &mut [T], channels: usize, playing: &AtomicBool)
    where
        T: SizedSample + FromSample<f32>,
    {
        for frame in data.chunks_mut(channels.max(1)) {
            let value = match self.next_sample() {
                Some(sample) => sample,
                None => {
                    playing.store(false, Ordering::Relaxed);
                    0.0
                }
            };
            let value = T::from_sample(value);
            for sample in frame {
                *sample = value;
            }
        }
    }
}
