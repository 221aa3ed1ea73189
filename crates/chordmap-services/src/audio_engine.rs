//! Audio engine for chord preview and progression playback

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chordmap_core::{split_chord_name, ChordQuality, Note};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audio_io::{AudioOutputError, RealtimeOutputStream, SampleSource};
use crate::sequencer::{self, PlaybackHandle, PlaybackStep, SequenceControl};
use crate::voice::Voice;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_MASTER_GAIN: f32 = 0.3;
pub const DEFAULT_OCTAVE: i32 = 4;
/// Preview length for a single chord, in seconds
pub const DEFAULT_CHORD_DURATION: f64 = 1.0;

#[derive(Debug, Error)]
pub enum AudioEngineError {
    #[error("Audio output error: {0}")]
    Output(#[from] AudioOutputError),
    #[error("Engine already running")]
    AlreadyRunning,
    #[error("Engine not running")]
    NotRunning,
    #[error("Failed to spawn sequencer thread: {0}")]
    Spawn(#[from] io::Error),
    #[error("Tempo must be a positive number of beats per minute, got {0}")]
    InvalidTempo(f64),
}

/// Frequencies of a chord's tones, root first.
///
/// Unknown roots give an empty set (the chord stays silent); unknown quality
/// suffixes fall back to a major triad.
pub fn chord_frequencies(chord: &str, octave: i32) -> Vec<f64> {
    let (root, suffix) = split_chord_name(chord);
    let Ok(root) = Note::parse(root) else {
        warn!(chord, "Unknown root note, chord will be silent");
        return Vec::new();
    };

    let base = root.frequency(octave);
    ChordQuality::resolve(suffix)
        .intervals()
        .iter()
        .map(|&offset| base * 2f64.powf(offset as f64 / 12.0))
        .collect()
}

/// Audio engine state shared between the caller, the sequencer and the audio thread
pub struct EngineState {
    /// Currently sounding (or fading) voices
    voices: Mutex<Vec<Voice>>,
    /// Output sample rate, updated by the stream callback
    sample_rate: AtomicU32,
    /// Master gain as f32 bits
    master_gain: AtomicU32,
    /// The active sequence, if any
    sequence: Mutex<Option<SequenceControl>>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            voices: Mutex::new(Vec::new()),
            sample_rate: AtomicU32::new(DEFAULT_SAMPLE_RATE),
            master_gain: AtomicU32::new(DEFAULT_MASTER_GAIN.to_bits()),
            sequence: Mutex::new(None),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::SeqCst)
    }

    pub fn set_sample_rate(&self, sample_rate: u32) {
        self.sample_rate.store(sample_rate.max(1), Ordering::SeqCst);
    }

    pub fn master_gain(&self) -> f32 {
        f32::from_bits(self.master_gain.load(Ordering::SeqCst))
    }

    /// Set master gain, clamped to [0, 1]
    pub fn set_master_gain(&self, gain: f32) {
        let gain = if gain.is_nan() { 0.0 } else { gain.clamp(0.0, 1.0) };
        self.master_gain.store(gain.to_bits(), Ordering::SeqCst);
    }

    /// Voices that have not finished yet (fading ones included)
    pub fn voice_count(&self) -> usize {
        self.voices
            .lock()
            .map(|voices| voices.iter().filter(|v| !v.is_finished()).count())
            .unwrap_or(0)
    }

    /// Fade out what is sounding, then start one voice per chord tone.
    ///
    /// Returns whether the chord started.
    pub(crate) fn start_chord(&self, chord: &str, duration: f64) -> bool {
        let frequencies = chord_frequencies(chord, DEFAULT_OCTAVE);

        let Ok(mut voices) = self.voices.lock() else {
            return false;
        };

        let sample_rate = self.sample_rate();
        for voice in voices.iter_mut() {
            voice.stop(sample_rate);
        }
        voices.retain(|v| !v.is_finished());
        voices.extend(frequencies.iter().map(|&f| Voice::new(f, duration)));

        debug!(chord, duration, tones = frequencies.len(), "Chord started");
        true
    }

    /// Fade out every sounding voice
    pub(crate) fn stop_voices(&self) {
        let Ok(mut voices) = self.voices.lock() else {
            return;
        };
        let sample_rate = self.sample_rate();
        for voice in voices.iter_mut() {
            voice.stop(sample_rate);
        }
    }

    pub(crate) fn replace_sequence(&self, control: SequenceControl) -> Option<SequenceControl> {
        self.sequence.lock().ok()?.replace(control)
    }

    pub(crate) fn take_sequence(&self) -> Option<SequenceControl> {
        self.sequence.lock().ok()?.take()
    }

    pub fn is_sequence_active(&self) -> bool {
        self.sequence
            .lock()
            .map(|s| s.as_ref().is_some_and(SequenceControl::is_active))
            .unwrap_or(false)
    }

    /// Mix all voices into an interleaved output buffer (called from audio thread)
    pub fn render(&self, buffer: &mut [f32], sample_rate: u32, channels: u16) {
        self.set_sample_rate(sample_rate);
        let gain = self.master_gain();
        let channels = channels.max(1) as usize;

        let Ok(mut voices) = self.voices.lock() else {
            buffer.fill(0.0);
            return;
        };

        for frame in buffer.chunks_mut(channels) {
            let mix: f32 = voices.iter_mut().map(|v| v.next_sample(sample_rate)).sum();
            frame.fill(mix * gain);
        }

        voices.retain(|v| !v.is_finished());
    }
}

impl SampleSource for EngineState {
    fn fill_buffer(&self, buffer: &mut [f32], sample_rate: u32, channels: u16) {
        self.render(buffer, sample_rate, channels);
    }
}

/// Audio engine: owns the output stream and the shared playback state
pub struct AudioEngine {
    state: Arc<EngineState>,
    stream: Option<RealtimeOutputStream>,
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine {
    /// Create an engine without opening a device; call `start` to hear it
    pub fn new() -> Self {
        Self {
            state: Arc::new(EngineState::new()),
            stream: None,
        }
    }

    /// Get shared state
    pub fn state(&self) -> Arc<EngineState> {
        self.state.clone()
    }

    /// Open the default output device and start mixing
    pub fn start(&mut self) -> Result<(), AudioEngineError> {
        if self.stream.is_some() {
            return Err(AudioEngineError::AlreadyRunning);
        }

        let stream = RealtimeOutputStream::start(self.state.clone())?;
        info!(device = %stream.device().name, "Audio engine started");
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop the audio engine
    pub fn stop(&mut self) -> Result<(), AudioEngineError> {
        let stream = self.stream.take().ok_or(AudioEngineError::NotRunning)?;
        self.stop_all();
        stream.stop();
        info!("Audio engine stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Sound a chord for `duration` seconds, cutting off whatever was sounding
    pub fn play_chord(&self, chord: &str, duration: f64) {
        self.state.start_chord(chord, duration);
    }

    /// Sound a chord for the default preview length
    pub fn preview_chord(&self, chord: &str) {
        self.play_chord(chord, DEFAULT_CHORD_DURATION);
    }

    /// Play chords in order at `bpm`, two beats each, reporting every step.
    ///
    /// Any running sequence is cancelled first.
    pub fn play_progression<F>(
        &self,
        chords: Vec<String>,
        bpm: f64,
        on_step: F,
    ) -> Result<PlaybackHandle, AudioEngineError>
    where
        F: FnMut(PlaybackStep) + Send + 'static,
    {
        self.stop_all();
        let (control, handle) = sequencer::spawn(self.state.clone(), chords, bpm, on_step)?;
        if let Some(previous) = self.state.replace_sequence(control) {
            previous.cancel();
        }
        Ok(handle)
    }

    /// Cancel the running sequence and fade out every voice
    pub fn stop_all(&self) {
        if let Some(control) = self.state.take_sequence() {
            if control.is_active() {
                info!("Sequence cancelled");
            }
            control.cancel();
        }
        self.state.stop_voices();
    }

    /// Set master volume, clamped to [0, 1]
    pub fn set_volume(&self, volume: f32) {
        self.state.set_master_gain(volume);
    }

    pub fn volume(&self) -> f32 {
        self.state.master_gain()
    }

    /// Whether a sequence is currently playing
    pub fn is_playing(&self) -> bool {
        self.state.is_sequence_active()
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop_all();
        if let Some(stream) = self.stream.take() {
            stream.stop();
        }
    }
}
