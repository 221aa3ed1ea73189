//! chordmap-services: Chord synthesis, sequenced playback and audio output

pub mod audio_engine;
pub mod audio_io;
pub mod render;
pub mod sequencer;
pub mod voice;

pub use audio_engine::{
    chord_frequencies, AudioEngine, AudioEngineError, EngineState,
    DEFAULT_CHORD_DURATION, DEFAULT_MASTER_GAIN, DEFAULT_OCTAVE, DEFAULT_SAMPLE_RATE,
};
pub use audio_io::{
    AudioOutputError, AudioOutputService, OutputDeviceInfo, RealtimeOutputStream, SampleSource,
};
pub use render::render_progression;
pub use sequencer::{chord_duration, PlaybackHandle, PlaybackStep};
pub use voice::{Envelope, Voice};
