//! Offline rendering of progressions

use tracing::info;

use crate::audio_engine::{AudioEngineError, EngineState};
use crate::sequencer::{chord_duration, SOUNDING_RATIO};

/// Render a progression to mono samples exactly as sequenced playback would
/// sound it: one step per chord, each chord sounding for 95% of its step.
pub fn render_progression<S: AsRef<str>>(
    chords: &[S],
    bpm: f64,
    sample_rate: u32,
) -> Result<Vec<f32>, AudioEngineError> {
    let step = chord_duration(bpm)?.as_secs_f64();
    let sample_rate = sample_rate.max(1);
    let step_frames = ((step * sample_rate as f64).round() as usize).max(1);

    let state = EngineState::new();
    state.set_sample_rate(sample_rate);

    let mut samples = vec![0.0f32; step_frames * chords.len()];
    for (chord, block) in chords.iter().zip(samples.chunks_mut(step_frames)) {
        state.start_chord(chord.as_ref(), step * SOUNDING_RATIO);
        state.render(block, sample_rate, 1);
    }

    info!(chords = chords.len(), bpm, frames = samples.len(), "Rendered progression");
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_engine::DEFAULT_MASTER_GAIN;
    use crate::voice::PEAK_LEVEL;

    #[test]
    fn test_render_length_and_level() {
        let samples = render_progression(&["C", "G"], 120.0, 8000).unwrap();
        assert_eq!(samples.len(), 16_000);

        let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!(peak > 0.0);
        assert!(peak <= 3.0 * PEAK_LEVEL as f32 * DEFAULT_MASTER_GAIN + 1e-6);
    }

    #[test]
    fn test_chord_gap_is_silent() {
        // 1s steps at 120 BPM; the chord sounds for 0.95s then releases to zero
        let samples = render_progression(&["Am"], 120.0, 1000).unwrap();
        assert_eq!(samples.len(), 1000);
        assert!(samples[960..].iter().all(|s| *s == 0.0));
        assert!(samples[100..900].iter().any(|s| *s != 0.0));
    }

    #[test]
    fn test_render_rejects_bad_tempo() {
        assert!(render_progression(&["C"], -1.0, 8000).is_err());
        assert!(render_progression::<&str>(&[], 90.0, 8000).unwrap().is_empty());
    }
}
