//! Sequenced progression playback on a dedicated thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info};

use crate::audio_engine::{AudioEngineError, EngineState};

/// Beats each chord lasts
pub const BEATS_PER_CHORD: f64 = 2.0;
/// Share of the step a chord actually sounds, so it never bleeds into the next
pub const SOUNDING_RATIO: f64 = 0.95;

/// Step event reported to the playback callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStep {
    /// A chord is about to sound
    Chord { chord: String, index: usize },
    /// The sequence ended, naturally or by cancellation. Always the last event.
    Finished,
}

/// Length of one chord step at `bpm`
pub fn chord_duration(bpm: f64) -> Result<Duration, AudioEngineError> {
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(AudioEngineError::InvalidTempo(bpm));
    }
    Duration::try_from_secs_f64(BEATS_PER_CHORD * 60.0 / bpm)
        .map_err(|_| AudioEngineError::InvalidTempo(bpm))
}

/// Active flag plus the lock a step holds from its flag check until its chord
/// has started
struct StepGate {
    active: AtomicBool,
    step: Mutex<()>,
}

/// Cancels one running sequence
pub(crate) struct SequenceControl {
    gate: Arc<StepGate>,
    cancel_tx: Sender<()>,
    sequencer: ThreadId,
}

impl SequenceControl {
    pub(crate) fn is_active(&self) -> bool {
        self.gate.active.load(Ordering::SeqCst)
    }

    /// Clear the active flag and wake the sequencer out of its wait.
    ///
    /// Waits for a step already past its flag check, so once this returns no
    /// further chord is reported or started. Called from inside a step callback
    /// it returns at once; that step's chord is then skipped.
    pub(crate) fn cancel(self) {
        if thread::current().id() == self.sequencer {
            self.gate.active.store(false, Ordering::SeqCst);
        } else {
            let _step = self.gate.step.lock();
            self.gate.active.store(false, Ordering::SeqCst);
        }
        let _ = self.cancel_tx.try_send(());
    }
}

/// Completion signal of a sequence
pub struct PlaybackHandle {
    done: Arc<AtomicBool>,
    done_rx: Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    /// Block until the sequence has finished
    pub fn wait(mut self) {
        let _ = self.done_rx.recv();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// Wait up to `timeout`; true when the sequence has finished
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_done() {
            return true;
        }
        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => self.is_done(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}

/// Start a sequence thread over `state`
pub(crate) fn spawn<F>(
    state: Arc<EngineState>,
    chords: Vec<String>,
    bpm: f64,
    mut on_step: F,
) -> Result<(SequenceControl, PlaybackHandle), AudioEngineError>
where
    F: FnMut(PlaybackStep) + Send + 'static,
{
    let step = chord_duration(bpm)?;
    let sounding = step.as_secs_f64() * SOUNDING_RATIO;

    let gate = Arc::new(StepGate {
        active: AtomicBool::new(true),
        step: Mutex::new(()),
    });
    let done = Arc::new(AtomicBool::new(false));
    let (cancel_tx, cancel_rx) = bounded::<()>(1);
    let (done_tx, done_rx) = bounded::<()>(1);

    let thread_gate = gate.clone();
    let thread_done = done.clone();

    let thread = thread::Builder::new()
        .name("chordmap-sequencer".to_string())
        .spawn(move || {
            info!(chords = chords.len(), bpm, "Sequence started");
            let mut completed = true;

            for (index, chord) in chords.iter().enumerate() {
                let started = {
                    let Ok(_step) = thread_gate.step.lock() else {
                        completed = false;
                        break;
                    };
                    if thread_gate.active.load(Ordering::SeqCst) {
                        debug!(index, chord = chord.as_str(), "Sequence step");
                        on_step(PlaybackStep::Chord { chord: chord.clone(), index });
                        thread_gate.active.load(Ordering::SeqCst) && state.start_chord(chord, sounding)
                    } else {
                        false
                    }
                };
                if !started {
                    completed = false;
                    break;
                }

                match cancel_rx.recv_timeout(step) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        completed = false;
                        break;
                    }
                }
            }

            thread_gate.active.store(false, Ordering::SeqCst);
            on_step(PlaybackStep::Finished);
            thread_done.store(true, Ordering::SeqCst);
            let _ = done_tx.send(());

            if completed {
                info!("Sequence finished");
            }
        })?;

    let control = SequenceControl {
        gate,
        cancel_tx,
        sequencer: thread.thread().id(),
    };
    let handle = PlaybackHandle {
        done,
        done_rx,
        thread: Some(thread),
    };
    Ok((control, handle))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::audio_engine::AudioEngine;

    fn chords(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_chord_duration() {
        let d = chord_duration(90.0).unwrap();
        assert!((d.as_secs_f64() - 4.0 / 3.0).abs() < 1e-9);
        assert!(matches!(chord_duration(0.0), Err(AudioEngineError::InvalidTempo(_))));
        assert!(matches!(chord_duration(-60.0), Err(AudioEngineError::InvalidTempo(_))));
        assert!(matches!(chord_duration(f64::NAN), Err(AudioEngineError::InvalidTempo(_))));
    }

    #[test]
    fn test_sequence_steps_and_spacing() {
        let engine = AudioEngine::new();
        let (tx, rx) = crossbeam_channel::unbounded();

        let handle = engine
            .play_progression(chords(&["C", "G", "Am", "F"]), 90.0, move |step| {
                let _ = tx.send((Instant::now(), step));
            })
            .unwrap();
        assert!(engine.is_playing());

        assert!(handle.wait_timeout(Duration::from_secs(10)));
        assert!(!engine.is_playing());

        let events: Vec<(Instant, PlaybackStep)> = rx.try_iter().collect();
        assert_eq!(events.len(), 5);
        for (index, name) in ["C", "G", "Am", "F"].iter().enumerate() {
            assert_eq!(events[index].1, PlaybackStep::Chord { chord: name.to_string(), index });
        }
        assert_eq!(events[4].1, PlaybackStep::Finished);

        for pair in events[..4].windows(2) {
            let gap = pair[1].0.duration_since(pair[0].0).as_secs_f64();
            assert!((1.30..1.45).contains(&gap), "gap = {gap}");
        }
    }

    #[test]
    fn test_stop_all_mid_sequence() {
        let engine = AudioEngine::new();
        let (tx, rx) = crossbeam_channel::unbounded();

        let handle = engine
            .play_progression(chords(&["C", "F", "G", "C"]), 90.0, move |step| {
                let _ = tx.send(step);
            })
            .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(first, PlaybackStep::Chord { chord: "C".to_string(), index: 0 });
        thread::sleep(Duration::from_millis(200));

        let stopped_at = Instant::now();
        engine.stop_all();
        assert!(handle.wait_timeout(Duration::from_millis(500)));
        assert!(stopped_at.elapsed() < Duration::from_millis(500));

        let rest: Vec<PlaybackStep> = rx.try_iter().collect();
        assert_eq!(rest, vec![PlaybackStep::Finished]);
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_stop_all_waits_for_step_in_progress() {
        let engine = AudioEngine::new();
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (events_tx, events_rx) = crossbeam_channel::unbounded();

        let handle = engine
            .play_progression(chords(&["C", "F", "G"]), 600.0, move |step| {
                if matches!(step, PlaybackStep::Chord { index: 0, .. }) {
                    let _ = entered_tx.send(());
                    thread::sleep(Duration::from_millis(150));
                }
                let _ = events_tx.send(step);
            })
            .unwrap();

        entered_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        engine.stop_all();

        // the step that was running when stop_all began has fully reported
        let before: Vec<PlaybackStep> = events_rx.try_iter().collect();
        assert_eq!(before, vec![PlaybackStep::Chord { chord: "C".to_string(), index: 0 }]);

        assert!(handle.wait_timeout(Duration::from_millis(500)));
        let after: Vec<PlaybackStep> = events_rx.try_iter().collect();
        assert_eq!(after, vec![PlaybackStep::Finished]);
    }

    #[test]
    fn test_new_sequence_cancels_previous() {
        let engine = AudioEngine::new();
        let (tx, rx) = crossbeam_channel::unbounded();

        let first = engine
            .play_progression(chords(&["C", "F", "G"]), 60.0, move |step| {
                let _ = tx.send(step);
            })
            .unwrap();
        let second = engine.play_progression(chords(&["Am"]), 600.0, |_| {}).unwrap();

        assert!(first.wait_timeout(Duration::from_millis(500)));
        let steps: Vec<PlaybackStep> = rx.try_iter().collect();
        assert_eq!(steps.last(), Some(&PlaybackStep::Finished));
        assert!(steps.len() <= 2);

        second.wait();
    }

    #[test]
    fn test_empty_progression_reports_finished() {
        let engine = AudioEngine::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = engine
            .play_progression(Vec::new(), 120.0, move |step| {
                let _ = tx.send(step);
            })
            .unwrap();
        handle.wait();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![PlaybackStep::Finished]);
    }

    #[test]
    fn test_invalid_tempo_is_rejected() {
        let engine = AudioEngine::new();
        assert!(matches!(
            engine.play_progression(chords(&["C"]), 0.0, |_| {}),
            Err(AudioEngineError::InvalidTempo(_))
        ));
    }
}
