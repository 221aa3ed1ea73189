//! Triangle-wave chord voices with a breakpoint envelope

/// Envelope peak after the attack
pub const PEAK_LEVEL: f64 = 0.15;
/// Level held between decay and release
pub const SUSTAIN_LEVEL: f64 = 0.10;

const ATTACK_END: f64 = 0.05;
const DECAY_END: f64 = 0.2;
const RELEASE_TIME: f64 = 0.1;

/// Linear ramp to silence after a stop request
pub const STOP_FADE: f64 = 0.05;
/// Voice is dropped this long after a stop request
pub const HARD_STOP: f64 = 0.1;

/// Piecewise-linear ADSR shape over a fixed note duration.
///
/// Breakpoints are (0, 0) (50ms, peak) (200ms, sustain) (duration - 100ms,
/// sustain) (duration, 0). Each breakpoint time is clamped into
/// `[previous, duration]` so short notes keep a monotone timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    points: [(f64, f64); 5],
}

impl Envelope {
    pub fn new(duration: f64) -> Self {
        let duration = duration.max(0.0);
        let raw = [
            (0.0, 0.0),
            (ATTACK_END, PEAK_LEVEL),
            (DECAY_END, SUSTAIN_LEVEL),
            (duration - RELEASE_TIME, SUSTAIN_LEVEL),
            (duration, 0.0),
        ];

        let mut previous = 0.0;
        let points = raw.map(|(time, level)| {
            let time = time.clamp(previous, duration);
            previous = time;
            (time, level)
        });
        Self { points }
    }

    pub fn duration(&self) -> f64 {
        self.points[4].0
    }

    pub fn points(&self) -> &[(f64, f64); 5] {
        &self.points
    }

    /// Envelope level at `time` seconds after note start
    pub fn level_at(&self, time: f64) -> f64 {
        if time <= 0.0 || time >= self.duration() {
            return 0.0;
        }
        for pair in self.points.windows(2) {
            let (t0, l0) = pair[0];
            let (t1, l1) = pair[1];
            if time < t1 {
                let span = t1 - t0;
                if span <= f64::EPSILON {
                    return l1;
                }
                return l0 + (l1 - l0) * (time - t0) / span;
            }
        }
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StopFade {
    started_age: u64,
    from_level: f64,
}

/// One sounding oscillator
#[derive(Debug, Clone)]
pub struct Voice {
    frequency: f64,
    envelope: Envelope,
    phase: f64,
    age: u64,
    stop: Option<StopFade>,
    finished: bool,
}

impl Voice {
    pub fn new(frequency: f64, duration: f64) -> Self {
        Self {
            frequency,
            envelope: Envelope::new(duration),
            phase: 0.0,
            age: 0,
            stop: None,
            finished: false,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current gain: the envelope, or the stop fade once one is requested
    pub fn level(&self, sample_rate: u32) -> f64 {
        if self.finished {
            return 0.0;
        }
        let sr = sample_rate.max(1) as f64;
        match self.stop {
            Some(fade) => {
                let since = (self.age - fade.started_age) as f64 / sr;
                fade.from_level * (1.0 - since / STOP_FADE).max(0.0)
            }
            None => self.envelope.level_at(self.age as f64 / sr),
        }
    }

    /// Begin the fade-out. No-op on a finished or already stopping voice.
    pub fn stop(&mut self, sample_rate: u32) {
        if self.finished || self.stop.is_some() {
            return;
        }
        self.stop = Some(StopFade {
            started_age: self.age,
            from_level: self.level(sample_rate),
        });
    }

    /// Produce one sample and advance the oscillator
    pub fn next_sample(&mut self, sample_rate: u32) -> f32 {
        if self.finished {
            return 0.0;
        }

        let level = self.level(sample_rate);
        let sample = triangle(self.phase) * level;

        let sr = sample_rate.max(1) as f64;
        self.phase = (self.phase + self.frequency / sr).fract();
        self.age += 1;

        self.finished = match self.stop {
            Some(fade) => self.age - fade.started_age >= seconds_to_samples(HARD_STOP, sr),
            None => self.age >= seconds_to_samples(self.envelope.duration(), sr),
        };

        sample as f32
    }
}

fn seconds_to_samples(seconds: f64, sample_rate: f64) -> u64 {
    (seconds * sample_rate).round() as u64
}

/// Triangle wave in [-1, 1] for a phase in [0, 1)
fn triangle(phase: f64) -> f64 {
    1.0 - 4.0 * (phase - 0.5).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 1000;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_envelope_shape() {
        let env = Envelope::new(1.0);
        assert!(close(env.level_at(0.0), 0.0));
        assert!(close(env.level_at(0.025), 0.075));
        assert!(close(env.level_at(0.05), PEAK_LEVEL));
        assert!(close(env.level_at(0.5), SUSTAIN_LEVEL));
        assert!(close(env.level_at(0.95), 0.05));
        assert!(close(env.level_at(1.0), 0.0));
    }

    #[test]
    fn test_short_envelope_is_monotone() {
        for duration in [0.3, 0.15, 0.04, 0.0] {
            let env = Envelope::new(duration);
            let times: Vec<f64> = env.points().iter().map(|(t, _)| *t).collect();
            assert!(times.windows(2).all(|w| w[0] <= w[1]), "{duration}: {times:?}");
            assert!(times.iter().all(|t| *t <= duration));
        }
    }

    #[test]
    fn test_voice_finishes_at_duration() {
        let mut voice = Voice::new(440.0, 0.5);
        let mut peak = 0.0f32;
        for _ in 0..500 {
            peak = peak.max(voice.next_sample(SR).abs());
        }
        assert!(voice.is_finished());
        assert!(peak > 0.0 && peak <= PEAK_LEVEL as f32 + 1e-6);
        assert_eq!(voice.next_sample(SR), 0.0);
    }

    #[test]
    fn test_stop_fades_then_hard_stops() {
        let mut voice = Voice::new(220.0, 2.0);
        for _ in 0..300 {
            voice.next_sample(SR);
        }
        voice.stop(SR);
        assert!(close(voice.level(SR), SUSTAIN_LEVEL));

        for _ in 0..50 {
            voice.next_sample(SR);
        }
        assert!(voice.level(SR).abs() < 1e-9);
        assert!(!voice.is_finished());

        for _ in 0..50 {
            voice.next_sample(SR);
        }
        assert!(voice.is_finished());

        // stopping twice or after finishing is harmless
        voice.stop(SR);
        assert!(voice.is_finished());
    }
}
