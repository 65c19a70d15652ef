use crate::{graph::node::EnvelopeGenerator, GATE_THRESHOLD, MIN_TIME};

/*
Gate-Driven ADSR
================

A linear ADSR state machine driven by a gate signal rather than by note
events. The gate is a buffer of the same length as the output: a sample
rising above the threshold triggers the attack, a sample falling below it
triggers the release. This keeps the envelope aligned sample-for-sample with
the gate that produced it, which the graph renderer relies on when it
multiplies envelopes into operator outputs.

Stages and ramps follow the classic linear shape:

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Release always starts from the *current* level, wherever the gate drops -
releasing mid-attack must not jump to the sustain level first, or the output
clicks. The release ramp snapshots its starting level and total sample count
at the falling edge and interpolates down to exactly zero.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate just went high, ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

pub struct Envelope {
    // Shape parameters, fixed per instance
    attack_time: f32,   // seconds to ramp 0 → 1
    decay_time: f32,    // seconds to ramp 1 → sustain
    sustain_level: f32, // level to hold (0.0 - 1.0)
    release_time: f32,  // seconds to ramp current → 0

    // Runtime state
    stage: EnvelopeState,
    level: f32,
    gate_high: bool,

    decay_start_level: f32,

    // Release bookkeeping, snapshotted at the falling edge
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),

            stage: EnvelopeState::Idle,
            level: 0.0,
            gate_high: false,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Rising gate edge: restart the attack from zero for a clean retrigger.
    fn trigger(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Falling gate edge: release from the current level.
    fn release(&mut self, sample_rate: f32) {
        if matches!(self.stage, EnvelopeState::Idle) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the state machine by one sample.
    fn next_sample(&mut self, sample_rate: f32) {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let increment = 1.0 / (self.attack_time * sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                let total_drop = self.decay_start_level - target;
                let decrement = total_drop / (self.decay_time * sample_rate);
                self.level -= decrement;

                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                // Linear interpolation from release_start_level down to 0
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
    }

    /// Render the envelope for a whole gate buffer, one output sample per
    /// gate sample. Gate edges drive the stage transitions.
    pub fn render_gate(&mut self, gate: &[f32], out: &mut [f32], sample_rate: f32) {
        for (sample, &g) in out.iter_mut().zip(gate) {
            let high = g > GATE_THRESHOLD;
            if high && !self.gate_high {
                self.trigger();
            } else if !high && self.gate_high {
                self.release(sample_rate);
            }
            self.gate_high = high;

            self.next_sample(sample_rate);
            *sample = self.level;
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

/// The standard envelope generator for FM patches.
///
/// Stateless: each render call builds a fresh [`Envelope`] from the
/// positional parameter list `[attack, decay, sustain, release]` and runs it
/// over the gate. Malformed parameter lists fall back to a conventional
/// short envelope rather than failing the whole render.
pub struct AdsrGenerator;

// Fallback shape when the parameter list is malformed
const DEFAULT_ADSR: [f32; 4] = [0.01, 0.1, 0.7, 0.3];

impl AdsrGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AdsrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeGenerator for AdsrGenerator {
    fn render(&self, gate: &[f32], params: &[f32], sample_rate: f32) -> Vec<f32> {
        let [attack, decay, sustain, release] = match params {
            [a, d, s, r] => [*a, *d, *s, *r],
            _ => {
                log::warn!(
                    "expected 4 ADSR parameters, got {}; using defaults",
                    params.len()
                );
                DEFAULT_ADSR
            }
        };

        let mut envelope = Envelope::adsr(attack, decay, sustain, release);
        let mut out = vec![0.0; gate.len()];
        envelope.render_gate(gate, &mut out, sample_rate);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn gate(high: usize, low: usize) -> Vec<f32> {
        let mut g = vec![1.0; high];
        g.extend(std::iter::repeat(0.0).take(low));
        g
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2);
        let gate = gate((0.01 * SAMPLE_RATE) as usize + 1, 0);
        let mut out = vec![0.0; gate.len()];

        env.render_gate(&gate, &mut out, SAMPLE_RATE);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert!(!matches!(env.state(), EnvelopeState::Attack));
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(0.01, 0.05, sustain, 0.2);
        let gate = gate(((0.01 + 0.05) * SAMPLE_RATE) as usize + 5, 0);
        let mut out = vec![0.0; gate.len()];

        env.render_gate(&gate, &mut out, SAMPLE_RATE);

        assert!(matches!(env.state(), EnvelopeState::Sustain));
        assert!(
            (env.level() - sustain).abs() < 0.05,
            "sustain level should be held"
        );
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.05, 0.5, release);
        let gate = gate(
            (0.02 * SAMPLE_RATE) as usize,
            (release * SAMPLE_RATE) as usize + 2,
        );
        let mut out = vec![0.0; gate.len()];

        env.render_gate(&gate, &mut out, SAMPLE_RATE);

        assert!(env.level() <= 0.001, "release should fall back to zero");
        assert!(matches!(env.state(), EnvelopeState::Idle));
    }

    #[test]
    fn output_is_aligned_with_gate() {
        let mut env = Envelope::adsr(0.005, 0.01, 0.8, 0.01);
        let gate = gate(30, 30);
        let mut out = vec![0.0; gate.len()];

        env.render_gate(&gate, &mut out, SAMPLE_RATE);

        // Envelope starts moving at the first high sample, and only then
        assert!(out[0] > 0.0, "attack starts on the rising edge");
        assert_eq!(out.len(), gate.len());
    }

    #[test]
    fn retrigger_restarts_attack_from_zero() {
        let mut env = Envelope::adsr(0.02, 0.05, 0.9, 0.005);
        let mut signal = gate(20, 10);
        signal.extend(gate(20, 0));
        let mut out = vec![0.0; signal.len()];

        env.render_gate(&signal, &mut out, SAMPLE_RATE);

        // Second rising edge at sample 30: level snaps back near zero
        assert!(
            out[30] < out[19],
            "retrigger should restart below the previous peak"
        );
    }

    #[test]
    fn generator_renders_from_positional_params() {
        let generator = AdsrGenerator::new();
        let signal = gate(50, 50);

        let out = generator.render(&signal, &[0.01, 0.02, 0.5, 0.02], SAMPLE_RATE);

        assert_eq!(out.len(), signal.len());
        assert!(out.iter().any(|&s| s > 0.9), "attack peak should appear");
        assert!(
            out.last().copied().unwrap_or(1.0) < 0.01,
            "tail should have released"
        );
    }

    #[test]
    fn generator_falls_back_on_malformed_params() {
        let generator = AdsrGenerator::new();
        let signal = gate(50, 50);

        // Wrong parameter count renders with defaults instead of failing
        let out = generator.render(&signal, &[0.01], SAMPLE_RATE);
        assert_eq!(out.len(), signal.len());
        assert!(out.iter().any(|&s| s > 0.0));
    }
}
