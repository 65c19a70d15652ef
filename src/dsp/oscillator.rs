#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f32::consts::TAU;

use crate::graph::node::Operator;

/*
Phase-Accumulating Oscillator
=============================

The oscillator integrates its frequency signal into a running phase and
shapes that phase into a waveform:

    phase[n] = phase[n-1] + 2π · frequency[n-1] / sample_rate
    out[n]   = shape(phase[n] + phase_mod[n])

The phase-modulation input is added to the *phase*, not the frequency. This
is the DX-style arrangement: a modulator running at an audio rate pushes the
carrier's phase back and forth, which is what creates FM sidebands. An
absent modulation input skips the addition entirely.

All waveforms share the sine's cycle origin (sine and triangle cross zero
rising at phase zero, saw sits at its trough, square at its high plateau),
so swapping a modulator's waveform changes timbre without shifting the
carrier's timing.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
}

/// A stateless whole-buffer oscillator. Phase starts at zero each render
/// call, so equal inputs always produce equal output.
pub struct PhaseAccumOsc {
    waveform: Waveform,
}

impl PhaseAccumOsc {
    pub fn new(waveform: Waveform) -> Self {
        Self { waveform }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn saw() -> Self {
        Self::new(Waveform::Saw)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}

impl Operator for PhaseAccumOsc {
    fn render(&self, frequency: &[f32], sample_rate: f32, phase_mod: Option<&[f32]>) -> Vec<f32> {
        let mut out = vec![0.0; frequency.len()];
        let mut phase = 0.0_f32;

        for (n, sample) in out.iter_mut().enumerate() {
            let modulated = match phase_mod {
                Some(pm) => phase + pm[n],
                None => phase,
            };
            *sample = shape(self.waveform, modulated);

            phase += TAU * frequency[n] / sample_rate;
        }

        out
    }
}

/// Shape an unwrapped phase (radians) into a waveform sample in [-1, 1].
fn shape(waveform: Waveform, phase: f32) -> f32 {
    // Normalized cycle position in [0, 1)
    let t = phase.rem_euclid(TAU) / TAU;

    match waveform {
        Waveform::Sine => (t * TAU).sin(),
        Waveform::Saw => 2.0 * t - 1.0,
        Waveform::Square => {
            if t < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            // Sine-aligned: 0 at t=0, peak +1 at t=0.25, trough -1 at t=0.75
            if t < 0.25 {
                4.0 * t
            } else if t < 0.75 {
                2.0 - 4.0 * t
            } else {
                4.0 * t - 4.0
            }
        }
    }
}
