//! Benchmarks for the oscillator and envelope primitives.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_dsp::dsp::{envelope::AdsrGenerator, oscillator::PhaseAccumOsc};
use fm_dsp::{EnvelopeGenerator, Operator};

use crate::BUFFER_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BUFFER_SIZES {
        let frequency = vec![440.0_f32; size];
        let phase_mod = vec![0.5_f32; size];

        // Sine - transcendental per sample
        let osc = PhaseAccumOsc::sine();
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&frequency), SAMPLE_RATE, None))
        });

        // Same, with the phase-mod add in the loop
        group.bench_with_input(BenchmarkId::new("sine_phase_mod", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&frequency), SAMPLE_RATE, Some(black_box(&phase_mod))))
        });

        // Saw - linear ramp only
        let saw = PhaseAccumOsc::saw();
        group.bench_with_input(BenchmarkId::new("saw", size), &size, |b, _| {
            b.iter(|| saw.render(black_box(&frequency), SAMPLE_RATE, None))
        });
    }

    group.finish();
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let generator = AdsrGenerator::new();
    let params = [0.01, 0.1, 0.7, 0.2];

    for &size in BUFFER_SIZES {
        // Gate held for three quarters of the buffer, then released
        let gate: Vec<f32> = (0..size)
            .map(|n| if n < size * 3 / 4 { 1.0 } else { 0.0 })
            .collect();

        group.bench_with_input(BenchmarkId::new("adsr", size), &size, |b, _| {
            b.iter(|| generator.render(black_box(&gate), black_box(&params), SAMPLE_RATE))
        });
    }

    group.finish();
}
