//! Benchmarks for full render calls over representative graph shapes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_dsp::dsp::{envelope::AdsrGenerator, oscillator::PhaseAccumOsc};
use fm_dsp::{EnvelopeGenerator, FmSynth, Operator, RoutingEdge, SynthConfig};

use crate::BUFFER_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

fn sine_synth(count: usize, pairs: &[(usize, usize)]) -> FmSynth {
    let operators: Vec<Box<dyn Operator>> = (0..count)
        .map(|_| Box::new(PhaseAccumOsc::sine()) as Box<dyn Operator>)
        .collect();
    let generators: Vec<Box<dyn EnvelopeGenerator>> = (0..count)
        .map(|_| Box::new(AdsrGenerator::new()) as Box<dyn EnvelopeGenerator>)
        .collect();
    let edges: Vec<RoutingEdge> = pairs.iter().copied().map(RoutingEdge::from).collect();

    FmSynth::new(
        operators,
        generators,
        &edges,
        SynthConfig::with_sample_rate(SAMPLE_RATE),
    )
    .unwrap()
}

fn held_gate(size: usize) -> Vec<f32> {
    (0..size)
        .map(|n| if n < size * 3 / 4 { 1.0 } else { 0.0 })
        .collect()
}

fn bench_render(
    group_name: &str,
    c: &mut Criterion,
    synth: &FmSynth,
    ratios: &[f32],
) {
    let mut group = c.benchmark_group(group_name);
    let count = synth.operator_count();
    let eg_params: Vec<Vec<f32>> = vec![vec![0.005, 0.05, 0.7, 0.1]; count];

    for &size in BUFFER_SIZES {
        let gate = held_gate(size);

        group.bench_with_input(BenchmarkId::new("render", size), &size, |b, _| {
            b.iter(|| {
                synth.render(
                    black_box(&gate),
                    black_box(&[220.0]),
                    ratios,
                    &eg_params,
                    None,
                )
            })
        });
    }

    group.finish();
}

/// Four operators in a single modulation chain: the deepest walk per output.
pub fn bench_chain(c: &mut Criterion) {
    let synth = sine_synth(4, &[(0, 1), (1, 2), (2, 3)]);
    bench_render("graphs/chain", c, &synth, &[8.0, 4.0, 2.0, 1.0]);
}

/// One modulator feeding three carriers: exercises the memo cache.
pub fn bench_fan_out(c: &mut Criterion) {
    let synth = sine_synth(4, &[(0, 1), (0, 2), (0, 3)]);
    bench_render("graphs/fan_out", c, &synth, &[3.0, 1.0, 2.0, 0.5]);
}

/// Two independent carrier/modulator stacks, the demo patch shape.
pub fn bench_two_stack(c: &mut Criterion) {
    let synth = sine_synth(4, &[(1, 0), (3, 2)]);
    bench_render("graphs/two_stack", c, &synth, &[1.0, 2.0, 0.5, 5.51]);
}
