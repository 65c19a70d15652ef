//! fm - render a two-stack FM patch and play it on the default output
//!
//! Run with: cargo run --bin fm

use color_eyre::eyre::eyre;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use fm_dsp::{
    dsp::{envelope::AdsrGenerator, oscillator::PhaseAccumOsc},
    EnvelopeGenerator, FmSynth, Operator, RoutingEdge, SynthConfig,
};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    simple_logger::init_with_level(log::Level::Info)?;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no output device available"))?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    // Two carrier/modulator stacks: 1 phase-modulates 0, 3 phase-modulates 2.
    // Terminals are the two carriers; their sum is the output.
    let operators: Vec<Box<dyn Operator>> = vec![
        Box::new(PhaseAccumOsc::sine()),
        Box::new(PhaseAccumOsc::sine()),
        Box::new(PhaseAccumOsc::sine()),
        Box::new(PhaseAccumOsc::triangle()),
    ];
    let generators: Vec<Box<dyn EnvelopeGenerator>> = (0..operators.len())
        .map(|_| Box::new(AdsrGenerator::new()) as Box<dyn EnvelopeGenerator>)
        .collect();
    let routing = [RoutingEdge::new(1, 0), RoutingEdge::new(3, 2)];

    let synth = FmSynth::new(
        operators,
        generators,
        &routing,
        SynthConfig::with_sample_rate(sample_rate),
    )?;

    let (gate, frequency) = build_phrase(sample_rate);

    let ratios = [1.0, 2.0, 0.5, 5.51];
    // Modulator gains are peak phase deviation in radians; carrier gains are
    // plain output amplitude.
    let gains = [0.5, 2.5, 0.35, 1.4];
    let eg_params = vec![
        vec![0.005, 0.12, 0.6, 0.08],
        vec![0.002, 0.25, 0.3, 0.05],
        vec![0.01, 0.2, 0.5, 0.1],
        vec![0.004, 0.3, 0.2, 0.08],
    ];

    let samples = synth.render(&gate, &frequency, &ratios, &eg_params, Some(&gains))?;
    log::info!(
        "rendered {} samples at {} Hz, playing on {} channels",
        samples.len(),
        sample_rate,
        channels
    );

    // Hand the rendered buffer to the audio thread through a ring buffer.
    let (mut producer, mut consumer) = rtrb::RingBuffer::new(samples.len());
    for &sample in &samples {
        let _ = producer.push(sample);
    }

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let sample = consumer.pop().unwrap_or(0.0);
                for out in frame.iter_mut() {
                    *out = sample;
                }
            }
        },
        |err| log::warn!("output stream error: {err}"),
        None,
    )?;
    stream.play()?;

    std::thread::sleep(std::time::Duration::from_secs_f32(
        samples.len() as f32 / sample_rate + 0.25,
    ));

    Ok(())
}

/// A short four-note phrase: gate and fundamental-frequency signals of equal
/// length, 300 ms held out of each 400 ms slot.
fn build_phrase(sample_rate: f32) -> (Vec<f32>, Vec<f32>) {
    let slot = (0.4 * sample_rate) as usize;
    let held = (0.3 * sample_rate) as usize;
    let notes = [220.0, 277.18, 329.63, 440.0];

    let mut gate = Vec::with_capacity(slot * notes.len());
    let mut frequency = Vec::with_capacity(slot * notes.len());
    for &note in &notes {
        for n in 0..slot {
            gate.push(if n < held { 1.0 } else { 0.0 });
            frequency.push(note);
        }
    }

    (gate, frequency)
}
