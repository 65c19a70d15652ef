use std::borrow::Cow;

use crate::{
    config::SynthConfig,
    error::Error,
    graph::{
        node::{EnvelopeGenerator, Operator},
        routing::{Routing, RoutingEdge},
    },
};

/*
FM Graph Rendering
==================

An FM patch is a set of operators (oscillators), one envelope generator per
operator, and a routing table saying which operators phase-modulate which.
Rendering resolves that graph for one whole buffer:

1. Broadcast a scalar frequency against the gate, once, up front.
2. Render every envelope eagerly - one call per generator, whether or not
   the graph walk below ever touches the operator it belongs to.
3. Walk the graph from each terminal operator. An operator's modulators are
   rendered first, their outputs summed into a single phase-mod signal, and
   the operator's own output (oscillator × envelope × gain) is cached so a
   modulator feeding several carriers is computed exactly once per call.
4. Sum the terminal outputs elementwise. That sum is the signal.

The walk uses an explicit work stack rather than call-stack recursion, so
evaluation depth is bounded by the operator count in heap memory. Cycles
never reach this code: `Routing::resolve` rejects them at construction.

The cache and envelope list live on the call stack, never on the synth.
Rendering takes `&self`, so one instance can serve concurrent render calls
without any shared mutable state.
*/

pub struct FmSynth {
    operators: Vec<Box<dyn Operator>>,
    envelope_generators: Vec<Box<dyn EnvelopeGenerator>>,
    routing: Routing,
    sample_rate: f32,
}

impl std::fmt::Debug for FmSynth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `Operator`/`EnvelopeGenerator` trait objects are not `Debug`, so
        // report their counts rather than their contents.
        f.debug_struct("FmSynth")
            .field("operators", &self.operators.len())
            .field("envelope_generators", &self.envelope_generators.len())
            .field("routing", &self.routing)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl FmSynth {
    /// Build a synth from operators, their envelope generators, and the
    /// modulator→carrier routing table.
    ///
    /// The two collections must be index-aligned: envelope generator `n`
    /// drives operator `n`. Routing is resolved once here; construction is
    /// the only place a structurally invalid patch can fail.
    pub fn new(
        operators: Vec<Box<dyn Operator>>,
        envelope_generators: Vec<Box<dyn EnvelopeGenerator>>,
        routing_edges: &[RoutingEdge],
        config: SynthConfig,
    ) -> Result<Self, Error> {
        if envelope_generators.len() != operators.len() {
            return Err(Error::LengthMismatch {
                argument: "envelope_generators",
                expected: operators.len(),
                actual: envelope_generators.len(),
            });
        }

        let routing = Routing::resolve(operators.len(), routing_edges)?;

        Ok(Self {
            operators,
            envelope_generators,
            routing,
            sample_rate: config.sample_rate,
        })
    }

    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The resolved modulation topology.
    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    /// Render one whole buffer.
    ///
    /// * `gate` - note on/off signal shared by all envelope generators; its
    ///   length defines the buffer length for the call.
    /// * `frequency` - fundamental frequency per sample, or a single sample
    ///   that is broadcast across the gate's length.
    /// * `ratios` - per-operator tuning ratios; operator `n` runs at
    ///   `frequency * ratios[n]`.
    /// * `eg_params` - per-operator positional parameters for the matching
    ///   envelope generator.
    /// * `operator_gains` - per-operator output gains; `None` means unit
    ///   gain everywhere.
    pub fn render(
        &self,
        gate: &[f32],
        frequency: &[f32],
        ratios: &[f32],
        eg_params: &[Vec<f32>],
        operator_gains: Option<&[f32]>,
    ) -> Result<Vec<f32>, Error> {
        let operator_count = self.operators.len();
        check_len("ratios", operator_count, ratios.len())?;
        check_len("eg_params", operator_count, eg_params.len())?;
        if let Some(gains) = operator_gains {
            check_len("operator_gains", operator_count, gains.len())?;
        }

        // Scalar frequencies are broadcast once, up front; every per-operator
        // scaling below sees a full-length signal.
        let frequency = broadcast_frequency(frequency, gate.len());
        check_len("frequency", gate.len(), frequency.len())?;

        // Normalize the missing-gains case here so the evaluation loop never
        // checks for an absent argument.
        let unit_gains;
        let gains = match operator_gains {
            Some(gains) => gains,
            None => {
                unit_gains = vec![1.0; operator_count];
                unit_gains.as_slice()
            }
        };

        // Every envelope is computed eagerly, one call per generator, even
        // for operators the graph walk never reaches.
        let envelopes: Vec<Vec<f32>> = self
            .envelope_generators
            .iter()
            .zip(eg_params)
            .map(|(generator, params)| generator.render(gate, params, self.sample_rate))
            .collect();

        // Per-call output cache; each operator lands here at most once.
        let mut outputs: Vec<Option<Vec<f32>>> = vec![None; operator_count];

        let mut signal = vec![0.0; gate.len()];
        for &terminal in self.routing.terminal_operators() {
            self.render_operator(terminal, &frequency, ratios, &envelopes, gains, &mut outputs);

            if let Some(rendered) = &outputs[terminal] {
                for (out, sample) in signal.iter_mut().zip(rendered) {
                    *out += sample;
                }
            }
        }

        Ok(signal)
    }

    /// Evaluate one operator and everything that modulates it, memoizing
    /// into `outputs`.
    ///
    /// Post-order over the DAG: an operator is computed only once all of its
    /// modulation sources are cached, so a node is expanded at most once and
    /// re-visits hit the cache check at the top of the loop.
    fn render_operator(
        &self,
        index: usize,
        frequency: &[f32],
        ratios: &[f32],
        envelopes: &[Vec<f32>],
        gains: &[f32],
        outputs: &mut [Option<Vec<f32>>],
    ) {
        let mut stack = vec![index];

        while let Some(&node) = stack.last() {
            if outputs[node].is_some() {
                stack.pop();
                continue;
            }

            let sources = self.routing.modulation_sources(node);
            let pending: Vec<usize> = sources
                .iter()
                .copied()
                .filter(|&source| outputs[source].is_none())
                .collect();
            if !pending.is_empty() {
                stack.extend(pending);
                continue;
            }

            // All sources cached: sum them into one phase-mod signal. No
            // sources means the oscillator runs unmodulated - an absent
            // signal, not a zero-valued one.
            let phase_mod: Option<Vec<f32>> = if sources.is_empty() {
                None
            } else {
                let mut sum = vec![0.0; frequency.len()];
                for &source in sources {
                    if let Some(rendered) = &outputs[source] {
                        for (acc, sample) in sum.iter_mut().zip(rendered) {
                            *acc += sample;
                        }
                    }
                }
                Some(sum)
            };

            let scaled_frequency: Vec<f32> =
                frequency.iter().map(|f| f * ratios[node]).collect();

            let mut rendered = self.operators[node].render(
                &scaled_frequency,
                self.sample_rate,
                phase_mod.as_deref(),
            );
            debug_assert_eq!(rendered.len(), frequency.len());
            debug_assert_eq!(envelopes[node].len(), frequency.len());

            for (sample, envelope) in rendered.iter_mut().zip(&envelopes[node]) {
                *sample *= envelope * gains[node];
            }

            outputs[node] = Some(rendered);
            stack.pop();
        }
    }
}

fn broadcast_frequency(frequency: &[f32], len: usize) -> Cow<'_, [f32]> {
    if frequency.len() == 1 {
        Cow::Owned(vec![frequency[0]; len])
    } else {
        Cow::Borrowed(frequency)
    }
}

fn check_len(argument: &'static str, expected: usize, actual: usize) -> Result<(), Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            argument,
            expected,
            actual,
        })
    }
}
