/// An operator: an oscillator unit producing a periodic signal, optionally
/// phase-modulated by the summed output of other operators.
///
/// Implementations are pure functions of their inputs. That is what allows a
/// shared synth instance to run concurrent render calls: all mutable render
/// state is call-local, none lives behind this trait.
pub trait Operator: Send + Sync {
    /// Render one whole buffer of audio.
    ///
    /// `frequency` carries the instantaneous frequency per sample; all
    /// buffers share the gate's length for the call. `phase_mod` is `None`
    /// for an unmodulated operator - an *absent* signal, which is not the
    /// same thing as a present, zero-valued one. Implementations may treat
    /// the two differently.
    fn render(&self, frequency: &[f32], sample_rate: f32, phase_mod: Option<&[f32]>) -> Vec<f32>;
}

/// An envelope generator, index-aligned 1:1 with the operator it drives.
pub trait EnvelopeGenerator: Send + Sync {
    /// Render an envelope aligned in time with `gate`.
    ///
    /// `params` is the generator-specific positional parameter list supplied
    /// per render call (for an ADSR: attack, decay, sustain, release).
    fn render(&self, gate: &[f32], params: &[f32], sample_rate: f32) -> Vec<f32>;
}

/// Allow boxed operators to be used as operators (for dynamic dispatch)
impl Operator for Box<dyn Operator> {
    fn render(&self, frequency: &[f32], sample_rate: f32, phase_mod: Option<&[f32]>) -> Vec<f32> {
        (**self).render(frequency, sample_rate, phase_mod)
    }
}

/// Allow boxed envelope generators to be used as envelope generators
impl EnvelopeGenerator for Box<dyn EnvelopeGenerator> {
    fn render(&self, gate: &[f32], params: &[f32], sample_rate: f32) -> Vec<f32> {
        (**self).render(gate, params, sample_rate)
    }
}
