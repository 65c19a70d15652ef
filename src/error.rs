use std::{error, fmt};

/// Provides an enumeration of all possible errors reported by fm_dsp.
#[derive(Debug)]
pub enum Error {
    /// A routing edge references an operator index outside the operator list.
    InvalidRouting {
        index: usize,
        operator_count: usize,
    },
    /// A per-call argument list disagrees with the operator count, or a
    /// signal does not line up with the gate.
    LengthMismatch {
        argument: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The modulation graph contains a cycle through the given operator.
    CyclicRouting { operator: usize },
    /// A synth needs at least one operator.
    EmptyGraph,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRouting {
                index,
                operator_count,
            } => write!(
                f,
                "Routing edge references operator {index}, but only {operator_count} operators exist"
            ),
            Self::LengthMismatch {
                argument,
                expected,
                actual,
            } => write!(
                f,
                "Argument `{argument}` has length {actual}, expected {expected}"
            ),
            Self::CyclicRouting { operator } => {
                write!(f, "Modulation routing cycles through operator {operator}")
            }
            Self::EmptyGraph => write!(f, "Operator list is empty"),
        }
    }
}
