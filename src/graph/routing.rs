#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/*
Routing Resolution
==================

A patch wires operators together with a flat list of modulator→carrier
pairs. The renderer wants two derived views of that list:

  modulation_sources   For each carrier, which operators feed its phase
                       input. A carrier with two sources receives their
                       elementwise sum; a modulator listed for two carriers
                       is rendered once and reused.

  terminal_operators   The operators that never act as a modulator for
                       anything. Their outputs are what the listener hears:
                       the final signal is their elementwise sum, and only
                       theirs.

Both are fixed for the lifetime of a synth, so they are resolved once at
construction. Resolution also front-loads every structural failure: an edge
index outside the operator list, and any modulation cycle. Rejecting cycles
here means the render path can walk the graph without tracking recursion
depth - by the time it runs, the routing is known to be a DAG.
*/

/// A single modulator→carrier connection in the routing graph.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingEdge {
    /// Operator whose output feeds the carrier's phase input.
    pub modulator: usize,
    /// Operator being phase-modulated.
    pub carrier: usize,
}

impl RoutingEdge {
    pub fn new(modulator: usize, carrier: usize) -> Self {
        Self { modulator, carrier }
    }
}

impl From<(usize, usize)> for RoutingEdge {
    fn from((modulator, carrier): (usize, usize)) -> Self {
        Self { modulator, carrier }
    }
}

/// Resolved modulation topology, immutable once built.
#[derive(Debug, Clone)]
pub struct Routing {
    modulation_sources: Vec<Vec<usize>>,
    terminal_operators: Vec<usize>,
}

impl Routing {
    /// Resolve an edge list into per-carrier modulation sources and the
    /// terminal-operator set.
    ///
    /// Fails with [`Error::InvalidRouting`] if an edge references an index
    /// outside `[0, operator_count)` and with [`Error::CyclicRouting`] if
    /// the edges form a modulation cycle (including self-modulation).
    pub fn resolve(operator_count: usize, edges: &[RoutingEdge]) -> Result<Self, Error> {
        if operator_count == 0 {
            return Err(Error::EmptyGraph);
        }

        let mut modulation_sources = vec![Vec::new(); operator_count];
        for edge in edges {
            for index in [edge.modulator, edge.carrier] {
                if index >= operator_count {
                    return Err(Error::InvalidRouting {
                        index,
                        operator_count,
                    });
                }
            }
            // Insertion order is preserved; the renderer's sum over sources
            // is commutative so the order never changes the result.
            modulation_sources[edge.carrier].push(edge.modulator);
        }

        check_acyclic(&modulation_sources)?;

        let terminal_operators = find_terminal_operators(&modulation_sources);
        log::debug!(
            "resolved routing: {} operators, {} edges, terminals {:?}",
            operator_count,
            edges.len(),
            terminal_operators
        );

        Ok(Self {
            modulation_sources,
            terminal_operators,
        })
    }

    pub fn operator_count(&self) -> usize {
        self.modulation_sources.len()
    }

    /// Modulator indices feeding `carrier`, in edge-list order.
    pub fn modulation_sources(&self, carrier: usize) -> &[usize] {
        &self.modulation_sources[carrier]
    }

    /// Operators that never modulate anything, ascending. Their summed
    /// outputs form the final signal.
    pub fn terminal_operators(&self) -> &[usize] {
        &self.terminal_operators
    }
}

/// An operator is terminal iff it appears in no carrier's source list.
fn find_terminal_operators(modulation_sources: &[Vec<usize>]) -> Vec<usize> {
    let mut is_modulator = vec![false; modulation_sources.len()];
    for sources in modulation_sources {
        for &modulator in sources {
            is_modulator[modulator] = true;
        }
    }

    is_modulator
        .iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(index, _)| index)
        .collect()
}

/// Depth-first search over the modulation-source lists with an explicit
/// stack. An in-progress node reached again is necessarily an ancestor on
/// the current path, i.e. a cycle.
fn check_acyclic(modulation_sources: &[Vec<usize>]) -> Result<(), Error> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; modulation_sources.len()];
    let mut stack = Vec::new();

    for start in 0..modulation_sources.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        stack.push(start);
        while let Some(&node) = stack.last() {
            match marks[node] {
                Mark::Unvisited => {
                    marks[node] = Mark::InProgress;
                    for &source in &modulation_sources[node] {
                        match marks[source] {
                            Mark::InProgress => {
                                return Err(Error::CyclicRouting { operator: source })
                            }
                            Mark::Unvisited => stack.push(source),
                            Mark::Done => {}
                        }
                    }
                }
                Mark::InProgress => {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
                Mark::Done => {
                    stack.pop();
                }
            }
        }
    }

    Ok(())
}
