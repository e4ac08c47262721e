//! Observation of a running search.
//!
//! Observers see every try start and every flip together with the current assignment and
//! counters. They cannot influence the search.
use crate::assignment::Assignment;
use crate::counters::Counters;
use crate::lit::Var;

/// How the variable of a flip was selected.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DecisionKind {
    /// A variable with maximal gain.
    Greedy,
    /// A variable of a random unsatisfied clause.
    RandomWalk,
}

impl DecisionKind {
    /// Short lowercase name, `greedy` or `random`.
    pub fn name(self) -> &'static str {
        match self {
            DecisionKind::Greedy => "greedy",
            DecisionKind::RandomWalk => "random",
        }
    }
}

/// A try evaluated its fresh random assignment.
pub struct TryStart<'a> {
    /// 1-based number of the try.
    pub try_number: u64,
    /// Satisfied clauses, counting skipped tautological clauses as satisfied.
    pub satisfied: usize,
    pub assignment: &'a Assignment,
    pub counters: &'a Counters,
}

/// A flip was performed.
pub struct FlipStep<'a> {
    pub try_number: u64,
    /// 1-based index of the flip within its try.
    pub iteration: u64,
    pub kind: DecisionKind,
    /// The flipped variable, `None` when a random walk picked an empty clause.
    pub var: Option<Var>,
    /// Change of the satisfied clause count.
    pub gain: isize,
    /// Satisfied clauses, counting skipped tautological clauses as satisfied.
    pub satisfied: usize,
    pub assignment: &'a Assignment,
    pub counters: &'a Counters,
}

/// Callbacks invoked by the search.
pub trait SearchObserver {
    fn try_started(&mut self, _event: &TryStart) {}

    fn flipped(&mut self, _event: &FlipStep) {}
}
