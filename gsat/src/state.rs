//! Search driver state.
use crate::cancel::CancelFlag;

/// Phase of the search driver.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SearchPhase {
    /// Draw a fresh random assignment.
    NewTry,
    /// Evaluate the assignment of a new try from scratch.
    Evaluating,
    /// Flip variables until solved, cancelled or out of iterations.
    Iterating,
    /// The iterations of a try are used up.
    TryExhausted,
    Solved,
    Cancelled,
    /// The tries are used up or the search was cancelled between tries.
    Stopped,
}

impl SearchPhase {
    pub fn is_terminal(self) -> bool {
        match self {
            SearchPhase::Solved | SearchPhase::Cancelled | SearchPhase::Stopped => true,
            _ => false,
        }
    }
}

impl Default for SearchPhase {
    fn default() -> SearchPhase {
        SearchPhase::NewTry
    }
}

/// Counters and flags of the search driver.
///
/// Anything larger should become a separate part of [`Context`](crate::context::Context).
#[derive(Default)]
pub struct SearchState {
    pub phase: SearchPhase,
    /// Number of satisfied clauses, kept up to date by the flip gains.
    pub satisfied: usize,
    /// Tries started so far.
    pub tries: u64,
    /// Index of the next flip within the current try, starting at 1.
    pub iteration: u64,
    /// Flips over all tries.
    pub total_iterations: u64,
    /// Clauses were added since the occurrence lists were built.
    pub formula_changed: bool,
    /// Tautological clauses skipped while loading, satisfied by every assignment.
    pub tautologies: usize,
    pub cancel: CancelFlag,
}

impl SearchState {
    /// Satisfied clauses including the skipped tautologies.
    pub fn satisfied_total(&self) -> usize {
        self.satisfied + self.tautologies
    }

    /// Reset the counters for a new search run.
    pub fn restart(&mut self) {
        self.phase = SearchPhase::NewTry;
        self.satisfied = 0;
        self.tries = 0;
        self.iteration = 0;
        self.total_iterations = 0;
    }
}
