//! Gsat is a stochastic local search solver for boolean formulas in [conjunctive normal
//! form][cnf]. Starting from a random assignment it repeatedly flips single variables, either the
//! one that increases the number of satisfied clauses the most (greedy step) or a variable of a
//! random unsatisfied clause (random walk step).
//!
//! Local search can find satisfying assignments, but never proves that none exists. A search that
//! runs out of iterations and tries reports the best assignment of its last try.
//!
//! [cnf]: https://en.wikipedia.org/wiki/Conjunctive_normal_form

pub mod assignment;
pub mod cancel;
pub mod config;
pub mod counters;
pub mod observer;
pub mod searcher;

mod alloc;
mod context;
mod gain;
mod greedy;
mod load;
mod occurrence;
mod rng;
mod search;
mod state;
mod walk;

#[cfg(test)]
mod test;

pub use gsat_formula::{cnf, lit, CnfFormula, Lit, Var};

pub use assignment::Assignment;
pub use cancel::CancelFlag;
pub use config::{ConfigError, SearchConfig, SearchConfigUpdate};
pub use counters::{evaluate, Counters};
pub use observer::{DecisionKind, FlipStep, SearchObserver, TryStart};
pub use searcher::{run, Outcome, SearchError, SearchReport, Searcher};

pub mod dimacs {
    //! DIMACS CNF parser and writer.
    pub use gsat_dimacs::*;
}
