//! Local search SAT solver.
use std::io;

use anyhow::Error;
use log::info;
use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};
use thiserror::Error;

use crate::assignment::Assignment;
use crate::cancel::CancelFlag;
use crate::cnf::CnfFormula;
use crate::config::{ConfigError, SearchConfig, SearchConfigUpdate};
use crate::context::{AssignmentP, Context, CountersP, FormulaP, SearchStateP};
use crate::counters::{check_counters, Counters};
use crate::dimacs::DimacsParser;
use crate::lit::Lit;
use crate::load::{ensure_var_count, load_clause};
use crate::observer::SearchObserver;
use crate::search::{search_step, start_search};
use crate::state::SearchPhase;

/// Possible errors while searching.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("Could not allocate the {what} for {count} entries")]
    AllocationFailure { what: &'static str, count: usize },
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// How a search run ended.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Outcome {
    /// All clauses are satisfied.
    Solved,
    /// All tries were used up.
    Stopped,
    /// The cancel flag was raised.
    Cancelled,
}

impl Outcome {
    pub fn is_solved(self) -> bool {
        self == Outcome::Solved
    }
}

/// Result of a search run.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchReport {
    pub outcome: Outcome,
    /// The final assignment, one literal per variable.
    pub model: Vec<Lit>,
    pub satisfied: usize,
    /// Number of clauses of the formula.
    pub clauses: usize,
    /// Flips over all tries.
    pub iterations: u64,
    pub tries: u64,
}

/// A GSAT local search solver.
///
/// Observers registered with [`add_observer`](Searcher::add_observer) must outlive the searcher.
#[derive(Default)]
pub struct Searcher<'a> {
    ctx: Box<Context>,
    observers: Vec<&'a mut dyn SearchObserver>,
}

impl<'a> Searcher<'a> {
    /// Create a new searcher with the default configuration.
    pub fn new() -> Searcher<'a> {
        Searcher::default()
    }

    /// Change the configuration.
    ///
    /// The configuration is left unchanged if the updated values are invalid.
    pub fn config(&mut self, update: &SearchConfigUpdate) -> Result<(), ConfigError> {
        let mut config = self.ctx.search_config.clone();
        update.apply(&mut config);
        config.validate()?;
        self.ctx.search_config = config;
        Ok(())
    }

    /// The current configuration.
    pub fn search_config(&self) -> &SearchConfig {
        &self.ctx.search_config
    }

    /// Add a formula to the searcher.
    ///
    /// Clauses are added to those already present. Duplicated literals within a clause are
    /// removed. Tautological clauses are not stored but still count towards
    /// [`clauses`](Searcher::clauses) and [`satisfied`](Searcher::satisfied).
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        let mut skipped = 0;
        for clause in formula.iter() {
            if !load_clause(ctx.borrow(), clause) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            info!("Skipped {} tautological clauses", skipped);
        }
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// Using this avoids creating a temporary [`CnfFormula`].
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        self.add_dimacs_cnf_with_parser(DimacsParser::new(), input)
    }

    /// Reads and adds a formula in DIMACS CNF format using a configured parser.
    pub fn add_dimacs_cnf_with_parser(
        &mut self,
        mut parser: DimacsParser,
        input: impl io::Read,
    ) -> Result<(), Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);

            self.add_formula(&parser.take_formula());
        }
        parser.eof()?;
        self.add_formula(&parser.take_formula());
        parser.check_header()?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// The loaded formula, after removal of duplicated literals and tautological clauses.
    pub fn formula(&self) -> &CnfFormula {
        &self.ctx.formula
    }

    /// A handle for cancelling a running search from another thread.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.ctx.search_state.cancel.clone()
    }

    /// Use an existing cancel flag.
    pub fn set_cancel_flag(&mut self, cancel: CancelFlag) {
        self.ctx.search_state.cancel = cancel;
    }

    /// Register an observer for try starts and flips.
    pub fn add_observer(&mut self, observer: &'a mut dyn SearchObserver) {
        self.observers.push(observer);
    }

    /// Search for a satisfying assignment.
    ///
    /// Every call starts a new run from the configured seed. Cancellation is not an error: a
    /// cancelled search returns [`Outcome::Cancelled`] and keeps its current assignment.
    pub fn search(&mut self) -> Result<Outcome, SearchError> {
        self.ctx.search_config.validate()?;

        let mut ctx = self.ctx.into_partial_ref_mut();
        start_search(ctx.borrow())?;
        while search_step(ctx.borrow(), &mut self.observers)? {}

        let state = ctx.part(SearchStateP);
        let outcome = match state.phase {
            SearchPhase::Solved => Outcome::Solved,
            SearchPhase::Cancelled => Outcome::Cancelled,
            _ => Outcome::Stopped,
        };

        info!(
            "{:?} after {} tries and {} flips with {} of {} clauses satisfied",
            outcome,
            state.tries,
            state.total_iterations,
            state.satisfied_total(),
            ctx.part(FormulaP).len() + state.tautologies
        );

        Ok(outcome)
    }

    /// The current assignment as one literal per variable.
    ///
    /// After a search this is the final assignment of the last try, whether it satisfies the
    /// formula or not.
    pub fn model(&self) -> Vec<Lit> {
        self.ctx.assignment.model()
    }

    pub fn assignment(&self) -> &Assignment {
        &self.ctx.assignment
    }

    /// Number of clauses satisfied by the current assignment.
    ///
    /// Tautological clauses are always satisfied.
    pub fn satisfied(&self) -> usize {
        self.ctx.search_state.satisfied_total()
    }

    /// Number of clauses added, including tautological ones.
    pub fn clauses(&self) -> usize {
        self.ctx.formula.len() + self.ctx.search_state.tautologies
    }

    pub fn counters(&self) -> &Counters {
        &self.ctx.counters
    }

    /// Tries started by the last search.
    pub fn tries(&self) -> u64 {
        self.ctx.search_state.tries
    }

    /// Flips performed by the last search, over all tries.
    pub fn iterations(&self) -> u64 {
        self.ctx.search_state.total_iterations
    }

    /// Summary of the last search.
    pub fn report(&self, outcome: Outcome) -> SearchReport {
        SearchReport {
            outcome,
            model: self.model(),
            satisfied: self.satisfied(),
            clauses: self.clauses(),
            iterations: self.iterations(),
            tries: self.tries(),
        }
    }

    /// Verify the counters and the satisfied count against a full recount.
    ///
    /// Does nothing before the first search or after adding clauses.
    pub fn check_invariants(&self) -> Result<(), SearchError> {
        let mut ctx = self.ctx.into_partial_ref();
        let state = ctx.part(SearchStateP);
        if state.formula_changed || state.tries == 0 {
            return Ok(());
        }
        let satisfied = state.satisfied;

        let formula = ctx.part(FormulaP);
        if ctx.part(AssignmentP).var_count() != formula.var_count()
            || ctx.part(CountersP).len() != formula.len()
        {
            return Err(SearchError::InvariantViolation(
                "search state does not match the formula".to_owned(),
            ));
        }
        check_counters(ctx.borrow(), satisfied)
    }
}

/// Search a formula with the given configuration.
pub fn run(formula: &CnfFormula, config: &SearchConfig) -> Result<SearchReport, SearchError> {
    config.validate()?;
    let mut searcher = Searcher::new();
    searcher.ctx.search_config = config.clone();
    searcher.add_formula(formula);
    let outcome = searcher.search()?;
    Ok(searcher.report(outcome))
}
