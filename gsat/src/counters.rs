//! Per clause counts of true literals.
use partial_ref::{partial, PartialRef};

use crate::alloc::filled_vec;
use crate::assignment::Assignment;
use crate::cnf::CnfFormula;
use crate::context::{AssignmentP, Context, CountersP, FormulaP};
use crate::searcher::SearchError;

/// Number of true literals of each clause.
///
/// A clause is satisfied iff its counter is nonzero. During a try the counters are kept up to
/// date with the assignment by the flip operations, a full evaluation only happens when a try
/// starts.
#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct Counters {
    counts: Vec<usize>,
}

impl Counters {
    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of true literals in the given clause.
    #[inline]
    pub fn get(&self, clause: usize) -> usize {
        self.counts[clause]
    }

    #[inline]
    pub fn is_satisfied(&self, clause: usize) -> bool {
        self.counts[clause] != 0
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.counts
    }

    /// Increment a counter, returning the new value.
    #[inline]
    pub(crate) fn increment(&mut self, clause: usize) -> usize {
        let count = &mut self.counts[clause];
        *count += 1;
        *count
    }

    /// Decrement a counter, returning the new value.
    #[inline]
    pub(crate) fn decrement(&mut self, clause: usize) -> Result<usize, SearchError> {
        let count = &mut self.counts[clause];
        *count = count.checked_sub(1).ok_or_else(|| {
            SearchError::InvariantViolation(format!("counter of clause {} below zero", clause))
        })?;
        Ok(*count)
    }

    /// Recompute all counters from scratch.
    ///
    /// Returns the number of satisfied clauses.
    pub fn evaluate(
        &mut self,
        formula: &CnfFormula,
        assignment: &Assignment,
    ) -> Result<usize, SearchError> {
        if assignment.var_count() < formula.var_count() {
            return Err(SearchError::InvariantViolation(format!(
                "assignment of {} variables for a formula of {} variables",
                assignment.var_count(),
                formula.var_count()
            )));
        }

        if self.counts.len() != formula.len() {
            self.counts = filled_vec(formula.len(), 0, "clause counters")?;
        }

        let mut satisfied = 0;
        for (count, clause) in self.counts.iter_mut().zip(formula.iter()) {
            *count = clause
                .iter()
                .filter(|&&lit| assignment.lit_is_true(lit))
                .count();
            if *count != 0 {
                satisfied += 1;
            }
        }
        Ok(satisfied)
    }

    /// Number of satisfied clauses, counted from the counters.
    pub fn count_satisfied(&self) -> usize {
        self.counts.iter().filter(|&&count| count != 0).count()
    }
}

/// Evaluate a formula under an assignment.
///
/// Returns the counters of true literals and the number of satisfied clauses.
pub fn evaluate(
    formula: &CnfFormula,
    assignment: &Assignment,
) -> Result<(Counters, usize), SearchError> {
    let mut counters = Counters::default();
    let satisfied = counters.evaluate(formula, assignment)?;
    Ok((counters, satisfied))
}

/// Full evaluation of the current assignment into the counters of the context.
pub fn evaluate_assignment(
    mut ctx: partial!(Context, mut CountersP, AssignmentP, FormulaP),
) -> Result<usize, SearchError> {
    let (counters, ctx) = ctx.split_part_mut(CountersP);
    counters.evaluate(ctx.part(FormulaP), ctx.part(AssignmentP))
}

/// Compare the incremental state against a full recount.
pub fn check_counters(
    ctx: partial!(Context, AssignmentP, CountersP, FormulaP),
    satisfied: usize,
) -> Result<(), SearchError> {
    let (expected, expected_satisfied) = evaluate(ctx.part(FormulaP), ctx.part(AssignmentP))?;
    let counters = ctx.part(CountersP);

    if let Some(clause) = (0..expected.len()).find(|&c| expected.get(c) != counters.get(c)) {
        return Err(SearchError::InvariantViolation(format!(
            "counter of clause {} is {} but the clause has {} true literals",
            clause,
            counters.get(clause),
            expected.get(clause)
        )));
    }
    if expected_satisfied != satisfied {
        return Err(SearchError::InvariantViolation(format!(
            "satisfied count is {} but {} clauses are satisfied",
            satisfied, expected_satisfied
        )));
    }
    Ok(())
}
