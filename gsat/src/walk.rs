//! Random walk step: a variable of a random unsatisfied clause.
use partial_ref::{partial, PartialRef};
use rand::Rng;

use crate::context::{Context, CountersP, FormulaP, RngP, SearchStateP};
use crate::counters::Counters;
use crate::lit::{Lit, Var};
use crate::searcher::SearchError;

/// Pick an unsatisfied clause uniformly at random.
///
/// Draws a rank among the `len - satisfied` unsatisfied clauses and scans the counters for the
/// clause with that rank.
pub fn pick_unsat_clause<R: Rng + ?Sized>(
    counters: &Counters,
    satisfied: usize,
    rng: &mut R,
) -> Result<usize, SearchError> {
    let unsatisfied = counters.len().saturating_sub(satisfied);
    if unsatisfied == 0 {
        return Err(SearchError::InvariantViolation(format!(
            "random walk with {} of {} clauses satisfied",
            satisfied,
            counters.len()
        )));
    }

    let rank = rng.gen_range(1..=unsatisfied);

    let mut seen = 0;
    for (clause, &count) in counters.as_slice().iter().enumerate() {
        if count == 0 {
            seen += 1;
            if seen == rank {
                return Ok(clause);
            }
        }
    }

    Err(SearchError::InvariantViolation(format!(
        "expected {} unsatisfied clauses, found {}",
        unsatisfied, seen
    )))
}

/// Pick the variable of a uniformly random literal of a clause.
///
/// An empty clause has no variable to offer and uses no randomness.
pub fn pick_var_in_clause<R: Rng + ?Sized>(clause: &[Lit], rng: &mut R) -> Option<Var> {
    if clause.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..=clause.len() - 1);
    Some(clause[index].var())
}

/// Select the variable to flip in a random walk step.
pub fn random_walk_choice(
    mut ctx: partial!(Context, mut RngP, CountersP, FormulaP, SearchStateP),
) -> Result<Option<Var>, SearchError> {
    let (rng, ctx) = ctx.split_part_mut(RngP);
    let satisfied = ctx.part(SearchStateP).satisfied;
    let clause = pick_unsat_clause(ctx.part(CountersP), satisfied, rng.rng())?;
    Ok(pick_var_in_clause(ctx.part(FormulaP).clause(clause), rng.rng()))
}
