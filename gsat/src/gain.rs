//! Change of the satisfied clause count caused by flipping a variable.
//!
//! The pure functions compute the gain of a flip from the counters alone, the flip functions
//! perform the flip, update the counters and return the same gain. Both rely on every clause
//! containing each variable at most once, which clause loading ensures.
use partial_ref::{partial, PartialRef};

use crate::context::{AssignmentP, Context, CountersP, OccurrencesP};
use crate::counters::Counters;
use crate::lit::Var;
use crate::occurrence::Occurrences;
use crate::searcher::SearchError;

/// Gain of making a true variable false.
///
/// Clauses where `var` is the only true literal become unsatisfied, clauses without a true
/// literal containing `!var` become satisfied.
pub fn gain_true_to_false(occurrences: &Occurrences, counters: &Counters, var: Var) -> isize {
    let mut gain = 0;
    for &clause in occurrences.positive(var) {
        if counters.get(clause) == 1 {
            gain -= 1;
        }
    }
    for &clause in occurrences.negative(var) {
        if counters.get(clause) == 0 {
            gain += 1;
        }
    }
    gain
}

/// Gain of making a false variable true.
pub fn gain_false_to_true(occurrences: &Occurrences, counters: &Counters, var: Var) -> isize {
    let mut gain = 0;
    for &clause in occurrences.negative(var) {
        if counters.get(clause) == 1 {
            gain -= 1;
        }
    }
    for &clause in occurrences.positive(var) {
        if counters.get(clause) == 0 {
            gain += 1;
        }
    }
    gain
}

/// Gain of flipping `var` given its current `value`.
#[inline]
pub fn gain(occurrences: &Occurrences, counters: &Counters, var: Var, value: bool) -> isize {
    if value {
        gain_true_to_false(occurrences, counters, var)
    } else {
        gain_false_to_true(occurrences, counters, var)
    }
}

/// Update the counters for making a true variable false.
pub fn flip_true_to_false(
    occurrences: &Occurrences,
    counters: &mut Counters,
    var: Var,
) -> Result<isize, SearchError> {
    let mut gain = 0;
    for &clause in occurrences.positive(var) {
        if counters.decrement(clause)? == 0 {
            gain -= 1;
        }
    }
    for &clause in occurrences.negative(var) {
        if counters.increment(clause) == 1 {
            gain += 1;
        }
    }
    Ok(gain)
}

/// Update the counters for making a false variable true.
pub fn flip_false_to_true(
    occurrences: &Occurrences,
    counters: &mut Counters,
    var: Var,
) -> Result<isize, SearchError> {
    let mut gain = 0;
    for &clause in occurrences.negative(var) {
        if counters.decrement(clause)? == 0 {
            gain -= 1;
        }
    }
    for &clause in occurrences.positive(var) {
        if counters.increment(clause) == 1 {
            gain += 1;
        }
    }
    Ok(gain)
}

/// Gain of flipping `var` in the current assignment.
pub fn var_gain(
    ctx: partial!(Context, AssignmentP, CountersP, OccurrencesP),
    var: Var,
) -> isize {
    let value = ctx.part(AssignmentP).var_value(var);
    gain(ctx.part(OccurrencesP), ctx.part(CountersP), var, value)
}

/// Flip `var`, updating assignment and counters.
///
/// Returns the change of the number of satisfied clauses.
pub fn flip_var(
    mut ctx: partial!(Context, mut AssignmentP, mut CountersP, OccurrencesP),
    var: Var,
) -> Result<isize, SearchError> {
    let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);
    let (counters, ctx) = ctx.split_part_mut(CountersP);
    let occurrences = ctx.part(OccurrencesP);

    let gain = if assignment.var_value(var) {
        flip_true_to_false(occurrences, counters, var)?
    } else {
        flip_false_to_true(occurrences, counters, var)?
    };
    assignment.flip(var);
    Ok(gain)
}
