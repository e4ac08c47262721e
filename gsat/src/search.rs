//! The search driver.
//!
//! Each call to [`search_step`] advances the state machine by one transition, performing at most
//! one flip:
//!
//! ```text
//! NewTry -> Evaluating -> Iterating -> Solved | Cancelled | TryExhausted
//! TryExhausted -> NewTry | Stopped
//! ```
use log::{debug, info, log_enabled, trace, Level};
use partial_ref::{partial, PartialRef};
use rand::Rng;

use crate::context::{
    AssignmentP, Context, CountersP, FormulaP, OccurrencesP, RngP, SearchConfigP, SearchStateP,
    TieBreakP,
};
use crate::counters::{check_counters, evaluate_assignment};
use crate::gain::flip_var;
use crate::greedy::greedy_choice;
use crate::observer::{DecisionKind, FlipStep, SearchObserver, TryStart};
use crate::occurrence::Occurrences;
use crate::searcher::SearchError;
use crate::state::SearchPhase;
use crate::walk::random_walk_choice;

/// Prepare a new search run.
///
/// Rebuilds the occurrence lists if the formula changed, sizes the per variable buffers and
/// reseeds the random number generator.
pub fn start_search(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut OccurrencesP,
        mut RngP,
        mut SearchStateP,
        mut TieBreakP,
        FormulaP,
        SearchConfigP,
    ),
) -> Result<(), SearchError> {
    let var_count = ctx.part(FormulaP).var_count();

    let stale = ctx.part(SearchStateP).formula_changed
        || ctx.part(OccurrencesP).var_count() != var_count;
    if stale {
        let occurrences = Occurrences::build(ctx.part(FormulaP))?;
        info!(
            "Built occurrence lists with {} entries for {} variables and {} clauses",
            occurrences.len(),
            var_count,
            ctx.part(FormulaP).len()
        );
        occurrences.log_lists();
        *ctx.part_mut(OccurrencesP) = occurrences;
        ctx.part_mut(SearchStateP).formula_changed = false;
    }

    ctx.part_mut(AssignmentP).set_var_count(var_count)?;
    ctx.part_mut(TieBreakP).set_var_count(var_count)?;

    let seed = ctx.part(SearchConfigP).seed;
    ctx.part_mut(RngP).reseed(seed);
    ctx.part_mut(SearchStateP).restart();
    Ok(())
}

/// Perform one step of the search.
///
/// Returns `false` once a terminal phase is reached.
pub fn search_step(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut CountersP,
        mut RngP,
        mut SearchStateP,
        mut TieBreakP,
        FormulaP,
        OccurrencesP,
        SearchConfigP,
    ),
    observers: &mut [&mut dyn SearchObserver],
) -> Result<bool, SearchError> {
    let phase = ctx.part(SearchStateP).phase;
    let next = match phase {
        SearchPhase::NewTry => {
            let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);
            assignment.randomize(ctx.part_mut(RngP).rng());
            let state = ctx.part_mut(SearchStateP);
            state.tries += 1;
            state.iteration = 0;
            debug!("Starting try {}", state.tries);
            SearchPhase::Evaluating
        }
        SearchPhase::Evaluating => evaluate_try(ctx.borrow(), observers)?,
        SearchPhase::Iterating => iterate(ctx.borrow(), observers)?,
        SearchPhase::TryExhausted => {
            let config = ctx.part(SearchConfigP);
            let state = ctx.part(SearchStateP);
            let tries_left = !config.tries_bounded() || state.tries < config.max_tries;
            debug!(
                "Try {} exhausted with {} of {} clauses satisfied",
                state.tries,
                state.satisfied,
                ctx.part(FormulaP).len()
            );
            if tries_left && !state.cancel.is_cancelled() {
                SearchPhase::NewTry
            } else {
                SearchPhase::Stopped
            }
        }
        SearchPhase::Solved | SearchPhase::Cancelled | SearchPhase::Stopped => return Ok(false),
    };

    ctx.part_mut(SearchStateP).phase = next;
    Ok(!next.is_terminal())
}

/// Full evaluation at the start of a try.
fn evaluate_try(
    mut ctx: partial!(
        Context,
        mut CountersP,
        mut SearchStateP,
        AssignmentP,
        FormulaP,
    ),
    observers: &mut [&mut dyn SearchObserver],
) -> Result<SearchPhase, SearchError> {
    let satisfied = evaluate_assignment(ctx.borrow())?;
    let len = ctx.part(FormulaP).len();

    let state = ctx.part_mut(SearchStateP);
    state.satisfied = satisfied;
    let try_number = state.tries;
    let satisfied_total = state.satisfied_total();

    debug!(
        "Try {}: {} of {} clauses satisfied initially",
        try_number, satisfied, len
    );
    if log_enabled!(Level::Debug) {
        debug!("Assignment: {:?}", ctx.part(AssignmentP));
        debug!("Counters: {:?}", ctx.part(CountersP).as_slice());
    }

    let event = TryStart {
        try_number,
        satisfied: satisfied_total,
        assignment: ctx.part(AssignmentP),
        counters: ctx.part(CountersP),
    };
    for observer in observers.iter_mut() {
        observer.try_started(&event);
    }

    if satisfied == len {
        Ok(SearchPhase::Solved)
    } else {
        ctx.part_mut(SearchStateP).iteration = 1;
        Ok(SearchPhase::Iterating)
    }
}

/// One iteration of a try, or the transition out of the iteration phase.
fn iterate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut CountersP,
        mut RngP,
        mut SearchStateP,
        mut TieBreakP,
        FormulaP,
        OccurrencesP,
        SearchConfigP,
    ),
    observers: &mut [&mut dyn SearchObserver],
) -> Result<SearchPhase, SearchError> {
    let len = ctx.part(FormulaP).len();
    let config = ctx.part(SearchConfigP);
    let random_step_probability = config.random_step_probability;
    let self_check = config.self_check;

    let state = ctx.part(SearchStateP);
    if state.satisfied == len {
        return Ok(SearchPhase::Solved);
    }
    if state.cancel.is_cancelled() {
        return Ok(SearchPhase::Cancelled);
    }
    if config.iterations_bounded() && state.iteration > config.max_iterations {
        return Ok(SearchPhase::TryExhausted);
    }

    let draw: f64 = ctx.part_mut(RngP).rng().gen();
    let (kind, var) = if draw > random_step_probability {
        (DecisionKind::Greedy, greedy_choice(ctx.borrow())?)
    } else {
        (DecisionKind::RandomWalk, random_walk_choice(ctx.borrow())?)
    };

    let gain = match var {
        Some(var) => flip_var(ctx.borrow(), var)?,
        None => 0,
    };

    let satisfied = ctx.part(SearchStateP).satisfied as isize + gain;
    if satisfied < 0 || satisfied as usize > len {
        return Err(SearchError::InvariantViolation(format!(
            "satisfied count {} out of range after a gain of {}",
            satisfied, gain
        )));
    }
    let satisfied = satisfied as usize;

    if self_check {
        check_counters(ctx.borrow(), satisfied)?;
    }

    let state = ctx.part_mut(SearchStateP);
    state.satisfied = satisfied;
    let iteration = state.iteration;
    let try_number = state.tries;
    let satisfied_total = state.satisfied_total();
    state.iteration += 1;
    state.total_iterations += 1;

    trace!(
        "itr {} {} flip {:?} gain {} satisfied {}",
        iteration,
        kind.name(),
        var,
        gain,
        satisfied
    );

    let event = FlipStep {
        try_number,
        iteration,
        kind,
        var,
        gain,
        satisfied: satisfied_total,
        assignment: ctx.part(AssignmentP),
        counters: ctx.part(CountersP),
    };
    for observer in observers.iter_mut() {
        observer.flipped(&event);
    }

    Ok(SearchPhase::Iterating)
}
