//! Helpers for unit tests.
use std::ops::Range;

use partial_ref::{partial, IntoPartialRefMut, PartialRef};
use proptest::{collection, prelude::*};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use gsat_formula::{cnf::strategy::cnf_formula, lit::strategy::var};

use crate::cnf::CnfFormula;
use crate::context::{AssignmentP, Context, CountersP, FormulaP};
use crate::counters::check_counters;
use crate::lit::Var;
use crate::load::{ensure_var_count, load_clause};
use crate::search::start_search;

/// A context with `formula` loaded and all buffers sized, every variable false.
///
/// The counters are not evaluated yet.
pub fn loaded_context(formula: &CnfFormula) -> Context {
    let mut ctx = Context::default();
    {
        let mut ctx = ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
        start_search(ctx.borrow()).unwrap();
    }
    ctx
}

/// Overwrite the assignment with random values.
pub fn random_assignment(mut ctx: partial!(Context, mut AssignmentP), seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    ctx.part_mut(AssignmentP).randomize(&mut rng);
}

/// Panics if the counters or the satisfied count differ from a full recount.
pub fn assert_counters_exact(
    ctx: partial!(Context, AssignmentP, CountersP, FormulaP),
    satisfied: usize,
) {
    if let Err(err) = check_counters(ctx, satisfied) {
        panic!("{}", err);
    }
}

/// A formula over at least one variable, a seed and a sequence of variables to flip.
pub fn formula_with_flips(
    vars: impl Strategy<Value = usize>,
    clauses: Range<usize>,
    clause_len: Range<usize>,
    max_flips: usize,
) -> impl Strategy<Value = (CnfFormula, u64, Vec<Var>)> {
    vars.prop_flat_map(move |vars| {
        (
            cnf_formula(Just(vars), clauses.clone(), clause_len.clone()),
            any::<u64>(),
            collection::vec(var(0..vars), 0..max_flips),
        )
    })
}
