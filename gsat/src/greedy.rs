//! Greedy step: a variable with maximal gain.
use partial_ref::{partial, PartialRef};
use rand::Rng;

use crate::alloc::reserve_exact;
use crate::assignment::Assignment;
use crate::context::{AssignmentP, Context, CountersP, OccurrencesP, RngP, TieBreakP};
use crate::counters::Counters;
use crate::gain::gain;
use crate::lit::Var;
use crate::occurrence::Occurrences;
use crate::searcher::SearchError;

/// Variables tied for the maximal gain in the last greedy step.
#[derive(Default)]
pub struct TieBreak {
    candidates: Vec<Var>,
    max_gain: isize,
}

impl TieBreak {
    /// Reserve space for all variables up front.
    pub fn set_var_count(&mut self, count: usize) -> Result<(), SearchError> {
        self.candidates.clear();
        reserve_exact(&mut self.candidates, count, "tie-break buffer")
    }

    pub fn candidates(&self) -> &[Var] {
        &self.candidates
    }

    /// The maximal gain found by the last selection.
    pub fn max_gain(&self) -> isize {
        self.max_gain
    }

    /// Select a variable with maximal flip gain.
    ///
    /// Scans all variables in order. Among several variables with the same maximal gain one is
    /// drawn uniformly, a unique maximum uses no randomness. Returns `None` when there are no
    /// variables.
    pub fn select<R: Rng + ?Sized>(
        &mut self,
        occurrences: &Occurrences,
        counters: &Counters,
        assignment: &Assignment,
        rng: &mut R,
    ) -> Result<Option<Var>, SearchError> {
        self.candidates.clear();
        self.max_gain = isize::min_value();

        for var in Var::range(assignment.var_count()) {
            let var_gain = gain(occurrences, counters, var, assignment.var_value(var));
            if var_gain > self.max_gain {
                self.max_gain = var_gain;
                self.candidates.clear();
                self.candidates.push(var);
            } else if var_gain == self.max_gain {
                self.candidates.push(var);
            }
        }

        match self.candidates.len() {
            0 => Ok(None),
            1 => Ok(Some(self.candidates[0])),
            len => {
                let index = rng.gen_range(0..=len - 1);
                candidate_at(&self.candidates, index).map(Some)
            }
        }
    }
}

/// The tied candidate at a drawn index.
fn candidate_at(candidates: &[Var], index: usize) -> Result<Var, SearchError> {
    candidates.get(index).copied().ok_or_else(|| {
        SearchError::InvariantViolation(format!(
            "tie-break index {} out of range for {} candidates",
            index,
            candidates.len()
        ))
    })
}

/// Select the variable to flip in a greedy step.
pub fn greedy_choice(
    mut ctx: partial!(
        Context,
        mut RngP,
        mut TieBreakP,
        AssignmentP,
        CountersP,
        OccurrencesP,
    ),
) -> Result<Option<Var>, SearchError> {
    let (tie_break, mut ctx) = ctx.split_part_mut(TieBreakP);
    let (rng, ctx) = ctx.split_part_mut(RngP);
    tie_break.select(
        ctx.part(OccurrencesP),
        ctx.part(CountersP),
        ctx.part(AssignmentP),
        rng.rng(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    use gsat_formula::{cnf_formula, lit, var};

    use crate::cnf::CnfFormula;
    use crate::counters::evaluate_assignment;
    use crate::gain::var_gain;
    use crate::test::{loaded_context, random_assignment};

    #[test]
    fn drawn_index_out_of_range() {
        let candidates = [var!(3), var!(5)];
        assert_eq!(candidate_at(&candidates, 1), Ok(var!(5)));
        match candidate_at(&candidates, 2) {
            Err(SearchError::InvariantViolation(message)) => {
                assert!(message.contains("index 2 out of range for 2 candidates"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unique_maximum_uses_no_randomness() {
        let formula = cnf_formula![
            1, 2;
            1, 3;
            1, -2;
        ];
        let mut ctx = loaded_context(&formula);
        let mut ctx = ctx.into_partial_ref_mut();
        evaluate_assignment(ctx.borrow()).unwrap();

        let mut tie_break = TieBreak::default();
        tie_break.set_var_count(3).unwrap();

        // Still at its first value afterwards if no number was drawn
        let mut rng = StepRng::new(7, 1);
        let choice = tie_break
            .select(
                ctx.part(OccurrencesP),
                ctx.part(CountersP),
                ctx.part(AssignmentP),
                &mut rng,
            )
            .unwrap();

        assert_eq!(choice, Some(var!(1)));
        assert_eq!(tie_break.max_gain(), 2);
        assert_eq!(tie_break.candidates(), &[var!(1)]);
        assert_eq!(rng.next_u64(), 7);
    }

    #[test]
    fn ties_are_collected_in_order() {
        let formula = cnf_formula![
            1, 2;
            3, 4;
            -2;
        ];
        let mut ctx = loaded_context(&formula);
        let mut ctx = ctx.into_partial_ref_mut();
        ctx.part_mut(AssignmentP).assign_lit(lit!(2));
        evaluate_assignment(ctx.borrow()).unwrap();

        let mut tie_break = TieBreak::default();
        tie_break.set_var_count(4).unwrap();

        let mut rng = StepRng::new(0, 0);
        let choice = tie_break
            .select(
                ctx.part(OccurrencesP),
                ctx.part(CountersP),
                ctx.part(AssignmentP),
                &mut rng,
            )
            .unwrap();

        // x1: 0, x2 repairs -2 but breaks 1 v 2: 0, x3 and x4 satisfy 3 v 4: 1
        assert_eq!(tie_break.max_gain(), 1);
        assert_eq!(tie_break.candidates(), &[var!(3), var!(4)]);
        assert_eq!(choice, Some(var!(3)));
    }

    #[test]
    fn no_variables() {
        let mut ctx = loaded_context(&CnfFormula::new());
        let mut ctx = ctx.into_partial_ref_mut();
        evaluate_assignment(ctx.borrow()).unwrap();
        assert_eq!(greedy_choice(ctx.borrow()), Ok(None));
    }

    proptest! {
        #[test]
        fn selects_a_maximal_gain(
            formula in gsat_formula::cnf::strategy::cnf_formula(1..20usize, 1..80, 1..5),
            seed in any::<u64>(),
        ) {
            let mut ctx = loaded_context(&formula);
            let mut ctx = ctx.into_partial_ref_mut();
            random_assignment(ctx.borrow(), seed);
            evaluate_assignment(ctx.borrow()).unwrap();

            let gains: Vec<isize> = Var::range(ctx.part(AssignmentP).var_count())
                .map(|var| var_gain(ctx.borrow(), var))
                .collect();
            let max_gain = *gains.iter().max().unwrap();
            let expected: Vec<Var> = Var::range(gains.len())
                .filter(|var| gains[var.index()] == max_gain)
                .collect();

            let mut tie_break = TieBreak::default();
            tie_break.set_var_count(gains.len()).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed);
            let choice = tie_break
                .select(
                    ctx.part(OccurrencesP),
                    ctx.part(CountersP),
                    ctx.part(AssignmentP),
                    &mut rng,
                )
                .unwrap()
                .unwrap();

            prop_assert_eq!(tie_break.max_gain(), max_gain);
            prop_assert_eq!(tie_break.candidates(), &expected[..]);
            prop_assert_eq!(gains[choice.index()], max_gain);
        }
    }
}
