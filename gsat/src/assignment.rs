//! Full assignment of the search.
use rand::Rng;

use crate::alloc::filled_vec;
use crate::lit::{Lit, Var};
use crate::searcher::SearchError;

/// A truth value for every variable.
///
/// Stores one boolean per literal, indexed by the literal's code, so that the truth of a literal
/// is a single lookup. The two entries of a variable are always complementary.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    /// Assignment of `count` variables, all false.
    pub fn new(count: usize) -> Result<Assignment, SearchError> {
        let mut assignment = Assignment::default();
        assignment.set_var_count(count)?;
        Ok(assignment)
    }

    /// Resize for a new variable count and set all variables to false.
    pub fn set_var_count(&mut self, count: usize) -> Result<(), SearchError> {
        if self.values.len() != count * 2 {
            self.values = filled_vec(count * 2, false, "assignment")?;
        }
        for var in Var::range(count) {
            self.set_var(var, false);
        }
        Ok(())
    }

    pub fn var_count(&self) -> usize {
        self.values.len() / 2
    }

    #[inline]
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.values[lit.code()]
    }

    #[inline]
    pub fn var_value(&self, var: Var) -> bool {
        self.values[var.positive().code()]
    }

    pub fn set_var(&mut self, var: Var, value: bool) {
        self.values[var.positive().code()] = value;
        self.values[var.negative().code()] = !value;
    }

    /// Make `lit` true.
    pub fn assign_lit(&mut self, lit: Lit) {
        self.set_var(lit.var(), lit.is_positive())
    }

    /// Negate the value of a variable.
    #[inline]
    pub fn flip(&mut self, var: Var) {
        let code = var.positive().code();
        self.values.swap(code, code + 1);
    }

    /// Draw a uniformly random value for every variable.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for var in Var::range(self.var_count()) {
            let value = rng.gen_range(0..=1u32) == 1;
            self.set_var(var, value);
        }
    }

    /// The literal that is true, for every variable in order.
    pub fn model(&self) -> Vec<Lit> {
        Var::range(self.var_count())
            .map(|var| var.lit(self.var_value(var)))
            .collect()
    }
}

/// Uses the model's DIMACS literals.
impl std::fmt::Debug for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list().entries(self.model()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use gsat_formula::{lit, var};

    #[test]
    fn flip_swaps_complement() {
        let mut assignment = Assignment::new(3).unwrap();
        let x2 = var!(2);

        assert!(assignment.lit_is_true(!x2.positive()));
        assignment.flip(x2);
        assert!(assignment.var_value(x2));
        assert!(assignment.lit_is_true(lit!(2)));
        assert!(!assignment.lit_is_true(lit!(-2)));
        assignment.flip(x2);
        assert!(!assignment.var_value(x2));
        assert!(assignment.lit_is_true(lit!(-2)));
    }

    #[test]
    fn model_and_assign() {
        let mut assignment = Assignment::new(3).unwrap();
        assignment.assign_lit(lit!(1));
        assignment.assign_lit(lit!(-3));
        assert_eq!(assignment.model(), vec![lit!(1), lit!(-2), lit!(-3)]);
        assert_eq!(format!("{:?}", assignment), "[1, -2, -3]");
    }

    #[test]
    fn randomize_keeps_pairs_complementary() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut assignment = Assignment::new(50).unwrap();
        assignment.randomize(&mut rng);
        for var in Var::range(50) {
            assert_ne!(
                assignment.lit_is_true(var.positive()),
                assignment.lit_is_true(var.negative())
            );
        }
        let positive = Var::range(50)
            .filter(|&var| assignment.var_value(var))
            .count();
        assert!(positive > 0 && positive < 50);
    }
}
