//! CNF formulas.
use std::cmp::max;
use std::fmt;
use std::ops::Range;

use crate::lit::Lit;

/// A formula in conjunctive normal form (CNF).
///
/// All literals are kept in one buffer, each clause is a range into that buffer. Clauses are
/// addressed by their 0-based position in insertion order.
#[derive(Default, Clone, Eq)]
pub struct CnfFormula {
    var_count: usize,
    width: usize,
    literals: Vec<Lit>,
    clause_ranges: Vec<Range<usize>>,
}

impl CnfFormula {
    /// Create an empty CNF formula.
    pub fn new() -> CnfFormula {
        CnfFormula::default()
    }

    /// Number of variables in the formula.
    ///
    /// Variables that do not occur in any clause are counted as long as a variable with a higher
    /// index is present or the count was raised using [`set_var_count`](Self::set_var_count).
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Increase the number of variables in the formula.
    ///
    /// Does nothing if `count` is not larger than the current variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clause_ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clause_ranges.is_empty()
    }

    /// Length of the longest clause.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of literal occurrences over all clauses.
    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    /// Appends a clause to the formula.
    ///
    /// `literals` can be an `IntoIterator<Item = Lit>` or `IntoIterator<Item = &Lit>`.
    pub fn add_clause<L>(&mut self, literals: impl IntoIterator<Item = L>)
    where
        Vec<Lit>: Extend<L>,
    {
        let begin = self.literals.len();
        self.literals.extend(literals);
        let end = self.literals.len();

        for &lit in self.literals[begin..end].iter() {
            self.var_count = max(lit.index() + 1, self.var_count);
        }
        self.width = max(self.width, end - begin);

        self.clause_ranges.push(begin..end);
    }

    /// Literals of the clause at position `index`.
    ///
    /// Panics if `index` is not less than [`len`](Self::len).
    pub fn clause(&self, index: usize) -> &[Lit] {
        &self.literals[self.clause_ranges[index].clone()]
    }

    /// Iterator over all clauses in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[Lit]> {
        let literals = &self.literals;
        self.clause_ranges
            .iter()
            .map(move |range| &literals[range.clone()])
    }
}

/// Collects any iterable of [`Lit`] iterables into a formula, one clause per inner iterable.
impl<F, I, L> From<F> for CnfFormula
where
    F: IntoIterator<Item = I>,
    I: IntoIterator<Item = L>,
    Vec<Lit>: Extend<L>,
{
    fn from(formula: F) -> CnfFormula {
        let mut cnf_formula = CnfFormula::new();
        for clause in formula {
            cnf_formula.add_clause(clause);
        }
        cnf_formula
    }
}

impl fmt::Debug for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.var_count(), f)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for CnfFormula {
    fn eq(&self, other: &CnfFormula) -> bool {
        self.var_count() == other.var_count()
            && self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    /// Formulas over exactly `vars` variables.
    ///
    /// The variable count is fixed up front, so variables that happen to not occur still count.
    pub fn cnf_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = CnfFormula> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        vars.prop_flat_map(move |vars| {
            collection::vec(
                collection::vec(lit(0..vars), clause_len.clone()),
                clauses.clone(),
            )
            .prop_map(move |clauses| {
                let mut formula = CnfFormula::from(clauses);
                formula.set_var_count(vars);
                formula
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{strategy::*, *};

    use proptest::*;

    #[test]
    fn clause_access() {
        let formula = cnf_formula![
            1, 2, 3;
            -1, 2;
            ;
            -2, 7;
        ];

        assert_eq!(formula.len(), 4);
        assert_eq!(formula.var_count(), 7);
        assert_eq!(formula.width(), 3);
        assert_eq!(formula.literal_count(), 7);
        assert_eq!(formula.clause(1), &lits_of(&[-1, 2])[..]);
        assert!(formula.clause(2).is_empty());
        assert_eq!(formula.iter().len(), 4);
    }

    #[test]
    fn explicit_var_count_is_kept() {
        let mut formula = cnf_formula![
            1, -2;
        ];
        formula.set_var_count(5);
        formula.set_var_count(3);
        assert_eq!(formula.var_count(), 5);
    }

    fn lits_of(numbers: &[isize]) -> Vec<Lit> {
        numbers.iter().map(|&n| Lit::from_dimacs(n)).collect()
    }

    proptest! {
        #[test]
        fn width_and_var_count(formula in cnf_formula(1..50usize, 0..200, 0..8)) {
            let width = formula.iter().map(|clause| clause.len()).max().unwrap_or(0);
            prop_assert_eq!(formula.width(), width);

            for clause in formula.iter() {
                for lit in clause {
                    prop_assert!(lit.index() < formula.var_count());
                }
            }

            let copy = CnfFormula::from(formula.iter());
            prop_assert!(copy.var_count() <= formula.var_count());
            for (index, clause) in copy.iter().enumerate() {
                prop_assert_eq!(clause, formula.clause(index));
            }
        }
    }
}
