//! Occurrence lists of all literals.
use log::{debug, log_enabled, Level};

use crate::alloc::filled_vec;
use crate::cnf::CnfFormula;
use crate::lit::{Lit, Var};
use crate::searcher::SearchError;

/// For every literal the clauses containing it, in clause order.
///
/// All lists share one buffer: the list of the literal with code `c` is
/// `clauses[offsets[c]..offsets[c + 1]]`. Built once per formula, read-only during the search.
#[derive(Default)]
pub struct Occurrences {
    offsets: Vec<usize>,
    clauses: Vec<usize>,
}

impl Occurrences {
    /// Build the occurrence lists of a formula.
    ///
    /// The first pass counts the occurrences of each literal, the second one fills the exactly
    /// sized lists.
    pub fn build(formula: &CnfFormula) -> Result<Occurrences, SearchError> {
        let lit_count = formula.var_count() * 2;

        let mut offsets = filled_vec(lit_count + 1, 0, "occurrence offsets")?;
        for clause in formula.iter() {
            for &lit in clause {
                offsets[lit.code() + 1] += 1;
            }
        }
        for code in 0..lit_count {
            offsets[code + 1] += offsets[code];
        }

        let mut clauses = filled_vec(offsets[lit_count], 0, "occurrence lists")?;
        let mut fill = filled_vec(lit_count, 0, "occurrence offsets")?;
        fill.copy_from_slice(&offsets[..lit_count]);

        for (index, clause) in formula.iter().enumerate() {
            for &lit in clause {
                let pos = &mut fill[lit.code()];
                clauses[*pos] = index;
                *pos += 1;
            }
        }

        Ok(Occurrences { offsets, clauses })
    }

    pub fn var_count(&self) -> usize {
        self.offsets.len().saturating_sub(1) / 2
    }

    /// Total number of literal occurrences.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Clauses containing `lit`.
    #[inline]
    pub fn clauses_of(&self, lit: Lit) -> &[usize] {
        let code = lit.code();
        &self.clauses[self.offsets[code]..self.offsets[code + 1]]
    }

    /// Clauses where `var` occurs positively.
    #[inline]
    pub fn positive(&self, var: Var) -> &[usize] {
        self.clauses_of(var.positive())
    }

    /// Clauses where `var` occurs negatively.
    #[inline]
    pub fn negative(&self, var: Var) -> &[usize] {
        self.clauses_of(var.negative())
    }

    /// Log all occurrence lists at debug level.
    pub fn log_lists(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        for var in Var::range(self.var_count()) {
            debug!("{} P {}: {:?}", var, self.positive(var).len(), self.positive(var));
            debug!("{} N {}: {:?}", var, self.negative(var).len(), self.negative(var));
        }
    }
}
