//! Loading a formula into the searcher.
use log::debug;
use partial_ref::{partial, PartialRef};

use crate::context::{Context, FormulaP, SearchStateP, TmpDataP};
use crate::lit::Lit;

/// Temporary data used while loading clauses.
#[derive(Default)]
pub struct TmpData {
    pub lits: Vec<Lit>,
    /// A boolean for each literal.
    ///
    /// Reset to all-false, keep size.
    pub flags: Vec<bool>,
}

impl TmpData {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        if self.flags.len() < count * 2 {
            self.flags.resize(count * 2, false);
        }
    }
}

/// Adds a clause to the formula of the context.
///
/// Removes duplicated literals, keeping the first occurrence of each. Tautological clauses (eg.
/// x v -x v y) are satisfied by every assignment, so they are only counted. Returns whether the
/// clause was added.
pub fn load_clause(
    mut ctx: partial!(Context, mut FormulaP, mut SearchStateP, mut TmpDataP),
    clause: &[Lit],
) -> bool {
    let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);

    let max_index = clause.iter().map(|lit| lit.index() + 1).max().unwrap_or(0);
    tmp_data.set_var_count(max_index);

    let lits = &mut tmp_data.lits;
    let flags = &mut tmp_data.flags;
    lits.clear();

    let mut tautology = false;
    for &lit in clause {
        if flags[(!lit).code()] {
            tautology = true;
            break;
        }
        if !flags[lit.code()] {
            flags[lit.code()] = true;
            lits.push(lit);
        }
    }

    for &lit in clause {
        flags[lit.code()] = false;
    }

    if tautology {
        debug!("Ignoring tautological clause {:?}", clause);
        ctx.part_mut(SearchStateP).tautologies += 1;
        return false;
    }

    ctx.part_mut(FormulaP).add_clause(lits.iter());
    ctx.part_mut(SearchStateP).formula_changed = true;
    true
}

/// Increase the variable count of the formula, marking it as changed.
pub fn ensure_var_count(
    mut ctx: partial!(Context, mut FormulaP, mut SearchStateP),
    count: usize,
) {
    if count > ctx.part(FormulaP).var_count() {
        ctx.part_mut(FormulaP).set_var_count(count);
        ctx.part_mut(SearchStateP).formula_changed = true;
    }
}
