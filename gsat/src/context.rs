//! Central search data structure.
use partial_ref::{part, PartialRefTarget};

use crate::assignment::Assignment;
use crate::cnf::CnfFormula;
use crate::config::SearchConfig;
use crate::counters::Counters;
use crate::greedy::TieBreak;
use crate::load::TmpData;
use crate::occurrence::Occurrences;
use crate::rng::SearchRng;
use crate::state::SearchState;

/// Part declarations for the [`Context`] struct.
mod parts {
    use super::*;

    part!(pub AssignmentP: Assignment);
    part!(pub CountersP: Counters);
    part!(pub FormulaP: CnfFormula);
    part!(pub OccurrencesP: Occurrences);
    part!(pub RngP: SearchRng);
    part!(pub SearchConfigP: SearchConfig);
    part!(pub SearchStateP: SearchState);
    part!(pub TieBreakP: TieBreak);
    part!(pub TmpDataP: TmpData);
}

pub use parts::*;

/// Central search data structure.
///
/// This struct contains all data kept by the searcher. Functions operating on multiple fields of
/// the context use partial references provided by the `partial_ref` crate, which documents their
/// data dependencies and keeps the borrow checker happy.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part(AssignmentP)]
    pub assignment: Assignment,
    #[part(CountersP)]
    pub counters: Counters,
    #[part(FormulaP)]
    pub formula: CnfFormula,
    #[part(OccurrencesP)]
    pub occurrences: Occurrences,
    #[part(RngP)]
    pub rng: SearchRng,
    #[part(SearchConfigP)]
    pub search_config: SearchConfig,
    #[part(SearchStateP)]
    pub search_state: SearchState,
    #[part(TieBreakP)]
    pub tie_break: TieBreak,
    #[part(TmpDataP)]
    pub tmp_data: TmpData,
}
