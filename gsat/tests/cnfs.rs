use std::collections::HashSet;

use gsat::lit::Lit;
use gsat::{Outcome, SearchConfigUpdate, Searcher};

macro_rules! test_cnf {
    ($name:ident, $result:expr) => {
        #[test]
        fn $name() {
            let _ = env_logger::builder().is_test(true).try_init();

            let cnf = include_bytes!(concat!("cnfs/", stringify!($name), ".cnf"));
            let formula = gsat::dimacs::DimacsParser::parse(&cnf[..]).expect("parsing failed");

            let mut searcher = Searcher::new();
            let mut update = SearchConfigUpdate::new();
            update.self_check = Some(true);
            update.seed = Some(17);
            let result = $result;
            if result {
                update.max_iterations = Some(0);
            } else {
                update.max_iterations = Some(200);
                update.max_tries = Some(3);
            }
            searcher.config(&update).expect("invalid config");
            searcher.add_formula(&formula);

            let outcome = searcher.search().expect("search failed");
            searcher.check_invariants().expect("invariants violated");

            if result {
                assert_eq!(outcome, Outcome::Solved);
                assert_eq!(searcher.satisfied(), formula.len());
                let model: HashSet<Lit> = searcher.model().into_iter().collect();
                for clause in formula.iter() {
                    assert!(clause.iter().any(|&lit| model.contains(&lit)));
                }
            } else {
                assert_eq!(outcome, Outcome::Stopped);
                assert!(searcher.satisfied() < formula.len());
                assert_eq!(searcher.tries(), 3);
                assert_eq!(searcher.iterations(), 600);
            }
        }
    };
}

test_cnf!(chain_sat_3_3, true);
test_cnf!(planted_sat_20_85, true);
test_cnf!(planted_sat_60_240, true);
test_cnf!(php_3_2_unsat, false);
