use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::Error;
use clap::{value_t, values_t, App, AppSettings, Arg, ArgMatches};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use gsat::config::{SearchConfig, SearchConfigUpdate};
use gsat::dimacs::{write_model, DimacsParser};
use gsat::{Outcome, SearchReport, Searcher};

mod trace;

use trace::{DataLog, Trace};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging(debug: bool) {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(
            None,
            if debug {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        );

    if let Ok(ref env_var) = env::var("GSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is gsat {}", env!("GSAT_VERSION"));
    info!(
        "  {} build - {}",
        env!("GSAT_PROFILE"),
        env!("GSAT_RUSTC_VERSION")
    );
}

fn app() -> App<'static, 'static> {
    App::new("gsat")
        .version(env!("GSAT_VERSION"))
        .about("GSAT local search with random walk for CNF formulas")
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The DIMACS CNF input file to use (stdin if omitted)'")
        .arg_from_usage("[width] -w --width=[WIDTH] 'Reject clauses with more than WIDTH literals'")
        .arg_from_usage(
            "[iterations] -i --iterations=[N] 'Maximal number of flips per try, 0 for no limit'",
        )
        .arg_from_usage("[tries] -T --tries=[N] 'Number of tries, 0 for no limit'")
        .arg_from_usage(
            "[probability] -p --probability=[P] 'Probability of a random walk step instead of a \
             greedy step'",
        )
        .arg_from_usage("[seed] -r --seed=[SEED] 'Seed of the random number generator'")
        .arg_from_usage(
            "[data-file] -d --data=[FILE] 'Write the satisfied clause count of every step to FILE'",
        )
        .arg_from_usage(
            "[trace-file] -t --trace=[FILE] 'Write the assignment and clause counters of every \
             step to FILE'",
        )
        .arg_from_usage("-D --debug 'Log debug output, including per try dumps'")
        .arg(
            Arg::from_usage(
                "[separator] -e --separator=[SEP] 'Separator of the data log and summary fields'",
            )
            .default_value(" "),
        )
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from configuration file'")
        .arg(
            Arg::from_usage("[config-option] -C --config-option")
                .value_name("OPTION>=<VALUE")
                .help("Specify a single config option, see 'gsat -C help' for a list of options.")
                .multiple(true)
                .number_of_values(1),
        )
        .arg_from_usage("--self-check 'Recount all clauses after every flip'")
}

/// Collect the configuration from files, `-C` options and the shortcut options.
///
/// Later sources override earlier ones.
fn config_update(matches: &ArgMatches) -> Result<SearchConfigUpdate, Error> {
    let mut config_update = SearchConfigUpdate::new();

    if let Some(config_path) = matches.value_of("config-file") {
        let mut config_contents = String::new();
        fs::File::open(config_path)?.read_to_string(&mut config_contents)?;

        config_update.merge(toml::from_str(&config_contents)?);
    }

    for config_option in values_t!(matches, "config-option", String).unwrap_or_default() {
        config_update.merge(toml::from_str(&config_option)?);
    }

    if matches.is_present("iterations") {
        config_update.max_iterations = Some(value_t!(matches, "iterations", u64)?);
    }
    if matches.is_present("tries") {
        config_update.max_tries = Some(value_t!(matches, "tries", u64)?);
    }
    if matches.is_present("probability") {
        config_update.random_step_probability = Some(value_t!(matches, "probability", f64)?);
    }
    if matches.is_present("seed") {
        config_update.seed = Some(value_t!(matches, "seed", u64)?);
    }
    if matches.is_present("self-check") {
        config_update.self_check = Some(true);
    }

    Ok(config_update)
}

fn main_with_err() -> Result<i32, Error> {
    let matches = app().get_matches();

    if values_t!(matches, "config-option", String)
        .unwrap_or_default()
        .iter()
        .any(|option| option == "help")
    {
        print!("{}", SearchConfig::help());
        return Ok(0);
    }

    init_logging(matches.is_present("debug"));
    banner();

    let config_update = config_update(&matches)?;
    let separator = matches.value_of("separator").unwrap_or(" ");

    let mut parser = DimacsParser::new();
    if matches.is_present("width") {
        parser.set_max_width(Some(value_t!(matches, "width", usize)?));
    }

    let mut data_log = match matches.value_of("data-file") {
        Some(path) => {
            info!("Writing data log to file '{}'", path);
            Some(DataLog::new(
                io::BufWriter::new(fs::File::create(path)?),
                separator,
            ))
        }
        None => None,
    };

    let mut trace = match matches.value_of("trace-file") {
        Some(path) => {
            info!("Writing trace to file '{}'", path);
            Some(Trace::new(io::BufWriter::new(fs::File::create(path)?)))
        }
        None => None,
    };

    let mut searcher = Searcher::new();

    searcher.config(&config_update)?;

    let cancel = searcher.cancel_flag();
    ctrlc::set_handler(move || cancel.cancel())?;

    if let Some(data_log) = data_log.as_mut() {
        searcher.add_observer(data_log);
    }
    if let Some(trace) = trace.as_mut() {
        searcher.add_observer(trace);
    }

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    searcher.add_dimacs_cnf_with_parser(parser, file)?;

    let outcome = searcher.search()?;
    let report = searcher.report(outcome);
    let config = searcher.search_config().clone();
    drop(searcher);

    if let Some(data_log) = data_log {
        data_log.finish()?;
    }
    if let Some(trace) = trace {
        trace.finish()?;
    }

    match outcome {
        Outcome::Solved => info!("Satisfying assignment found"),
        Outcome::Stopped => info!("No satisfying assignment found"),
        Outcome::Cancelled => info!("Search cancelled"),
    }

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    write_model(&mut stdout, &report.model)?;
    stdout.flush()?;

    let stderr = io::stderr();
    write_summary(&mut stderr.lock(), &report, &config, separator)?;

    Ok(0)
}

/// Write `iterations max_total satisfied clauses` as a single line.
///
/// `max_total` is the flip budget over all tries, 0 when unbounded.
fn write_summary(
    target: &mut impl Write,
    report: &SearchReport,
    config: &SearchConfig,
    separator: &str,
) -> io::Result<()> {
    writeln!(
        target,
        "{}{}{}{}{}{}{}",
        report.iterations,
        separator,
        config.max_tries.saturating_mul(config.max_iterations),
        separator,
        report.satisfied,
        separator,
        report.clauses
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_for(args: &[&str]) -> SearchConfigUpdate {
        let mut full_args = vec!["gsat"];
        full_args.extend_from_slice(args);
        let matches = app().get_matches_from(full_args);
        config_update(&matches).unwrap()
    }

    #[test]
    fn shortcuts_override_config_options() {
        let update = update_for(&[
            "-C",
            "max_iterations = 10",
            "-C",
            "seed = 4",
            "-i",
            "20",
            "-p",
            "0.25",
            "-T",
            "3",
        ]);

        let mut config = SearchConfig::default();
        update.apply(&mut config);

        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.max_tries, 3);
        assert_eq!(config.seed, 4);
        assert_eq!(config.random_step_probability, 0.25);
        assert!(!config.self_check);
    }

    #[test]
    fn seed_and_self_check() {
        let update = update_for(&["--seed", "99", "--self-check", "input.cnf"]);
        assert_eq!(update.seed, Some(99));
        assert_eq!(update.self_check, Some(true));
        assert_eq!(update.max_iterations, None);
    }

    #[test]
    fn summary_counts_tautologies() {
        let formula = gsat_formula::cnf_formula![
            1, -1;
            2;
            -2;
        ];
        let mut config = SearchConfig::default();
        config.max_iterations = 10;
        config.max_tries = 2;
        let report = gsat::run(&formula, &config).unwrap();

        let mut summary = vec![];
        write_summary(&mut summary, &report, &config, ",").unwrap();
        assert_eq!(String::from_utf8(summary).unwrap(), "20,20,2,3\n");

        let mut model = vec![];
        write_model(&mut model, &report.model).unwrap();
        let model = String::from_utf8(model).unwrap();
        let lits: Vec<&str> = model.split_whitespace().collect();
        assert_eq!(lits.len(), 3);
        assert!(lits[0] == "1" || lits[0] == "-1");
        assert!(lits[1] == "2" || lits[1] == "-2");
        assert_eq!(lits[2], "0");
        assert!(model.ends_with(" 0\n"));
    }

    #[test]
    fn malformed_shortcut_is_an_error() {
        let matches = app().get_matches_from(vec!["gsat", "-i", "many"]);
        assert!(config_update(&matches).is_err());
    }
}
