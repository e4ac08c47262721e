//! Data log and trace files written while searching.
use std::io::{self, Write};

use gsat::dimacs::write_model;
use gsat::{Assignment, Counters, FlipStep, SearchObserver, TryStart};

/// Writes `iteration satisfied` for every try start and every flip.
///
/// The first write error is kept and stops further output.
pub struct DataLog<W: Write> {
    target: W,
    separator: String,
    error: Option<io::Error>,
}

impl<W: Write> DataLog<W> {
    pub fn new(target: W, separator: &str) -> DataLog<W> {
        DataLog {
            target,
            separator: separator.to_owned(),
            error: None,
        }
    }

    fn line(&mut self, iteration: u64, satisfied: usize) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.target, "{}{}{}", iteration, self.separator, satisfied) {
            self.error = Some(err);
        }
    }

    /// Flush the output, returning the target or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.target.flush()?;
        Ok(self.target)
    }
}

impl<W: Write> SearchObserver for DataLog<W> {
    fn try_started(&mut self, event: &TryStart) {
        self.line(0, event.satisfied);
    }

    fn flipped(&mut self, event: &FlipStep) {
        self.line(event.iteration, event.satisfied);
    }
}

/// Writes the assignment and the per clause true literal counts after every step.
pub struct Trace<W: Write> {
    target: W,
    error: Option<io::Error>,
}

impl<W: Write> Trace<W> {
    pub fn new(target: W) -> Trace<W> {
        Trace {
            target,
            error: None,
        }
    }

    fn state(&mut self, assignment: &Assignment, counters: &Counters) -> io::Result<()> {
        write_model(&mut self.target, assignment.model())?;
        self.target.write_all(b"true literals: ")?;
        for count in counters.as_slice() {
            write!(self.target, " {}", count)?;
        }
        self.target.write_all(b"\n")
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            self.error = Some(err);
        }
    }

    /// Flush the output, returning the target or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.target.flush()?;
        Ok(self.target)
    }
}

impl<W: Write> SearchObserver for Trace<W> {
    fn try_started(&mut self, event: &TryStart) {
        if self.error.is_some() {
            return;
        }
        let result = write!(
            self.target,
            "initial: satisfied {}, solution: ",
            event.satisfied
        )
        .and_then(|_| self.state(event.assignment, event.counters));
        self.record(result);
    }

    fn flipped(&mut self, event: &FlipStep) {
        if self.error.is_some() {
            return;
        }
        let flipvar = event.var.map_or(0, |var| var.to_dimacs());
        let result = write!(
            self.target,
            "itr {}, {}, flipvar {}, satisfied {}, solution: ",
            event.iteration,
            event.kind.name(),
            flipvar,
            event.satisfied
        )
        .and_then(|_| self.state(event.assignment, event.counters));
        self.record(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gsat::{SearchConfigUpdate, Searcher};
    use gsat_formula::cnf_formula;

    fn traced_search(update: &SearchConfigUpdate) -> (String, String) {
        let formula = cnf_formula![
            1, 2, 3;
            -1, 2;
            -2, 3;
        ];

        let mut data = DataLog::new(vec![], "\t");
        let mut trace = Trace::new(vec![]);
        {
            let mut searcher = Searcher::new();
            searcher.config(update).unwrap();
            searcher.add_formula(&formula);
            searcher.add_observer(&mut data);
            searcher.add_observer(&mut trace);
            searcher.search().unwrap();
        }

        let data = String::from_utf8(data.finish().unwrap()).unwrap();
        let trace = String::from_utf8(trace.finish().unwrap()).unwrap();
        (data, trace)
    }

    #[test]
    fn one_line_per_step() {
        let mut update = SearchConfigUpdate::new();
        update.max_iterations = Some(5);
        update.max_tries = Some(2);
        update.seed = Some(3);

        let (data, trace) = traced_search(&update);

        let data_lines: Vec<&str> = data.lines().collect();
        assert!(data_lines[0].starts_with("0\t"));
        for line in data_lines.iter() {
            let fields: Vec<&str> = line.split('\t').collect();
            assert_eq!(fields.len(), 2);
            let satisfied: usize = fields[1].parse().unwrap();
            assert!(satisfied <= 3);
        }

        // every step writes a solution line and a counter line
        let trace_lines: Vec<&str> = trace.lines().collect();
        assert_eq!(trace_lines.len(), data_lines.len() * 2);
        assert!(trace_lines[0].starts_with("initial: satisfied "));
        for pair in trace_lines.chunks(2) {
            assert!(pair[0].ends_with(" 0"));
            assert!(pair[1].starts_with("true literals: "));
            assert_eq!(pair[1].split_whitespace().count(), 2 + 3);
        }
        for (data_line, pair) in data_lines.iter().zip(trace_lines.chunks(2)) {
            if data_line.starts_with("0\t") {
                assert!(pair[0].starts_with("initial: "));
            } else {
                assert!(pair[0].starts_with("itr "));
            }
        }
    }

    #[test]
    fn flip_line_format() {
        let mut update = SearchConfigUpdate::new();
        update.random_step_probability = Some(0.0);
        update.max_iterations = Some(0);

        let (data, trace) = traced_search(&update);

        let last_data = data.lines().last().unwrap();
        assert!(last_data.ends_with("\t3"));

        let flip_lines: Vec<&str> = trace.lines().filter(|l| l.starts_with("itr ")).collect();
        for line in flip_lines {
            assert!(line.contains(", greedy, flipvar "));
            assert!(line.contains(", solution: "));
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_reported() {
        let formula = cnf_formula![
            1, 2;
        ];

        let mut data = DataLog::new(FailingWriter, " ");
        {
            let mut searcher = Searcher::new();
            searcher.add_formula(&formula);
            searcher.add_observer(&mut data);
            searcher.search().unwrap();
        }

        let err = data.finish().err().unwrap();
        assert_eq!(err.to_string(), "disk full");
    }
}
