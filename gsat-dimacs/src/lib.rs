//! DIMACS CNF reader and writer for the gsat solver.

use std::{borrow::Borrow, io, mem::replace};

use gsat_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {}: Unexpected character in DIMACS CNF input: '{}'", line, unexpected)]
    UnexpectedInput { line: usize, unexpected: char },
    #[error(
        "line {}: Literal index is too large: {}{}...",
        line,
        index,
        final_digit
    )]
    LiteralTooLarge {
        line: usize,
        index: usize,
        final_digit: usize,
    },
    #[error("line {}: Invalid header syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: Problem type '{}' is not a CNF", line, problem)]
    NotCnf { line: usize, problem: String },
    #[error("Input has no 'p cnf' header")]
    MissingHeader,
    #[error("line {}: Clause has more than {} literals", line, width)]
    ClauseTooWide { line: usize, width: usize },
    #[error("line {}: Unterminated clause", line)]
    UnterminatedClause { line: usize },
    #[error(
        "Formula has {} variables while the header specifies {} variables",
        var_count,
        header_var_count
    )]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error(
        "Formula has {} clauses while the header specifies {} clauses",
        clause_count,
        header_clause_count
    )]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("Parser invoked after a previous error")]
    PreviousError,
}

/// Variable and clause count of a `p cnf` header line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Chunked parser for DIMACS CNF input.
///
/// Bytes can be fed in arbitrary pieces using [`parse_chunk`](DimacsParser::parse_chunk). After
/// the last piece, [`eof`](DimacsParser::eof) and [`check_header`](DimacsParser::check_header)
/// finish the input.
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,

    require_header: bool,
    max_width: Option<usize>,

    line_number: usize,
    clause_count: usize,
    partial_lit: usize,
    negate_next_lit: bool,

    in_lit: bool,
    in_comment_or_header: bool,
    in_header: bool,
    start_of_line: bool,
    error: bool,

    header_line: Vec<u8>,
}

impl Default for DimacsParser {
    fn default() -> DimacsParser {
        DimacsParser::new()
    }
}

impl DimacsParser {
    /// Parser that requires a header and accepts clauses of any length.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,

            require_header: true,
            max_width: None,

            line_number: 1,
            clause_count: 0,
            partial_lit: 0,
            negate_next_lit: false,

            in_lit: false,
            in_comment_or_header: false,
            in_header: false,
            start_of_line: true,
            error: false,

            header_line: vec![],
        }
    }

    /// Whether a missing `p cnf` line is an error.
    pub fn set_require_header(&mut self, require_header: bool) {
        self.require_header = require_header;
    }

    /// Reject clauses with more than `width` literals.
    pub fn set_max_width(&mut self, width: Option<usize>) {
        self.max_width = width;
    }

    /// Parse a complete input with the default settings.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        DimacsParser::new().parse_all(input)
    }

    /// Parse a complete input with the settings of this parser.
    pub fn parse_all(mut self, input: impl io::Read) -> Result<CnfFormula, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            self.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);
        }
        self.eof()?;
        self.check_header()?;

        Ok(self.take_formula())
    }

    /// Parse a chunk of input.
    ///
    /// After an error the parser refuses further input.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
            if byte == b'\n' {
                self.line_number += 1;
            }
            match byte {
                b'\n' | b'\r' if self.in_comment_or_header => {
                    if self.in_header {
                        self.in_header = false;
                        self.parse_header_line()?;
                    }
                    self.in_comment_or_header = false;
                    self.start_of_line = true
                }
                _ if self.in_comment_or_header => {
                    if self.in_header {
                        self.header_line.push(byte);
                    }
                }
                b'0'..=b'9' => {
                    self.push_digit((byte - b'0') as usize)?;
                    self.start_of_line = false
                }
                b'-' if !self.negate_next_lit && !self.in_lit => {
                    self.negate_next_lit = true;
                    self.start_of_line = false
                }
                b' ' | b'\t' | b'\n' | b'\r' if !self.negate_next_lit || self.in_lit => {
                    self.finish_token()?;
                    self.start_of_line = byte == b'\n' || byte == b'\r';
                }
                b'c' | b'C' if self.start_of_line => {
                    self.in_comment_or_header = true;
                }
                b'p' | b'P' if self.start_of_line && self.header.is_none() => {
                    self.in_comment_or_header = true;
                    self.in_header = true;
                    self.header_line.push(b'p');
                }
                _ => {
                    self.error = true;
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    });
                }
            }
        }

        Ok(())
    }

    /// Finish parsing the input.
    ///
    /// Header counts are verified separately by [`check_header`](DimacsParser::check_header).
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.in_header {
            self.in_header = false;
            self.parse_header_line()?;
        }

        self.finish_token()?;

        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        if self.require_header && self.header.is_none() {
            return Err(ParserError::MissingHeader);
        }

        Ok(())
    }

    /// Verify the formula against the header counts, if a header was present.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            let var_count = self.formula.var_count();
            if var_count != header.var_count {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// Take everything parsed since the last call.
    ///
    /// The variable count of the returned formula includes the header's variable count.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut new_formula = CnfFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed so far.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables parsed so far.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn push_digit(&mut self, digit: usize) -> Result<(), ParserError> {
        self.in_lit = true;

        const CAN_OVERFLOW: usize = Var::max_count() / 10;
        const OVERFLOW_DIGIT: usize = Var::max_count() % 10;

        if CAN_OVERFLOW <= self.partial_lit {
            let carry = (digit <= OVERFLOW_DIGIT) as usize;

            if CAN_OVERFLOW + carry <= self.partial_lit {
                self.error = true;
                return Err(ParserError::LiteralTooLarge {
                    line: self.line_number,
                    index: self.partial_lit,
                    final_digit: digit,
                });
            }
        }

        self.partial_lit = self.partial_lit * 10 + digit;
        Ok(())
    }

    /// Completes a pending literal, or the pending clause when the literal is `0`.
    fn finish_token(&mut self) -> Result<(), ParserError> {
        if self.in_lit {
            if self.partial_lit == 0 {
                self.formula.add_clause(&self.partial_clause);
                self.partial_clause.clear();
                self.clause_count += 1;
            } else {
                if let Some(width) = self.max_width {
                    if self.partial_clause.len() >= width {
                        self.error = true;
                        return Err(ParserError::ClauseTooWide {
                            line: self.line_number,
                            width,
                        });
                    }
                }
                self.partial_clause
                    .push(Var::from_dimacs(self.partial_lit as isize).lit(!self.negate_next_lit));
            }
        }
        self.negate_next_lit = false;
        self.in_lit = false;
        self.partial_lit = 0;
        Ok(())
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(&self.header_line).into_owned();
        self.header_line.clear();

        let mut header_values = header_line.split_whitespace();

        if header_values.next() != Some("p") {
            return self.invalid_header(header_line);
        }

        match header_values.next() {
            Some(problem) if problem.eq_ignore_ascii_case("cnf") => (),
            Some(problem) => {
                self.error = true;
                return Err(ParserError::NotCnf {
                    line: self.line_number,
                    problem: problem.to_owned(),
                });
            }
            None => return self.invalid_header(header_line),
        }

        let var_count: usize = match header_values
            .next()
            .and_then(|value| str::parse(value).ok())
        {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if var_count > Var::max_count() {
            self.error = true;
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                index: var_count / 10,
                final_digit: var_count % 10,
            });
        }

        let clause_count: usize = match header_values
            .next()
            .and_then(|value| str::parse(value).ok())
        {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if header_values.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

        Ok(())
    }

    fn invalid_header(&mut self, header_line: String) -> Result<(), ParserError> {
        self.error = true;
        Err(ParserError::InvalidHeader {
            line: self.line_number,
            header: header_line,
        })
    }
}

/// Write a `p cnf` header line.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write clauses as `0` terminated lines.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
///
/// A `c width` comment after the header records the longest clause length.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    writeln!(target, "c width {}", formula.width())?;
    write_dimacs_clauses(&mut *target, formula.iter())
}

/// Write a full assignment as a single `0` terminated line of literals.
pub fn write_model(
    target: &mut impl io::Write,
    model: impl IntoIterator<Item = impl Borrow<Lit>>,
) -> io::Result<()> {
    for lit in model.into_iter() {
        itoa::write(&mut *target, lit.borrow().to_dimacs())?;
        target.write_all(b" ")?;
    }
    target.write_all(b"0\n")
}
