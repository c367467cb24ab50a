//! Solver console-log scanning.
//!
//! When a run is stopped by its time limit the report still contains the
//! incumbent, so the only trace of the early stop is in the console log. Each
//! solver phrases this differently, and each prints its optimality gap in its
//! own format (GLPK as a percentage, CBC and AMPL as a fraction).

use std::io::BufRead;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{SolverError, SolverId, SolverResult};

/// GLPK progress lines: `+ 1234: mip = ... >= ...   2.8% (12; 0)`.
static GLPSOL_GAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r".*(mip|>>>>>).*\s(\d+(\.\d+)?)%.*").expect("glpsol gap pattern")
});

/// CBC summary line: `Gap:    0.05`.
static CBC_GAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Gap.*\s+(\d+(\.\d+)?)").expect("cbc gap pattern"));

/// AMPL option echo: `option relmipgap = 0.0001`.
static AMPL_GAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*relmipgap\s=\s([\d\.]+)$").expect("ampl gap pattern"));

/// Facts extracted from a solver log.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogScan {
    /// Last optimality gap reported, as a fraction in `[0, 1]`.
    pub gap: Option<f64>,
    /// Whether the timeout phrase appeared. `None` when the solver is unknown.
    pub did_timeout: Option<bool>,
}

impl SolverId {
    /// Phrase the solver prints when it stops on its time limit.
    pub fn timeout_phrase(&self) -> &'static str {
        match self {
            SolverId::Glpsol => "TIME LIMIT EXCEEDED",
            SolverId::Cbc => "Stopped on time limit",
            SolverId::Ampl => "aborted",
            SolverId::Cplex => "Time limit exceeded",
        }
    }

    /// Pattern capturing the gap value, and the divisor turning it into a fraction.
    fn gap_pattern(&self) -> Option<(&'static Regex, usize, f64)> {
        match self {
            SolverId::Glpsol => Some((&*GLPSOL_GAP, 2, 100.0)),
            SolverId::Cbc => Some((&*CBC_GAP, 1, 1.0)),
            SolverId::Ampl => Some((&*AMPL_GAP, 1, 1.0)),
            SolverId::Cplex => None,
        }
    }

    /// Extract a gap fraction from a single log line, if the line carries one.
    pub fn parse_gap_line(&self, line: &str) -> SolverResult<Option<f64>> {
        let raw = self.gap_pattern().and_then(|(pattern, group, base)| {
            let value = pattern.captures(line)?.get(group)?.as_str();
            Some((value, base))
        });

        match raw {
            None => Ok(None),
            Some((value, base)) => value
                .parse::<f64>()
                .map(|v| Some(v / base))
                .map_err(|_| SolverError::InvalidGap {
                    solver: *self,
                    value: value.to_string(),
                }),
        }
    }
}

/// Scan a solver log for the timeout phrase and the last reported gap.
///
/// Without a solver there is nothing to look for and both fields stay `None`.
pub fn scan_solver_log<R: BufRead>(reader: R, solver: Option<SolverId>) -> SolverResult<LogScan> {
    let Some(solver) = solver else {
        return Ok(LogScan::default());
    };

    let phrase = solver.timeout_phrase();
    let mut scan = LogScan {
        gap: None,
        did_timeout: Some(false),
    };

    for line in reader.lines() {
        let line = line?;
        if let Some(gap) = solver.parse_gap_line(&line)? {
            scan.gap = Some(gap);
        }
        if scan.did_timeout != Some(true) && line.contains(phrase) {
            scan.did_timeout = Some(true);
        }
    }

    debug!(
        solver = %solver,
        gap = ?scan.gap,
        did_timeout = ?scan.did_timeout,
        "scanned solver log"
    );
    Ok(scan)
}
