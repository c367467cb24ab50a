//! Metadata describing one solver run.

use serde::{Deserialize, Serialize};

use crate::log::LogScan;
use crate::SolverId;

/// What is known about the solver run that produced a report.
///
/// The fields are filled by whoever launched the solver; `did_timeout` and
/// `gap` normally come from [`crate::scan_solver_log`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverRun {
    /// Solver that produced the report.
    pub solver: Option<SolverId>,
    /// Name of the MathProg model variant that was solved.
    pub model_name: Option<String>,
    /// Wall-clock duration of the run.
    pub run_time_seconds: Option<f64>,
    /// Time limit given to the solver, in seconds.
    pub timeout: Option<u64>,
    /// Whether the solver stopped on its time limit.
    pub did_timeout: Option<bool>,
    /// Relative optimality gap at stop time, as a fraction.
    pub gap: Option<f64>,
}

impl SolverRun {
    /// Create metadata for a run of `solver`.
    pub fn new(solver: Option<SolverId>) -> Self {
        Self {
            solver,
            ..Self::default()
        }
    }

    /// Set the time limit given to the solver.
    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the measured run time.
    pub fn with_run_time(mut self, seconds: f64) -> Self {
        self.run_time_seconds = Some(seconds);
        self
    }

    /// Record the result of scanning the solver's log.
    pub fn with_log_scan(mut self, scan: LogScan) -> Self {
        self.did_timeout = scan.did_timeout;
        self.gap = scan.gap;
        self
    }

    /// Whether the reported solution is proven optimal.
    ///
    /// A run that timed out is optimal only if it closed the gap anyway.
    pub fn is_proven_optimal(&self) -> bool {
        match (self.did_timeout, self.gap) {
            (Some(true), Some(gap)) => gap <= 0.0,
            (Some(true), None) => false,
            _ => true,
        }
    }

    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        let solver = self
            .solver
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        s.push_str(&format!("Solver: {}\n", solver));
        if let Some(name) = &self.model_name {
            s.push_str(&format!("Model: {}\n", name));
        }
        if let Some(seconds) = self.run_time_seconds {
            s.push_str(&format!("Run time seconds: {:.2}\n", seconds));
        }
        if let Some(timeout) = self.timeout {
            let did = self
                .did_timeout
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            s.push_str(&format!("Timeout: {} ({} secs.)\n", did, timeout));
            match self.gap {
                Some(gap) => s.push_str(&format!("Gap: {:.4}%\n", gap * 100.0)),
                None => s.push_str("Gap: n/a\n"),
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proven_optimal() {
        let run = SolverRun::new(Some(SolverId::Cbc));
        assert!(run.is_proven_optimal());

        let timed_out = run.clone().with_log_scan(LogScan {
            gap: Some(0.02),
            did_timeout: Some(true),
        });
        assert!(!timed_out.is_proven_optimal());

        let closed = run.with_log_scan(LogScan {
            gap: Some(0.0),
            did_timeout: Some(true),
        });
        assert!(closed.is_proven_optimal());
    }

    #[test]
    fn test_summary_mentions_gap_only_with_timeout() {
        let run = SolverRun::new(Some(SolverId::Glpsol)).with_run_time(1.5);
        assert!(!run.summary().contains("Gap"));

        let run = run.with_timeout(Some(60)).with_log_scan(LogScan {
            gap: Some(0.1),
            did_timeout: Some(true),
        });
        let summary = run.summary();
        assert!(summary.contains("Timeout: true (60 secs.)"));
        assert!(summary.contains("Gap: 10.0000%"));
    }
}
