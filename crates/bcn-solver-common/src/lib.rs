//! Solver identity, run metadata and log scanning for bcnet.
//!
//! The MILP itself is solved by an external program. This crate only knows how
//! to name those programs and how to read the few facts bcnet needs from their
//! console output: whether the run hit its time limit and, if it did, the
//! optimality gap the solver reported before stopping.
//!
//! ```text
//! model.dat ──> solver (subprocess, out of scope) ──stdout──> report + log
//!                                                              │
//!                                          scan_solver_log ◄───┘
//! ```
//!
//! # Supported Solvers
//!
//! | Solver | Report format | Timeout phrase |
//! |--------|---------------|----------------|
//! | GLPK `glpsol` | segmented CSV | `TIME LIMIT EXCEEDED` |
//! | COIN-OR CBC | segmented CSV | `Stopped on time limit` |
//! | AMPL | segmented CSV | `aborted` |
//! | CPLEX | XML variable dump | `Time limit exceeded` |

pub mod error;
pub mod log;
pub mod run;

pub use error::{SolverError, SolverResult};
pub use log::{scan_solver_log, LogScan};
pub use run::SolverRun;

/// External MILP solvers whose output bcnet can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverId {
    /// GLPK stand-alone solver, runs the MathProg model directly.
    Glpsol,

    /// COIN-OR Branch and Cut.
    ///
    /// Invoked through a wrapper that translates the MathProg model and prints
    /// the same segmented report as `glpsol`.
    Cbc,

    /// AMPL driver with a MIP backend.
    Ampl,

    /// IBM CPLEX.
    ///
    /// Writes its incumbent as an XML `.sol` file with one `<variable>` element
    /// per non-zero decision variable.
    Cplex,
}

/// Shape of the report a solver produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// `---name` delimited CSV sections.
    Segmented,
    /// `<variable name=".." value=".."/>` lines.
    XmlVariables,
}

impl SolverId {
    /// Get the display name for this solver.
    pub fn display_name(&self) -> &'static str {
        match self {
            SolverId::Glpsol => "glpsol",
            SolverId::Cbc => "CBC",
            SolverId::Ampl => "AMPL",
            SolverId::Cplex => "CPLEX",
        }
    }

    /// Report format this solver emits.
    pub fn report_format(&self) -> ReportFormat {
        match self {
            SolverId::Cplex => ReportFormat::XmlVariables,
            _ => ReportFormat::Segmented,
        }
    }

    /// Get all known solver IDs.
    pub fn all() -> &'static [SolverId] {
        &[
            SolverId::Glpsol,
            SolverId::Cbc,
            SolverId::Ampl,
            SolverId::Cplex,
        ]
    }
}

impl std::fmt::Display for SolverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for SolverId {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "glpsol" | "glpk" => Ok(SolverId::Glpsol),
            "cbc" => Ok(SolverId::Cbc),
            "ampl" => Ok(SolverId::Ampl),
            "cplex" => Ok(SolverId::Cplex),
            _ => Err(SolverError::UnknownSolver(s.to_string())),
        }
    }
}
