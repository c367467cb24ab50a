use bcn_algo::TransferFunction;
use bcn_solver_common::{ReportFormat, SolverId};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a model as a MathProg data file for the solver
    Export {
        /// JSON model file
        #[arg(long, value_hint = ValueHint::FilePath)]
        model: PathBuf,
        /// Destination `.dat` file
        #[arg(long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// Decode a solver report into a JSON solution
    Decode {
        #[command(flatten)]
        report: ReportArgs,
        /// Destination JSON file
        #[arg(long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// Check a solver report against its model
    Validate {
        #[command(flatten)]
        report: ReportArgs,
        /// TOML file with validation tolerances
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
    },
    /// Print breakpoints approximating a transfer function as JSON
    #[command(group(ArgGroup::new("ratio").required(true).args(["m", "infrastructures"])))]
    Breakpoints {
        /// linear, inv_logit, sad or happy
        #[arg(long)]
        function: TransferFunction,
        /// Number of breakpoints (at least 2)
        #[arg(long)]
        count: usize,
        /// Best achievable cost ratio
        #[arg(long)]
        m: Option<f64>,
        /// Derive the ratio from the number of infrastructure levels
        #[arg(long)]
        infrastructures: Option<usize>,
    },
}

/// Where a solver report and its model come from.
#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// JSON model file the solver ran on
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub model: PathBuf,
    /// Solver report (stdout capture or `.sol` file)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: PathBuf,
    /// Report format; detected from the file when omitted
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// Solver that produced the report (glpsol, cbc, ampl, cplex)
    #[arg(long)]
    pub solver: Option<SolverId>,
    /// Time limit the solver ran with, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// `---name` delimited CSV sections
    Csv,
    /// XML variable dump
    Xml,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ReportFormat::Segmented,
            FormatArg::Xml => ReportFormat::XmlVariables,
        }
    }
}
