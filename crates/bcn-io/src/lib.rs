//! # bcn-io: Model Interchange & Report Decoding
//!
//! Everything that crosses the boundary between bcnet and an external MILP
//! solver: the MathProg data file going in, the report coming out, and the
//! JSON files the CLI keeps models and decoded solutions in.
//!
//! ## Design Philosophy
//!
//! **One normalized shape**: the segmented CSV report and the XML variable
//! dump both decode into [`bcn_core::SolutionData`], so validation never needs
//! to know which solver ran.
//!
//! **Fail loudly on structure**: malformed delimiters, column-count mismatches,
//! missing sections and unknown ids are parse errors. Unknown solver variables
//! are skipped.
//!
//! ## Quick Start: Decode a Report
//!
//! ```rust,no_run
//! use bcn_io::persistence::{read_model, read_report, ReportOptions};
//! use std::path::Path;
//!
//! fn main() -> bcn_core::BcnResult<()> {
//!     let model = read_model(Path::new("model.json"))?;
//!     let solution = read_report(&model, Path::new("stdout.cbc"), &ReportOptions::default())?;
//!     println!("{}", solution.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Direction | Module |
//! |--------|-----------|--------|
//! | MathProg data | write, read back | [`mathprog`] |
//! | Segmented CSV report | read, write | [`report::segmented`] |
//! | XML variable dump | read | [`report::xml`] |
//! | JSON model / solution | read, write | [`persistence`] |
//!
//! ## Module Overview
//!
//! - [`sparse`] - indexed sparse variables and solver value coercions
//! - [`mathprog`] - MathProg writer and reader
//! - [`report`] - report format detection and decoders
//! - [`persistence`] - JSON files and report loading with log scanning

pub mod mathprog;
pub mod persistence;
pub mod report;
pub mod sparse;

pub use mathprog::{parse_mathprog, write_model, MathProgData};
pub use persistence::{read_model, read_report, ReportOptions};
pub use report::{decode_report, detect_format};
