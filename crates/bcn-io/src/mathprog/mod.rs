//! MathProg (GMPL) data files.
//!
//! The writer emits the `data;` section the solver model is run against; the
//! reader parses the same subset back for inspection and round-trip checks.

mod reader;
mod writer;

pub use reader::{parse_mathprog, MathProgData};
pub use writer::{inf_parameter, transfer_matrix, write_model, MathProgWriter, INF_EPSILON};
