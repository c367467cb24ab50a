//! Solver report decoding.
//!
//! Two report shapes exist (see [`ReportFormat`]); both decode into the same
//! [`SolutionData`]. [`detect_format`] picks one when the caller does not know.

pub mod segmented;
pub mod xml;

use std::io::BufRead;
use std::path::Path;

use bcn_core::{BcnResult, Model, SolutionData};
use bcn_solver_common::{ReportFormat, SolverId};

pub use segmented::{decode_segmented, parse_segmented, write_segmented, SegmentedReport};
pub use xml::decode_xml;

/// Guess the report format.
///
/// A known solver decides; otherwise `.sol`/`.xml` extensions or a
/// `<variable` element in the content mean an XML dump.
pub fn detect_format(path: &Path, content: &str, solver: Option<SolverId>) -> ReportFormat {
    if let Some(solver) = solver {
        return solver.report_format();
    }
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("sol") || e.eq_ignore_ascii_case("xml"))
        .unwrap_or(false);
    if by_extension || content.contains("<variable ") {
        ReportFormat::XmlVariables
    } else {
        ReportFormat::Segmented
    }
}

/// Decode a report of the given format.
pub fn decode_report<R: BufRead>(
    model: &Model,
    reader: R,
    format: ReportFormat,
) -> BcnResult<SolutionData> {
    match format {
        ReportFormat::Segmented => decode_segmented(reader),
        ReportFormat::XmlVariables => decode_xml(model, reader),
    }
}
