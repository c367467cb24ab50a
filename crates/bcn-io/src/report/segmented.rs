//! Segmented CSV reports.
//!
//! The solver model prints its results as CSV sections, each introduced by a
//! `---<name>` line and ended by the next delimiter. A bare `---` ends the
//! report. Anything before the first delimiter is solver log and is skipped.
//!
//! ```text
//! ...solver log...
//! ---shortest_paths
//! origin,destination,shortest_path_cost
//! 1,3,8.8
//! ---budget_used
//! budget_used
//! 20
//! ---
//! ```

use std::fmt;
use std::io::{BufRead, Write};

use bcn_core::{
    BcnError, BcnResult, DemandTransferRecord, FlowRecord, InfrastructureRecord,
    ShortestPathRecord, SolutionData,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

const DELIMITER: &str = "---";

/// Sections every report must contain. `flows` is optional.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "shortest_paths",
    "infrastructures",
    "demand_transfered",
    "total_demand_transfered",
    "budget_used",
];

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Str,
    Int,
    Float,
}

/// A single parsed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Str(s) => s.parse().ok(),
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Cell::Int(v) => usize::try_from(*v).ok(),
            Cell::Float(v) if *v >= 0.0 && v.fract() == 0.0 => Some(*v as usize),
            Cell::Float(_) => None,
            Cell::Str(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Str(s) => f.write_str(s),
        }
    }
}

/// Declared type of `column` in `section`; `None` means auto coercion.
pub fn schema_type(section: &str, column: &str) -> Option<CellType> {
    match (section, column) {
        ("shortest_paths" | "flows", "origin" | "destination") => Some(CellType::Str),
        ("demand_transfered", "origin" | "destination" | "infrastructure") => {
            Some(CellType::Str)
        }
        ("infrastructures", "infrastructure") => Some(CellType::Str),
        ("infrastructures", "construction_cost") => Some(CellType::Float),
        _ => None,
    }
}

/// Parse a raw cell.
///
/// Declared types must parse. Undeclared columns try a float when the value
/// contains a `.`, an integer otherwise, and fall back to a string.
pub fn parse_cell(raw: &str, declared: Option<CellType>) -> BcnResult<Cell> {
    match declared {
        Some(CellType::Str) => Ok(Cell::Str(raw.to_string())),
        Some(CellType::Int) => raw
            .parse()
            .map(Cell::Int)
            .map_err(|_| BcnError::Parse(format!("'{}' is not an integer", raw))),
        Some(CellType::Float) => raw
            .parse()
            .map(Cell::Float)
            .map_err(|_| BcnError::Parse(format!("'{}' is not a number", raw))),
        None if raw.contains('.') => Ok(raw
            .parse()
            .map(Cell::Float)
            .unwrap_or_else(|_| Cell::Str(raw.to_string()))),
        None => Ok(raw
            .parse()
            .map(Cell::Int)
            .unwrap_or_else(|_| Cell::Str(raw.to_string()))),
    }
}

/// One `---name` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Section {
    fn column(&self, column: &str) -> BcnResult<usize> {
        self.header.iter().position(|h| h == column).ok_or_else(|| {
            BcnError::Parse(format!("section {} has no column '{}'", self.name, column))
        })
    }

    fn cell<'a>(&self, row: &'a [Cell], column: &str) -> BcnResult<&'a Cell> {
        let i = self.column(column)?;
        // row length equals header length, enforced by the csv reader
        row.get(i).ok_or_else(|| {
            BcnError::Parse(format!("section {} row is missing '{}'", self.name, column))
        })
    }

    fn text(&self, row: &[Cell], column: &str) -> BcnResult<String> {
        Ok(self.cell(row, column)?.to_string())
    }

    fn number(&self, row: &[Cell], column: &str) -> BcnResult<f64> {
        let cell = self.cell(row, column)?;
        cell.as_f64().ok_or_else(|| {
            BcnError::Parse(format!(
                "section {}: '{}' in column '{}' is not a number",
                self.name, cell, column
            ))
        })
    }

    fn index(&self, row: &[Cell], column: &str) -> BcnResult<usize> {
        let cell = self.cell(row, column)?;
        cell.as_usize().ok_or_else(|| {
            BcnError::Parse(format!(
                "section {}: '{}' in column '{}' is not a non-negative integer",
                self.name, cell, column
            ))
        })
    }

    /// Value of a single-row, single-value section such as `budget_used`.
    fn scalar(&self) -> BcnResult<f64> {
        let row = self.rows.first().ok_or_else(|| {
            BcnError::Parse(format!("section {} has no value", self.name))
        })?;
        self.number(row, &self.name)
    }
}

/// All sections of a report, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentedReport {
    pub sections: Vec<Section>,
}

impl SegmentedReport {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn required(&self, name: &str) -> BcnResult<&Section> {
        self.section(name)
            .ok_or_else(|| BcnError::Parse(format!("missing section '{}'", name)))
    }

    /// Convert the sections into typed records.
    pub fn to_solution_data(&self) -> BcnResult<SolutionData> {
        let missing: Vec<&str> = REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|name| self.section(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(BcnError::Parse(format!(
                "missing sections: {}",
                missing.join(", ")
            )));
        }

        let s = self.required("shortest_paths")?;
        let shortest_paths = s
            .rows
            .iter()
            .map(|row| -> BcnResult<ShortestPathRecord> {
                Ok(ShortestPathRecord {
                    origin: s.text(row, "origin")?.as_str().into(),
                    destination: s.text(row, "destination")?.as_str().into(),
                    shortest_path_cost: s.number(row, "shortest_path_cost")?,
                })
            })
            .collect::<BcnResult<Vec<_>>>()?;

        let flows = match self.section("flows") {
            None => Vec::new(),
            Some(s) => s
                .rows
                .iter()
                .map(|row| -> BcnResult<FlowRecord> {
                    Ok(FlowRecord {
                        origin: s.text(row, "origin")?.as_str().into(),
                        destination: s.text(row, "destination")?.as_str().into(),
                        arc: s.text(row, "arc")?.as_str().into(),
                        infrastructure: s.index(row, "infrastructure")?,
                        flow: s.number(row, "flow")?,
                    })
                })
                .collect::<BcnResult<Vec<_>>>()?,
        };

        let s = self.required("infrastructures")?;
        let infrastructures = s
            .rows
            .iter()
            .map(|row| -> BcnResult<InfrastructureRecord> {
                Ok(InfrastructureRecord {
                    arc: s.text(row, "arc")?.as_str().into(),
                    infrastructure: s.index(row, "infrastructure")?,
                    construction_cost: s.number(row, "construction_cost")?,
                })
            })
            .collect::<BcnResult<Vec<_>>>()?;

        let s = self.required("demand_transfered")?;
        let demand_transfered = s
            .rows
            .iter()
            .map(|row| -> BcnResult<DemandTransferRecord> {
                Ok(DemandTransferRecord {
                    origin: s.text(row, "origin")?.as_str().into(),
                    destination: s.text(row, "destination")?.as_str().into(),
                    demand_transfered: s.number(row, "demand_transfered")?,
                    j_value: s.index(row, "j_value")?,
                    z: s.number(row, "z")?,
                })
            })
            .collect::<BcnResult<Vec<_>>>()?;

        Ok(SolutionData {
            shortest_paths,
            flows,
            infrastructures,
            demand_transfered,
            total_demand_transfered: self.required("total_demand_transfered")?.scalar()?,
            budget_used: self.required("budget_used")?.scalar()?,
        })
    }
}

/// Delimiter line; the capture is the section name, empty for the final `---`.
static DELIMITER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^---([\w_]*)$").expect("delimiter pattern"));

fn section_name(line: &str) -> BcnResult<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    DELIMITER_LINE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            BcnError::Parse(format!("delimiter line '{}' does not match ---<name>", line))
        })
}

fn parse_section(name: &str, body: &str) -> BcnResult<Section> {
    let section_err =
        |e: csv::Error| BcnError::Parse(format!("section {}: {}", name, e));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let header: Vec<String> = reader
        .headers()
        .map_err(section_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(section_err)?;
        let row = record
            .iter()
            .zip(&header)
            .map(|(raw, column)| parse_cell(raw, schema_type(name, column)))
            .collect::<BcnResult<Vec<_>>>()
            .map_err(|e| match e {
                BcnError::Parse(msg) => BcnError::Parse(format!("section {}: {}", name, msg)),
                other => other,
            })?;
        rows.push(row);
    }

    trace!(section = name, rows = rows.len(), "parsed report section");
    Ok(Section {
        name: name.to_string(),
        header,
        rows,
    })
}

/// Split a report into its sections.
pub fn parse_segmented<R: BufRead>(reader: R) -> BcnResult<SegmentedReport> {
    let mut lines = reader.lines();
    let mut report = SegmentedReport::default();

    let mut delimiter = None;
    for line in lines.by_ref() {
        let line = line?;
        if line.starts_with(DELIMITER) {
            delimiter = Some(line);
            break;
        }
    }

    while let Some(current) = delimiter.take() {
        let name = section_name(&current)?.to_string();
        if name.is_empty() {
            break;
        }

        let mut body = String::new();
        for line in lines.by_ref() {
            let line = line?;
            if line.starts_with(DELIMITER) {
                delimiter = Some(line);
                break;
            }
            body.push_str(&line);
            body.push('\n');
        }

        if report.section(&name).is_some() {
            return Err(BcnError::Parse(format!("section '{}' appears twice", name)));
        }
        report.sections.push(parse_section(&name, &body)?);
    }

    debug!(sections = report.sections.len(), "parsed segmented report");
    Ok(report)
}

/// Parse a segmented report straight into typed records.
pub fn decode_segmented<R: BufRead>(reader: R) -> BcnResult<SolutionData> {
    parse_segmented(reader)?.to_solution_data()
}

/// Print `data` in the segmented layout the solver model uses.
pub fn write_segmented<W: Write>(data: &SolutionData, mut out: W) -> BcnResult<()> {
    writeln!(out, "{}shortest_paths", DELIMITER)?;
    writeln!(out, "origin,destination,shortest_path_cost")?;
    for r in &data.shortest_paths {
        writeln!(out, "{},{},{}", r.origin, r.destination, r.shortest_path_cost)?;
    }

    writeln!(out, "{}flows", DELIMITER)?;
    writeln!(out, "origin,destination,arc,infrastructure,flow")?;
    for r in &data.flows {
        writeln!(
            out,
            "{},{},{},{},{}",
            r.origin, r.destination, r.arc, r.infrastructure, r.flow
        )?;
    }

    writeln!(out, "{}infrastructures", DELIMITER)?;
    writeln!(out, "arc,infrastructure,construction_cost")?;
    for r in &data.infrastructures {
        writeln!(out, "{},{},{}", r.arc, r.infrastructure, r.construction_cost)?;
    }

    writeln!(out, "{}demand_transfered", DELIMITER)?;
    writeln!(out, "origin,destination,demand_transfered,z,j_value")?;
    for r in &data.demand_transfered {
        writeln!(
            out,
            "{},{},{},{},{}",
            r.origin, r.destination, r.demand_transfered, r.z, r.j_value
        )?;
    }

    writeln!(out, "{}total_demand_transfered", DELIMITER)?;
    writeln!(out, "total_demand_transfered")?;
    writeln!(out, "{}", data.total_demand_transfered)?;

    writeln!(out, "{}budget_used", DELIMITER)?;
    writeln!(out, "budget_used")?;
    writeln!(out, "{}", data.budget_used)?;

    writeln!(out, "{}", DELIMITER)?;
    Ok(())
}
